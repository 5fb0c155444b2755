//! Pitch smoothing filters.
//!
//! An optional stage between the pose estimator and the command classifier.
//! The temporal stabilizer already votes over raw commands, so the default
//! is [`NoFilter`]; the others trade a little latency for less jitter on
//! noisy landmark sources.

/// Moving average filter for simple smoothing
pub mod moving_average;

/// Median filter for outlier rejection
pub mod median;

/// Exponential filter for responsive smoothing
pub mod exponential;

use crate::{Error, Result};

/// Trait for all pitch filters
pub trait PitchFilter: Send + Sync {
    /// Apply filter to the next pitch value
    fn apply(&mut self, pitch: f64) -> f64;

    /// Reset filter state
    fn reset(&mut self);

    /// Get filter name
    fn name(&self) -> &str;
}

/// No-op filter that passes through values unchanged
pub struct NoFilter;

impl PitchFilter for NoFilter {
    fn apply(&mut self, pitch: f64) -> f64 {
        pitch
    }

    fn reset(&mut self) {}

    fn name(&self) -> &str {
        "NoFilter"
    }
}

/// Create a pitch filter from a spec string.
///
/// The spec is a filter name optionally followed by `:param`, for example
/// `median:5` or `exponential:0.3`. Without a parameter the defaults from
/// [`crate::constants`] apply.
///
/// # Errors
///
/// Returns `FilterError` for unknown names, unparsable parameters or
/// parameters outside the filter's valid range.
pub fn create_filter(spec: &str) -> Result<Box<dyn PitchFilter>> {
    let lowered = spec.trim().to_lowercase();
    let (name, param) = match lowered.split_once(':') {
        Some((name, param)) => (name, Some(param)),
        None => (lowered.as_str(), None),
    };

    match name {
        "none" | "nofilter" => Ok(Box::new(NoFilter)),
        "moving_average" | "movingaverage" => {
            let window = parse_param(param, crate::constants::DEFAULT_MOVING_AVERAGE_WINDOW, spec)?;
            Ok(Box::new(moving_average::MovingAverageFilter::new(window)?))
        }
        "median" => {
            let window = parse_param(param, crate::constants::DEFAULT_MEDIAN_WINDOW, spec)?;
            Ok(Box::new(median::MedianFilter::new(window)?))
        }
        "exponential" => {
            let alpha = parse_param(param, crate::constants::DEFAULT_EXPONENTIAL_ALPHA, spec)?;
            Ok(Box::new(exponential::ExponentialFilter::new(alpha)?))
        }
        _ => Err(Error::FilterError(format!("Unknown filter type: {spec}"))),
    }
}

fn parse_param<T: std::str::FromStr>(param: Option<&str>, default: T, spec: &str) -> Result<T> {
    match param {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| {
            Error::FilterError(format!("Invalid parameter '{raw}' in filter spec '{spec}'"))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_filter() {
        let mut filter = NoFilter;
        assert_eq!(filter.apply(10.0), 10.0);
        assert_eq!(filter.apply(-3.5), -3.5);
    }

    #[test]
    fn test_create_filter() {
        assert!(create_filter("none").is_ok());
        assert!(create_filter("median").is_ok());
        assert!(create_filter("Exponential:0.25").is_ok());
        assert!(create_filter("unknown").is_err());
    }

    #[test]
    fn test_create_filter_parameters() {
        let filter = create_filter("moving_average:3").unwrap();
        assert_eq!(filter.name(), "MovingAverageFilter");

        assert!(matches!(create_filter("median:abc"), Err(Error::FilterError(_))));
        assert!(matches!(create_filter("moving_average:-5"), Err(Error::FilterError(_))));
        assert!(matches!(create_filter("exponential:2.0"), Err(Error::FilterError(_))));
    }
}
