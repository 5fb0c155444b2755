use super::PitchFilter;
use crate::{Error, Result};
use std::collections::VecDeque;

/// Median filter
pub struct MedianFilter {
    window_size: usize,
    buffer: VecDeque<f64>,
}

impl MedianFilter {
    /// Create a median over the last `window_size` pitches
    ///
    /// # Errors
    ///
    /// Returns `FilterError` if `window_size` is zero
    pub fn new(window_size: usize) -> Result<Self> {
        if window_size == 0 {
            return Err(Error::FilterError("Window size must be greater than 0".to_string()));
        }
        Ok(Self {
            window_size,
            buffer: VecDeque::with_capacity(window_size),
        })
    }

    fn calculate_median(values: &VecDeque<f64>) -> f64 {
        let mut sorted: Vec<f64> = values.iter().copied().collect();
        sorted.sort_by(f64::total_cmp);

        let len = sorted.len();
        if len == 0 {
            0.0
        } else if len % 2 == 0 {
            (sorted[len / 2 - 1] + sorted[len / 2]) / 2.0
        } else {
            sorted[len / 2]
        }
    }
}

impl PitchFilter for MedianFilter {
    fn apply(&mut self, pitch: f64) -> f64 {
        if self.buffer.len() >= self.window_size {
            self.buffer.pop_front();
        }
        self.buffer.push_back(pitch);

        Self::calculate_median(&self.buffer)
    }

    fn reset(&mut self) {
        self.buffer.clear();
    }

    fn name(&self) -> &str {
        "MedianFilter"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_median_filter() {
        let mut filter = MedianFilter::new(3).unwrap();

        assert_eq!(filter.apply(10.0), 10.0);
        assert_eq!(filter.apply(20.0), 15.0); // median of [10, 20]
        assert_eq!(filter.apply(30.0), 20.0); // median of [10, 20, 30]
    }

    #[test]
    fn test_median_with_outliers() {
        let mut filter = MedianFilter::new(3).unwrap();

        filter.apply(10.0);
        filter.apply(11.0);
        let p = filter.apply(100.0); // outlier

        assert_eq!(p, 11.0);
    }
}
