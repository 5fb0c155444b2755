use super::PitchFilter;
use crate::{
    constants::{EXPONENTIAL_ALPHA_MAX, EXPONENTIAL_ALPHA_MIN},
    Error, Result,
};

/// Exponential smoothing filter
pub struct ExponentialFilter {
    alpha: f64,
    last: Option<f64>,
}

impl ExponentialFilter {
    /// Create an exponential smoother with weight `alpha` on the newest value
    ///
    /// # Errors
    ///
    /// Returns `FilterError` unless alpha is in (0, 1]
    pub fn new(alpha: f64) -> Result<Self> {
        if !(alpha > EXPONENTIAL_ALPHA_MIN && alpha <= EXPONENTIAL_ALPHA_MAX) {
            return Err(Error::FilterError(format!("Alpha must be in (0, 1], got {alpha}")));
        }
        Ok(Self { alpha, last: None })
    }
}

impl PitchFilter for ExponentialFilter {
    fn apply(&mut self, pitch: f64) -> f64 {
        let filtered = match self.last {
            Some(last) => self.alpha * pitch + (1.0 - self.alpha) * last,
            None => pitch,
        };
        self.last = Some(filtered);
        filtered
    }

    fn reset(&mut self) {
        self.last = None;
    }

    fn name(&self) -> &str {
        "ExponentialFilter"
    }
}
