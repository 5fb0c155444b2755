use super::PitchFilter;
use crate::{Error, Result};
use std::collections::VecDeque;

/// Moving average filter
pub struct MovingAverageFilter {
    window_size: usize,
    buffer: VecDeque<f64>,
}

impl MovingAverageFilter {
    /// Create a moving average over the last `window_size` pitches
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
}

impl PitchFilter for MovingAverageFilter {
    fn apply(&mut self, pitch: f64) -> f64 {
        if self.buffer.len() >= self.window_size {
            self.buffer.pop_front();
        }
        self.buffer.push_back(pitch);

        self.buffer.iter().sum::<f64>() / self.buffer.len() as f64
    }

    fn reset(&mut self) {
        self.buffer.clear();
    }

    fn name(&self) -> &str {
        "MovingAverageFilter"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_moving_average() {
        let mut filter = MovingAverageFilter::new(3).unwrap();

        assert_eq!(filter.apply(10.0), 10.0);
        assert_eq!(filter.apply(20.0), 15.0);
        assert_eq!(filter.apply(30.0), 20.0);

        // Window is full, oldest value should be dropped
        assert_eq!(filter.apply(40.0), 30.0);
    }

    #[test]
    fn test_zero_window_rejected() {
        assert!(MovingAverageFilter::new(0).is_err());
    }
}
