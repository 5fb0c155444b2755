//! Error types for the head tilt control library.

use thiserror::Error;

/// Main error type for the library
#[derive(Error, Debug)]
pub enum Error {
    /// The landmark source (camera or trace) could not be opened
    #[error("Sensor unavailable: {0}")]
    SensorUnavailable(String),

    /// The landmark source reported no face for this frame
    #[error("No face detected in frame")]
    FaceNotDetected,

    /// Face height too small to derive a pitch from
    #[error("Degenerate face geometry: face height {face_height:.5} is below the usable minimum")]
    DegenerateGeometry {
        /// Measured chin-to-forehead distance in normalized units
        face_height: f64,
    },

    /// Too few neutral samples for a personalized baseline
    #[error("Insufficient calibration data: collected {collected}, need more than {required}")]
    InsufficientCalibrationData {
        /// Samples collected before calibration was finished
        collected: usize,
        /// Minimum sample count that must be exceeded
        required: usize,
    },

    /// A configured landmark index is outside the detection's point list
    #[error("Missing landmark {index}: detection only has {available} points")]
    MissingLandmark {
        /// Requested landmark index
        index: usize,
        /// Number of points in the detection
        available: usize,
    },

    /// File I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A landmark trace line could not be decoded
    #[error("Trace format error: {0}")]
    TraceFormat(#[from] serde_json::Error),

    /// Invalid input parameters provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Operation not permitted in the tracker's current state
    #[error("Invalid tracker state: {0}")]
    InvalidState(String),

    /// Filter initialization or processing error
    #[error("Filter error: {0}")]
    FilterError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl Error {
    /// Whether the error only affects the current frame.
    ///
    /// Transient errors are absorbed by the tracker: the frame is skipped and
    /// no state changes.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::FaceNotDetected
                | Self::DegenerateGeometry { .. }
                | Self::MissingLandmark { .. }
                | Self::InvalidInput(_)
        )
    }
}

/// Convenience type alias for Results with our Error type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(Error::FaceNotDetected.is_transient());
        assert!(Error::DegenerateGeometry { face_height: 0.0 }.is_transient());
        assert!(Error::MissingLandmark { index: 152, available: 68 }.is_transient());
        assert!(!Error::SensorUnavailable("camera busy".to_string()).is_transient());
        assert!(!Error::ConfigError("bad".to_string()).is_transient());
    }

    #[test]
    fn test_error_messages() {
        let err = Error::InsufficientCalibrationData { collected: 4, required: 10 };
        assert_eq!(
            err.to_string(),
            "Insufficient calibration data: collected 4, need more than 10"
        );
        let err = Error::MissingLandmark { index: 263, available: 10 };
        assert!(err.to_string().contains("263"));
    }
}
