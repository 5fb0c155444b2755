//! Constants used throughout the library

/// Default frames per second assumption for the landmark source
pub const DEFAULT_FPS: f64 = 30.0;

/// Face Mesh index of the nose tip
pub const NOSE_TIP_INDEX: usize = 1;
/// Face Mesh index of the chin
pub const CHIN_INDEX: usize = 152;
/// Face Mesh index of the left eye reference (outer corner)
pub const LEFT_EYE_INDEX: usize = 33;
/// Face Mesh index of the right eye reference (outer corner)
pub const RIGHT_EYE_INDEX: usize = 263;
/// Face Mesh index of the forehead reference
pub const FOREHEAD_INDEX: usize = 10;

/// Scale applied to the eye-to-nose ratio to produce the eye-based pitch
pub const DEFAULT_PITCH_SENSITIVITY: f64 = 60.0;

/// Weight of the eye-based pitch in the combined pitch
pub const DEFAULT_EYE_WEIGHT: f64 = 0.7;
/// Weight of the chin-angle pitch in the combined pitch
pub const DEFAULT_ANGLE_WEIGHT: f64 = 0.3;

/// Chin-to-nose reference orientation subtracted from the raw angle (degrees)
pub const CHIN_REFERENCE_ANGLE_DEG: f64 = 90.0;

/// Smallest usable chin-to-forehead distance in normalized units
pub const DEFAULT_MIN_FACE_HEIGHT: f64 = 0.01;

/// Confidence reported when the detector's own confidence is not used
pub const DEFAULT_SAMPLE_CONFIDENCE: f64 = 0.95;

/// Neutral samples collected before calibration completes (~2 s at 30 fps)
pub const DEFAULT_CALIBRATION_SAMPLES: usize = 60;
/// A personalized baseline needs strictly more samples than this
pub const DEFAULT_MIN_CALIBRATION_SAMPLES: usize = 10;
/// Symmetric threshold margin around the neutral pitch
pub const DEFAULT_THRESHOLD_MARGIN: f64 = 5.0;
/// Wall-clock fallback for a stalled calibration (seconds)
pub const DEFAULT_CALIBRATION_TIMEOUT_SECS: f64 = 10.0;

/// Neutral pitch used when calibration falls back to defaults
pub const FALLBACK_NEUTRAL_PITCH: f64 = 0.0;

/// Raw commands remembered by the stabilizer
pub const DEFAULT_HISTORY_SIZE: usize = 3;
/// Vote weight of the most recent raw command
pub const DEFAULT_RECENCY_WEIGHT: u32 = 2;
/// Minimum vote total before a non-neutral command is emitted
pub const DEFAULT_MIN_VOTES: u32 = 2;

/// Default filter parameters
pub const DEFAULT_MOVING_AVERAGE_WINDOW: usize = 5;
pub const DEFAULT_MEDIAN_WINDOW: usize = 5;
pub const DEFAULT_EXPONENTIAL_ALPHA: f64 = 0.5;

/// Exponential filter bounds
pub const EXPONENTIAL_ALPHA_MIN: f64 = 0.0;
pub const EXPONENTIAL_ALPHA_MAX: f64 = 1.0;

/// Tolerance for configured pose weights summing to one
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;
