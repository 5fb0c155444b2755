//! Configuration management for the head tilt tracker

use crate::{
    constants::{
        DEFAULT_ANGLE_WEIGHT, DEFAULT_CALIBRATION_SAMPLES, DEFAULT_CALIBRATION_TIMEOUT_SECS,
        DEFAULT_EYE_WEIGHT, DEFAULT_HISTORY_SIZE, DEFAULT_MIN_CALIBRATION_SAMPLES,
        DEFAULT_MIN_FACE_HEIGHT, DEFAULT_MIN_VOTES, DEFAULT_PITCH_SENSITIVITY,
        DEFAULT_RECENCY_WEIGHT, DEFAULT_SAMPLE_CONFIDENCE, DEFAULT_THRESHOLD_MARGIN,
        WEIGHT_SUM_TOLERANCE,
    },
    filters::{create_filter, PitchFilter},
    landmarks::LandmarkIndices,
    Error, Result,
};
use serde::{Deserialize, Serialize};
use std::{path::Path, time::Duration};

/// Tracker configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Landmark indices of the named facial points
    pub landmarks: LandmarkIndices,

    /// Pitch estimation parameters
    pub pose: PoseConfig,

    /// Neutral-pose calibration parameters
    pub calibration: CalibrationConfig,

    /// Command voting parameters
    pub stabilizer: StabilizerConfig,

    /// Optional pitch smoothing
    pub filter: FilterConfig,
}

/// Pitch estimation parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoseConfig {
    /// Scale applied to the eye-to-nose ratio
    pub sensitivity: f64,

    /// Weight of the eye-based measure
    pub eye_weight: f64,

    /// Weight of the chin-angle measure
    pub angle_weight: f64,

    /// Smallest usable face height (normalized units)
    pub min_face_height: f64,

    /// Confidence assigned to samples when detector confidence is not used
    pub fixed_confidence: f64,

    /// Use the landmark detector's per-frame confidence when it has one
    pub use_detector_confidence: bool,

    /// Samples below this confidence are skipped
    pub min_confidence: f64,
}

/// Neutral-pose calibration parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    /// Samples collected before calibration completes
    pub samples: usize,

    /// A personalized baseline needs more samples than this
    pub min_samples: usize,

    /// Symmetric margin between neutral pitch and each threshold
    pub margin: f64,

    /// Wall-clock fallback in seconds; `None` waits for samples forever
    pub timeout_secs: Option<f64>,
}

/// Command voting parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StabilizerConfig {
    /// Raw commands remembered
    pub history_size: usize,

    /// Vote weight of the newest raw command
    pub recency_weight: u32,

    /// Minimum vote total for a non-neutral command
    pub min_votes: u32,
}

/// Pitch filter configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Filter spec, e.g. `none`, `median:5`, `exponential:0.5`
    pub pitch_filter: String,
}

impl Default for PoseConfig {
    fn default() -> Self {
        Self {
            sensitivity: DEFAULT_PITCH_SENSITIVITY,
            eye_weight: DEFAULT_EYE_WEIGHT,
            angle_weight: DEFAULT_ANGLE_WEIGHT,
            min_face_height: DEFAULT_MIN_FACE_HEIGHT,
            fixed_confidence: DEFAULT_SAMPLE_CONFIDENCE,
            use_detector_confidence: false,
            min_confidence: 0.0,
        }
    }
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            samples: DEFAULT_CALIBRATION_SAMPLES,
            min_samples: DEFAULT_MIN_CALIBRATION_SAMPLES,
            margin: DEFAULT_THRESHOLD_MARGIN,
            timeout_secs: Some(DEFAULT_CALIBRATION_TIMEOUT_SECS),
        }
    }
}

impl Default for StabilizerConfig {
    fn default() -> Self {
        Self {
            history_size: DEFAULT_HISTORY_SIZE,
            recency_weight: DEFAULT_RECENCY_WEIGHT,
            min_votes: DEFAULT_MIN_VOTES,
        }
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            pitch_filter: "none".to_string(),
        }
    }
}

impl CalibrationConfig {
    /// Calibration timeout as a duration; `None` when disabled or not
    /// representable
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs
            .filter(|secs| *secs > 0.0)
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;

        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML text
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content)
            .map_err(|e| Error::ConfigError(format!("Failed to parse config: {e}")))
    }

    /// Save configuration to a YAML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(self)
            .map_err(|e| Error::ConfigError(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, content)?;

        Ok(())
    }

    /// Create the configured pitch filter
    pub fn create_filter(&self) -> Result<Box<dyn PitchFilter>> {
        create_filter(&self.filter.pitch_filter)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        // Validate pose parameters
        let pose = &self.pose;
        if !pose.sensitivity.is_finite() || pose.sensitivity <= 0.0 {
            return Err(Error::ConfigError("Pitch sensitivity must be positive".to_string()));
        }
        let weights = [pose.eye_weight, pose.angle_weight];
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(Error::ConfigError("Pose weights must be non-negative".to_string()));
        }
        if (pose.eye_weight + pose.angle_weight - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(Error::ConfigError(format!(
                "Pose weights must sum to 1.0, got {}",
                pose.eye_weight + pose.angle_weight
            )));
        }
        if !pose.min_face_height.is_finite() || pose.min_face_height <= 0.0 {
            return Err(Error::ConfigError("Minimum face height must be positive".to_string()));
        }
        if !(0.0..=1.0).contains(&pose.fixed_confidence) {
            return Err(Error::ConfigError(
                "Fixed confidence must be between 0.0 and 1.0".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&pose.min_confidence) {
            return Err(Error::ConfigError(
                "Minimum confidence must be between 0.0 and 1.0".to_string(),
            ));
        }

        // Validate calibration parameters
        let calibration = &self.calibration;
        if calibration.samples == 0 {
            return Err(Error::ConfigError(
                "Calibration sample count must be greater than 0".to_string(),
            ));
        }
        if calibration.min_samples >= calibration.samples {
            return Err(Error::ConfigError(format!(
                "Minimum calibration samples ({}) must be below the sample count ({})",
                calibration.min_samples, calibration.samples
            )));
        }
        if !calibration.margin.is_finite() || calibration.margin <= 0.0 {
            return Err(Error::ConfigError("Threshold margin must be positive".to_string()));
        }
        if let Some(secs) = calibration.timeout_secs {
            if !secs.is_finite() || secs <= 0.0 {
                return Err(Error::ConfigError("Calibration timeout must be positive".to_string()));
            }
            Duration::try_from_secs_f64(secs).map_err(|e| {
                Error::ConfigError(format!("Calibration timeout {secs}s is out of range: {e}"))
            })?;
        }

        // Validate stabilizer parameters
        if self.stabilizer.history_size == 0 {
            return Err(Error::ConfigError("History size must be greater than 0".to_string()));
        }
        if self.stabilizer.recency_weight == 0 {
            return Err(Error::ConfigError("Recency weight must be at least 1".to_string()));
        }
        if self.stabilizer.min_votes == 0 {
            return Err(Error::ConfigError("Minimum votes must be at least 1".to_string()));
        }

        // Validate filter spec
        self.create_filter()
            .map_err(|e| Error::ConfigError(format!("Invalid pitch filter: {e}")))?;

        Ok(())
    }
}

/// Example configuration file content
pub const EXAMPLE_CONFIG: &str = r#"# Head Tilt Control Configuration

# Face Mesh indices of the named landmarks
landmarks:
  nose_tip: 1
  chin: 152
  left_eye: 33
  right_eye: 263
  forehead: 10

# Pitch estimation
pose:
  sensitivity: 60.0
  eye_weight: 0.7
  angle_weight: 0.3
  min_face_height: 0.01
  fixed_confidence: 0.95
  use_detector_confidence: false
  min_confidence: 0.0

# Neutral-pose calibration
calibration:
  samples: 60
  min_samples: 10
  margin: 5.0
  timeout_secs: 10.0

# Command voting
stabilizer:
  history_size: 3
  recency_weight: 2
  min_votes: 2

# Pitch smoothing before classification
filter:
  pitch_filter: "none"
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        Config::default().validate().unwrap();
    }

    #[test]
    fn test_example_config_matches_defaults() {
        let parsed = Config::from_yaml(EXAMPLE_CONFIG).unwrap();
        assert_eq!(parsed, Config::default());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let parsed = Config::from_yaml("calibration:\n  margin: 7.5\n").unwrap();
        assert_eq!(parsed.calibration.margin, 7.5);
        assert_eq!(parsed.calibration.samples, DEFAULT_CALIBRATION_SAMPLES);
        assert_eq!(parsed.stabilizer, StabilizerConfig::default());
    }

    #[test]
    fn test_validate_rejects_bad_weights() {
        let mut config = Config::default();
        config.pose.eye_weight = 0.9;
        assert!(matches!(config.validate(), Err(Error::ConfigError(_))));
    }

    #[test]
    fn test_validate_rejects_min_samples_above_capacity() {
        let mut config = Config::default();
        config.calibration.min_samples = 60;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_filter() {
        let mut config = Config::default();
        config.filter.pitch_filter = "kalman".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_timeout_duration() {
        let mut calibration = CalibrationConfig::default();
        assert_eq!(calibration.timeout(), Some(Duration::from_secs(10)));
        calibration.timeout_secs = None;
        assert_eq!(calibration.timeout(), None);
        calibration.timeout_secs = Some(1e30);
        assert_eq!(calibration.timeout(), None);
    }

    #[test]
    fn test_validate_rejects_unrepresentable_timeout() {
        let mut config = Config::default();
        config.calibration.timeout_secs = Some(1e30);
        assert!(matches!(config.validate(), Err(Error::ConfigError(_))));

        config.calibration.timeout_secs = Some(3600.0);
        config.validate().unwrap();
    }
}
