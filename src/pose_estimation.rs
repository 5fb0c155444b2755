//! Pitch estimation from 2D facial landmarks.
//!
//! Two independent geometric measures are blended into one pitch-like angle:
//!
//! 1. The vertical offset of the nose tip from the eye line, relative to the
//!    face height. Tilting the head back brings the nose tip up toward the
//!    eyes; tilting forward pushes it down toward the chin.
//! 2. The orientation of the nose-to-chin vector, zeroed so that a chin
//!    straight below the nose reads 0.
//!
//! Sign convention: tilting the head back / up makes `pitch` more negative,
//! tilting forward / down makes it more positive. Every threshold downstream
//! relies on this.

use crate::{
    config::PoseConfig,
    constants::CHIN_REFERENCE_ANGLE_DEG,
    landmarks::LandmarkFrame,
    Error, Result,
};
use nalgebra::center;

/// Intermediate measures behind a pitch value
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AuxiliaryMeasures {
    /// `(eye_level - nose.y) / face_height`
    pub eye_to_nose_ratio: f64,
    /// Nose-to-chin orientation in degrees, 0 when the chin is straight below
    pub chin_angle: f64,
}

/// One pose measurement derived from a single landmark frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoseSample {
    /// Combined pitch; negative is head up, positive is head down
    pub pitch: f64,
    pub measures: AuxiliaryMeasures,
    /// Sample confidence in [0, 1]
    pub confidence: f64,
}

impl PoseSample {
    /// Sample with the given pitch and neutral auxiliary measures
    #[must_use]
    pub fn from_pitch(pitch: f64, confidence: f64) -> Self {
        Self {
            pitch,
            measures: AuxiliaryMeasures {
                eye_to_nose_ratio: 0.0,
                chin_angle: 0.0,
            },
            confidence,
        }
    }
}

/// Landmark-to-pitch estimator
#[derive(Debug, Clone)]
pub struct PoseEstimator {
    sensitivity: f64,
    eye_weight: f64,
    angle_weight: f64,
    min_face_height: f64,
    fixed_confidence: f64,
    use_detector_confidence: bool,
}

impl PoseEstimator {
    /// Create an estimator from pose configuration
    #[must_use]
    pub fn new(config: &PoseConfig) -> Self {
        Self {
            sensitivity: config.sensitivity,
            eye_weight: config.eye_weight,
            angle_weight: config.angle_weight,
            min_face_height: config.min_face_height,
            fixed_confidence: config.fixed_confidence,
            use_detector_confidence: config.use_detector_confidence,
        }
    }

    /// Estimate a pose sample from one landmark frame
    ///
    /// # Errors
    ///
    /// Returns `DegenerateGeometry` if the chin-to-forehead distance is too
    /// small (or not finite) to normalize against.
    pub fn estimate(&self, frame: &LandmarkFrame) -> Result<PoseSample> {
        let face_height = (frame.chin.y - frame.forehead.y).abs();
        if !face_height.is_finite() || face_height < self.min_face_height {
            return Err(Error::DegenerateGeometry { face_height });
        }

        let eye_level = center(&frame.left_eye, &frame.right_eye).y;
        let eye_to_nose_ratio = (eye_level - frame.nose_tip.y) / face_height;
        let eye_pitch = -eye_to_nose_ratio * self.sensitivity;

        let chin_vector = frame.chin - frame.nose_tip;
        let chin_angle = chin_vector.y.atan2(chin_vector.x).to_degrees() - CHIN_REFERENCE_ANGLE_DEG;

        let pitch = self.eye_weight * eye_pitch + self.angle_weight * chin_angle;

        Ok(PoseSample {
            pitch,
            measures: AuxiliaryMeasures {
                eye_to_nose_ratio,
                chin_angle,
            },
            confidence: self.confidence_for(frame),
        })
    }

    fn confidence_for(&self, frame: &LandmarkFrame) -> f64 {
        match frame.detector_confidence {
            Some(c) if self.use_detector_confidence && c.is_finite() => c.clamp(0.0, 1.0),
            _ => self.fixed_confidence,
        }
    }
}

impl Default for PoseEstimator {
    fn default() -> Self {
        Self::new(&PoseConfig::default())
    }
}
