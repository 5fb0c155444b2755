//! Landmark input types.
//!
//! The landmark detector is an external collaborator. Per camera frame it
//! hands over zero or one face as an index-addressable list of normalized
//! points (x, y in [0, 1], origin top-left). [`LandmarkFrame`] picks out the
//! handful of named points the pose estimator needs.

use crate::{
    constants::{CHIN_INDEX, FOREHEAD_INDEX, LEFT_EYE_INDEX, NOSE_TIP_INDEX, RIGHT_EYE_INDEX},
    Error, Result,
};
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// One landmark detector result for a single video frame
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FaceDetection {
    /// Normalized landmark positions, empty when no face was found
    #[serde(default)]
    pub points: Vec<(f32, f32)>,

    /// Detector's own per-frame confidence, if it reports one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
}

impl FaceDetection {
    /// Detection carrying a face's landmark list
    #[must_use]
    pub fn new(points: Vec<(f32, f32)>) -> Self {
        Self { points, confidence: None }
    }

    /// Detection for a frame in which no face was found
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Attach the detector's confidence
    #[must_use]
    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = Some(confidence);
        self
    }

    /// Whether this frame contains a face
    #[must_use]
    pub fn has_face(&self) -> bool {
        !self.points.is_empty()
    }
}

/// Landmark indices of the named points within a detection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LandmarkIndices {
    /// Nose tip
    pub nose_tip: usize,
    /// Chin
    pub chin: usize,
    /// Left eye reference
    pub left_eye: usize,
    /// Right eye reference
    pub right_eye: usize,
    /// Forehead / upper-face reference
    pub forehead: usize,
}

impl Default for LandmarkIndices {
    fn default() -> Self {
        Self {
            nose_tip: NOSE_TIP_INDEX,
            chin: CHIN_INDEX,
            left_eye: LEFT_EYE_INDEX,
            right_eye: RIGHT_EYE_INDEX,
            forehead: FOREHEAD_INDEX,
        }
    }
}

impl LandmarkIndices {
    /// Largest index referenced; detections must have more points than this
    #[must_use]
    pub fn max_index(&self) -> usize {
        [self.nose_tip, self.chin, self.left_eye, self.right_eye, self.forehead]
            .into_iter()
            .max()
            .unwrap_or(0)
    }
}

/// The named facial points for one detection instant
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LandmarkFrame {
    pub nose_tip: Point2<f64>,
    pub chin: Point2<f64>,
    pub left_eye: Point2<f64>,
    pub right_eye: Point2<f64>,
    pub forehead: Point2<f64>,
    /// Detector confidence carried over from the detection
    pub detector_confidence: Option<f64>,
}

impl LandmarkFrame {
    /// Extract the named points from a detection.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The detection is empty (`FaceNotDetected`)
    /// - A configured index is out of range (`MissingLandmark`)
    /// - A selected coordinate is not finite (`InvalidInput`)
    pub fn from_detection(detection: &FaceDetection, indices: &LandmarkIndices) -> Result<Self> {
        if !detection.has_face() {
            return Err(Error::FaceNotDetected);
        }

        let pick = |index: usize| -> Result<Point2<f64>> {
            let &(x, y) = detection.points.get(index).ok_or(Error::MissingLandmark {
                index,
                available: detection.points.len(),
            })?;
            if !x.is_finite() || !y.is_finite() {
                return Err(Error::InvalidInput(format!(
                    "Landmark {index} has non-finite coordinates ({x}, {y})"
                )));
            }
            Ok(Point2::new(f64::from(x), f64::from(y)))
        };

        Ok(Self {
            nose_tip: pick(indices.nose_tip)?,
            chin: pick(indices.chin)?,
            left_eye: pick(indices.left_eye)?,
            right_eye: pick(indices.right_eye)?,
            forehead: pick(indices.forehead)?,
            detector_confidence: detection.confidence.map(f64::from),
        })
    }
}
