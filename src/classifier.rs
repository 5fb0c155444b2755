//! Per-frame command classification.
//!
//! Polarity is inverted relative to the geometry: a head-up tilt (pitch
//! below the up threshold) means `Down` (duck under an obstacle) and a
//! head-down tilt means `Up` (jump over one). Players read it as "look up to
//! duck, nod down to jump".

use crate::calibration::Thresholds;
use std::fmt;

/// Single-frame command before temporal smoothing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RawCommand {
    /// Jump
    Up,
    /// Duck
    Down,
    Neutral,
}

impl RawCommand {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Neutral => "neutral",
        }
    }

    #[must_use]
    pub fn is_neutral(&self) -> bool {
        matches!(self, Self::Neutral)
    }
}

impl fmt::Display for RawCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map a pitch to a raw command. Threshold boundaries are exclusive.
#[must_use]
pub fn classify(pitch: f64, thresholds: &Thresholds) -> RawCommand {
    if pitch < thresholds.up_threshold {
        RawCommand::Down
    } else if pitch > thresholds.down_threshold {
        RawCommand::Up
    } else {
        RawCommand::Neutral
    }
}

/// Classifier holding the thresholds of the latest completed calibration
#[derive(Debug, Clone, Default)]
pub struct CommandClassifier {
    thresholds: Option<Thresholds>,
}

impl CommandClassifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a complete set of thresholds
    pub fn set_thresholds(&mut self, thresholds: Thresholds) {
        self.thresholds = Some(thresholds);
    }

    /// Forget the thresholds; classification yields nothing until reinstalled
    pub fn clear(&mut self) {
        self.thresholds = None;
    }

    #[must_use]
    pub fn thresholds(&self) -> Option<Thresholds> {
        self.thresholds
    }

    /// Classify a pitch, or `None` if no thresholds are installed
    #[must_use]
    pub fn classify(&self, pitch: f64) -> Option<RawCommand> {
        self.thresholds.as_ref().map(|t| classify(pitch, t))
    }
}
