//! Neutral-pose calibration.
//!
//! While the user holds their head still, a fixed window of pitch samples is
//! collected. The mean becomes the neutral pitch and two thresholds are
//! placed a fixed margin either side of it. Too little data never fails:
//! the calibrator falls back to a default baseline so the tracker always
//! becomes operable, even with a degraded sensor.

use crate::{
    config::CalibrationConfig,
    constants::FALLBACK_NEUTRAL_PITCH,
    pose_estimation::PoseSample,
    Error, Result,
};
use log::{info, warn};
use std::time::{Duration, Instant};

/// Decision thresholds derived from calibration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub neutral_pitch: f64,
    /// Pitch below this is a head-up tilt
    pub up_threshold: f64,
    /// Pitch above this is a head-down tilt
    pub down_threshold: f64,
}

impl Thresholds {
    /// Thresholds `margin` either side of `neutral_pitch`
    #[must_use]
    pub fn around(neutral_pitch: f64, margin: f64) -> Self {
        Self {
            neutral_pitch,
            up_threshold: neutral_pitch - margin,
            down_threshold: neutral_pitch + margin,
        }
    }

    /// Baseline used when no personalized calibration is possible
    #[must_use]
    pub fn fallback(margin: f64) -> Self {
        Self::around(FALLBACK_NEUTRAL_PITCH, margin)
    }
}

/// Why calibration fell back to the default baseline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackReason {
    /// Calibration finished with too few samples
    InsufficientSamples,
    /// The wall-clock timeout expired first
    TimedOut,
}

/// How the current thresholds were produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalibrationOutcome {
    /// Baseline computed from the user's own neutral samples
    Personalized { samples: usize },
    /// Default baseline
    Default { collected: usize, reason: FallbackReason },
}

/// Progress of an ongoing calibration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalibrationProgress {
    /// Still accepting samples
    Collecting { collected: usize, required: usize },
    /// Window is full and ready to be finished
    Full,
    /// Thresholds are sealed
    Complete,
}

/// Calibration window and its result
#[derive(Debug, Clone, Default)]
pub struct CalibrationState {
    samples: Vec<PoseSample>,
    is_complete: bool,
    thresholds: Option<Thresholds>,
    outcome: Option<CalibrationOutcome>,
}

impl CalibrationState {
    /// Samples collected in the current window
    #[must_use]
    pub fn samples(&self) -> &[PoseSample] {
        &self.samples
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.is_complete
    }

    #[must_use]
    pub fn neutral_pitch(&self) -> Option<f64> {
        self.thresholds.map(|t| t.neutral_pitch)
    }

    #[must_use]
    pub fn up_threshold(&self) -> Option<f64> {
        self.thresholds.map(|t| t.up_threshold)
    }

    #[must_use]
    pub fn down_threshold(&self) -> Option<f64> {
        self.thresholds.map(|t| t.down_threshold)
    }

    #[must_use]
    pub fn thresholds(&self) -> Option<Thresholds> {
        self.thresholds
    }

    #[must_use]
    pub fn outcome(&self) -> Option<CalibrationOutcome> {
        self.outcome
    }
}

/// Collects neutral samples and derives thresholds
#[derive(Debug, Clone)]
pub struct Calibrator {
    capacity: usize,
    min_samples: usize,
    margin: f64,
    timeout: Option<Duration>,
    started_at: Option<Instant>,
    state: CalibrationState,
}

impl Calibrator {
    /// Create a calibrator; sampling begins with [`Calibrator::start_calibration`]
    #[must_use]
    pub fn new(config: &CalibrationConfig) -> Self {
        Self {
            capacity: config.samples,
            min_samples: config.min_samples,
            margin: config.margin,
            timeout: config.timeout(),
            started_at: None,
            state: CalibrationState {
                samples: Vec::with_capacity(config.samples),
                ..CalibrationState::default()
            },
        }
    }

    /// Reset the sample window and begin accepting samples
    pub fn start_calibration(&mut self, now: Instant) {
        self.state.samples.clear();
        self.state.is_complete = false;
        self.state.thresholds = None;
        self.state.outcome = None;
        self.started_at = Some(now);
    }

    /// Discard the current thresholds and sample again
    pub fn recalibrate(&mut self, now: Instant) {
        info!("Recalibrating: discarding thresholds {:?}", self.state.thresholds);
        self.start_calibration(now);
    }

    /// Append a neutral sample to the window.
    ///
    /// Once the window is full or the state is sealed, further samples are
    /// refused rather than folded into the average.
    pub fn add_sample(&mut self, sample: PoseSample) -> CalibrationProgress {
        if !self.state.is_complete && self.state.samples.len() < self.capacity {
            self.state.samples.push(sample);
        }
        self.progress()
    }

    /// Current progress
    #[must_use]
    pub fn progress(&self) -> CalibrationProgress {
        if self.state.is_complete {
            CalibrationProgress::Complete
        } else if self.state.samples.len() >= self.capacity {
            CalibrationProgress::Full
        } else {
            CalibrationProgress::Collecting {
                collected: self.state.samples.len(),
                required: self.capacity,
            }
        }
    }

    /// Compute thresholds from the collected window and seal the state.
    ///
    /// Never fails: with too few samples the default baseline is used.
    pub fn finish_calibration(&mut self) -> Thresholds {
        self.finish_with(FallbackReason::InsufficientSamples)
    }

    /// Finish early if the wall-clock timeout has expired.
    ///
    /// Returns the new thresholds when calibration was finished by this call.
    pub fn check_timeout(&mut self, now: Instant) -> Option<Thresholds> {
        if self.state.is_complete {
            return None;
        }
        let (timeout, started_at) = (self.timeout?, self.started_at?);
        if now.saturating_duration_since(started_at) < timeout {
            return None;
        }

        warn!(
            "Calibration timed out after {:.1}s with {} of {} samples",
            timeout.as_secs_f64(),
            self.state.samples.len(),
            self.capacity
        );
        Some(self.finish_with(FallbackReason::TimedOut))
    }

    fn finish_with(&mut self, reason: FallbackReason) -> Thresholds {
        let collected = self.state.samples.len();
        let (thresholds, outcome) = match self.personalized_baseline() {
            Ok(neutral_pitch) => {
                info!("Calibrated: neutral pitch {neutral_pitch:.2} from {collected} samples");
                (
                    Thresholds::around(neutral_pitch, self.margin),
                    CalibrationOutcome::Personalized { samples: collected },
                )
            }
            Err(e) => {
                warn!("{e}; using default calibration");
                (
                    Thresholds::fallback(self.margin),
                    CalibrationOutcome::Default { collected, reason },
                )
            }
        };

        self.state.thresholds = Some(thresholds);
        self.state.outcome = Some(outcome);
        self.state.is_complete = true;
        thresholds
    }

    fn personalized_baseline(&self) -> Result<f64> {
        let collected = self.state.samples.len();
        if collected <= self.min_samples {
            return Err(Error::InsufficientCalibrationData {
                collected,
                required: self.min_samples,
            });
        }
        let sum: f64 = self.state.samples.iter().map(|s| s.pitch).sum();
        Ok(sum / collected as f64)
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.state.is_complete
    }

    #[must_use]
    pub fn thresholds(&self) -> Option<Thresholds> {
        self.state.thresholds
    }

    #[must_use]
    pub fn state(&self) -> &CalibrationState {
        &self.state
    }
}
