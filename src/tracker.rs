//! Head tilt tracker: the single entry point tying the pipeline together.
//!
//! ```text
//! detection -> LandmarkFrame -> PoseEstimator -> Calibrator          (calibrating)
//!                                             -> PitchFilter -> CommandClassifier
//!                                                -> CommandStabilizer -> Command (active)
//! ```
//!
//! Lifecycle: `Uninitialized -> Calibrating -> Active`, `Active -> Calibrating`
//! on [`HeadTiltTracker::recalibrate`], any state `-> Stopped` on
//! [`HeadTiltTracker::stop`]. Commands are only emitted while `Active`.
//!
//! Frame processing is synchronous. The game loop reads the emitted command
//! either through [`HeadTiltTracker::command`] or, from another thread,
//! through a [`CommandReader`].

use crate::{
    calibration::{CalibrationProgress, CalibrationState, Calibrator, Thresholds},
    classifier::{CommandClassifier, RawCommand},
    config::Config,
    filters::PitchFilter,
    landmarks::{FaceDetection, LandmarkFrame, LandmarkIndices},
    pose_estimation::{PoseEstimator, PoseSample},
    source::LandmarkSource,
    stabilizer::CommandStabilizer,
    Error, Result,
};
use log::{debug, info, warn};
use std::{
    fmt,
    sync::{
        atomic::{AtomicU8, Ordering},
        Arc,
    },
    time::Instant,
};

/// Game action requested by the player's head tilt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Command {
    /// Jump
    pub up: bool,
    /// Duck
    pub down: bool,
}

impl Command {
    pub const UP: Self = Self { up: true, down: false };
    pub const DOWN: Self = Self { up: false, down: true };

    /// Command for a stabilized raw command; neutral maps to `None`
    #[must_use]
    pub fn from_raw(raw: RawCommand) -> Option<Self> {
        match raw {
            RawCommand::Up => Some(Self::UP),
            RawCommand::Down => Some(Self::DOWN),
            RawCommand::Neutral => None,
        }
    }
}

const SIGNAL_NONE: u8 = 0;
const SIGNAL_UP: u8 = 1;
const SIGNAL_DOWN: u8 = 2;

fn encode(command: Option<Command>) -> u8 {
    match command {
        Some(Command { up: true, .. }) => SIGNAL_UP,
        Some(Command { down: true, .. }) => SIGNAL_DOWN,
        _ => SIGNAL_NONE,
    }
}

/// Lock-free read handle on the tracker's emitted command
#[derive(Debug, Clone)]
pub struct CommandReader {
    signal: Arc<AtomicU8>,
}

impl CommandReader {
    /// Latest emitted command; `None` when not ready or neutral
    #[must_use]
    pub fn command(&self) -> Option<Command> {
        match self.signal.load(Ordering::Acquire) {
            SIGNAL_UP => Some(Command::UP),
            SIGNAL_DOWN => Some(Command::DOWN),
            _ => None,
        }
    }
}

/// Tracker lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerState {
    Uninitialized,
    Calibrating,
    Active,
    Stopped,
}

impl fmt::Display for TrackerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Uninitialized => "uninitialized",
            Self::Calibrating => "calibrating",
            Self::Active => "active",
            Self::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// Why a frame was skipped without changing any state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NoFace,
    MissingLandmark,
    InvalidLandmarks,
    DegenerateGeometry,
    LowConfidence,
}

impl SkipReason {
    fn from_error(error: &Error) -> Self {
        match error {
            Error::MissingLandmark { .. } => Self::MissingLandmark,
            Error::DegenerateGeometry { .. } => Self::DegenerateGeometry,
            Error::InvalidInput(_) => Self::InvalidLandmarks,
            _ => Self::NoFace,
        }
    }
}

/// Result of processing one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameOutcome {
    /// Tracker is not calibrating or active
    Ignored,
    /// Frame dropped, no state changed
    Skipped(SkipReason),
    /// Sample added to the calibration window
    Calibrating(CalibrationProgress),
    /// Calibration completed with these thresholds. A frame that arrives
    /// as the timeout expires is classified instead when it holds a usable
    /// face.
    Calibrated(Thresholds),
    /// Frame classified
    Classified {
        raw: RawCommand,
        emitted: Option<Command>,
    },
}

/// Head tilt tracker
pub struct HeadTiltTracker {
    indices: LandmarkIndices,
    min_confidence: f64,
    estimator: PoseEstimator,
    calibrator: Calibrator,
    filter: Box<dyn PitchFilter>,
    classifier: CommandClassifier,
    stabilizer: CommandStabilizer,
    source: Box<dyn LandmarkSource>,
    state: TrackerState,
    emitted: Option<Command>,
    signal: Arc<AtomicU8>,
    last_sample: Option<PoseSample>,
}

impl HeadTiltTracker {
    /// Create a tracker around a landmark source
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the configuration does not validate
    pub fn new(config: &Config, source: Box<dyn LandmarkSource>) -> Result<Self> {
        config.validate()?;
        info!("Initializing head tilt tracker with source {}", source.name());

        Ok(Self {
            indices: config.landmarks,
            min_confidence: config.pose.min_confidence,
            estimator: PoseEstimator::new(&config.pose),
            calibrator: Calibrator::new(&config.calibration),
            filter: config.create_filter()?,
            classifier: CommandClassifier::new(),
            stabilizer: CommandStabilizer::from_config(&config.stabilizer),
            source,
            state: TrackerState::Uninitialized,
            emitted: None,
            signal: Arc::new(AtomicU8::new(SIGNAL_NONE)),
            last_sample: None,
        })
    }

    /// Open the landmark source and begin calibrating
    pub fn start(&mut self) -> Result<()> {
        self.start_at(Instant::now())
    }

    /// [`HeadTiltTracker::start`] with an explicit clock reading
    ///
    /// # Errors
    ///
    /// Returns `SensorUnavailable` if the source cannot be opened (the
    /// tracker stays uninitialized and never emits), or `InvalidState` if the
    /// tracker was already started or has been stopped.
    pub fn start_at(&mut self, now: Instant) -> Result<()> {
        if self.state != TrackerState::Uninitialized {
            return Err(Error::InvalidState(format!(
                "cannot start a tracker that is {}",
                self.state
            )));
        }

        if let Err(e) = self.source.open() {
            warn!("Landmark source {} failed to start: {e}", self.source.name());
            return Err(match e {
                e @ Error::SensorUnavailable(_) => e,
                other => Error::SensorUnavailable(other.to_string()),
            });
        }

        self.calibrator.start_calibration(now);
        self.transition(TrackerState::Calibrating);
        Ok(())
    }

    /// Release the landmark source. Safe from any state; terminal.
    pub fn stop(&mut self) {
        if self.source.is_open() {
            self.source.close();
        }
        self.classifier.clear();
        self.stabilizer.reset();
        self.publish(None);
        if self.state != TrackerState::Stopped {
            self.transition(TrackerState::Stopped);
        }
    }

    /// Discard the current calibration and collect a new one
    pub fn recalibrate(&mut self) -> Result<()> {
        self.recalibrate_at(Instant::now())
    }

    /// [`HeadTiltTracker::recalibrate`] with an explicit clock reading
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` unless the tracker is calibrating or active
    pub fn recalibrate_at(&mut self, now: Instant) -> Result<()> {
        match self.state {
            TrackerState::Active | TrackerState::Calibrating => {
                // Thresholds, votes and the published command go together
                self.classifier.clear();
                self.stabilizer.reset();
                self.filter.reset();
                self.publish(None);
                self.calibrator.recalibrate(now);
                if self.state != TrackerState::Calibrating {
                    self.transition(TrackerState::Calibrating);
                }
                Ok(())
            }
            state => Err(Error::InvalidState(format!(
                "cannot recalibrate a tracker that is {state}"
            ))),
        }
    }

    /// Process one detection from the landmark source
    pub fn process_frame(&mut self, detection: &FaceDetection) -> FrameOutcome {
        self.process_frame_at(detection, Instant::now())
    }

    /// [`HeadTiltTracker::process_frame`] with an explicit clock reading
    pub fn process_frame_at(&mut self, detection: &FaceDetection, now: Instant) -> FrameOutcome {
        if !matches!(self.state, TrackerState::Calibrating | TrackerState::Active) {
            return FrameOutcome::Ignored;
        }

        let timed_out = self.tick_at(now);

        let sample = match (self.sample_for(detection), timed_out) {
            (Ok(sample), _) => sample,
            (Err(_), Some(thresholds)) => return FrameOutcome::Calibrated(thresholds),
            (Err(reason), None) => return FrameOutcome::Skipped(reason),
        };
        self.last_sample = Some(sample);

        match self.state {
            TrackerState::Calibrating => match self.calibrator.add_sample(sample) {
                CalibrationProgress::Full => {
                    let thresholds = self.calibrator.finish_calibration();
                    self.activate(thresholds);
                    FrameOutcome::Calibrated(thresholds)
                }
                progress => FrameOutcome::Calibrating(progress),
            },
            _ => self.classify(sample),
        }
    }

    /// Apply the calibration timeout when no frames are arriving
    pub fn tick(&mut self) -> Option<Thresholds> {
        self.tick_at(Instant::now())
    }

    /// [`HeadTiltTracker::tick`] with an explicit clock reading.
    ///
    /// Returns the thresholds if this call completed calibration.
    pub fn tick_at(&mut self, now: Instant) -> Option<Thresholds> {
        if self.state != TrackerState::Calibrating {
            return None;
        }
        let thresholds = self.calibrator.check_timeout(now)?;
        self.activate(thresholds);
        Some(thresholds)
    }

    /// Pull one frame from the owned source and process it
    pub fn step(&mut self) -> Result<Option<FrameOutcome>> {
        self.step_at(Instant::now())
    }

    /// [`HeadTiltTracker::step`] with an explicit clock reading
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` if the tracker is not running, or the source's
    /// error if reading the next frame fails. `Ok(None)` means end of stream.
    pub fn step_at(&mut self, now: Instant) -> Result<Option<FrameOutcome>> {
        if !matches!(self.state, TrackerState::Calibrating | TrackerState::Active) {
            return Err(Error::InvalidState(format!(
                "cannot step a tracker that is {}",
                self.state
            )));
        }
        match self.source.next_frame()? {
            Some(detection) => Ok(Some(self.process_frame_at(&detection, now))),
            None => Ok(None),
        }
    }

    /// Latest emitted command; `None` when not ready or neutral
    #[must_use]
    pub fn command(&self) -> Option<Command> {
        self.emitted
    }

    /// Handle for reading the command from another thread
    #[must_use]
    pub fn command_reader(&self) -> CommandReader {
        CommandReader {
            signal: Arc::clone(&self.signal),
        }
    }

    #[must_use]
    pub fn state(&self) -> TrackerState {
        self.state
    }

    #[must_use]
    pub fn calibration(&self) -> &CalibrationState {
        self.calibrator.state()
    }

    /// Thresholds currently used for classification
    #[must_use]
    pub fn thresholds(&self) -> Option<Thresholds> {
        self.classifier.thresholds()
    }

    /// Raw commands currently held by the stabilizer
    #[must_use]
    pub fn history_len(&self) -> usize {
        self.stabilizer.len()
    }

    /// Most recent accepted pose sample
    #[must_use]
    pub fn last_sample(&self) -> Option<PoseSample> {
        self.last_sample
    }

    #[must_use]
    pub fn filter_name(&self) -> &str {
        self.filter.name()
    }

    fn sample_for(&self, detection: &FaceDetection) -> std::result::Result<PoseSample, SkipReason> {
        let sample = LandmarkFrame::from_detection(detection, &self.indices)
            .and_then(|frame| self.estimator.estimate(&frame))
            .map_err(|e| {
                debug!("Skipping frame: {e}");
                SkipReason::from_error(&e)
            })?;

        if sample.confidence < self.min_confidence {
            debug!(
                "Skipping frame: confidence {:.2} below {:.2}",
                sample.confidence, self.min_confidence
            );
            return Err(SkipReason::LowConfidence);
        }
        Ok(sample)
    }

    fn classify(&mut self, sample: PoseSample) -> FrameOutcome {
        let pitch = self.filter.apply(sample.pitch);
        let Some(raw) = self.classifier.classify(pitch) else {
            return FrameOutcome::Ignored;
        };
        let emitted = Command::from_raw(self.stabilizer.push(raw));
        self.publish(emitted);
        FrameOutcome::Classified { raw, emitted }
    }

    fn activate(&mut self, thresholds: Thresholds) {
        self.classifier.set_thresholds(thresholds);
        self.stabilizer.reset();
        self.filter.reset();
        self.publish(None);
        info!(
            "Thresholds: up < {:.2} < neutral {:.2} < {:.2} < down",
            thresholds.up_threshold, thresholds.neutral_pitch, thresholds.down_threshold
        );
        self.transition(TrackerState::Active);
    }

    fn publish(&mut self, command: Option<Command>) {
        if command != self.emitted {
            debug!("Command changed: {:?} -> {:?}", self.emitted, command);
        }
        self.emitted = command;
        self.signal.store(encode(command), Ordering::Release);
    }

    fn transition(&mut self, next: TrackerState) {
        info!("Tracker {} -> {}", self.state, next);
        self.state = next;
    }
}

impl Drop for HeadTiltTracker {
    fn drop(&mut self) {
        if self.source.is_open() {
            self.source.close();
        }
    }
}
