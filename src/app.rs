//! Replay application: drives a tracker from a recorded landmark trace and
//! plays the part of the game loop, turning emitted commands into actions.

use crate::{
    calibration::CalibrationOutcome,
    config::Config,
    constants::DEFAULT_FPS,
    error::Result,
    source::{LandmarkSource, ReplaySource},
    tracker::{Command, FrameOutcome, HeadTiltTracker, SkipReason},
};
use log::{debug, info, warn};
use std::{
    path::PathBuf,
    thread,
    time::{Duration, Instant},
};

/// Replay application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// JSON-lines landmark trace
    pub trace: PathBuf,
    /// Tracker configuration
    pub tracker: Config,
    /// Replay at the recorded frame rate instead of as fast as possible
    pub realtime: bool,
    /// Frame rate used for realtime pacing
    pub fps: f64,
    /// Recalibrate after this many frames, if set
    pub recalibrate_after: Option<usize>,
}

impl AppConfig {
    /// Replay `trace` with default tracker settings
    pub fn new(trace: impl Into<PathBuf>) -> Self {
        Self {
            trace: trace.into(),
            tracker: Config::default(),
            realtime: false,
            fps: DEFAULT_FPS,
            recalibrate_after: None,
        }
    }
}

/// Counters collected over a replay
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReplaySummary {
    /// Frames read from the trace
    pub frames: usize,
    /// Frames skipped for any reason
    pub skipped: usize,
    /// Frames with no face
    pub no_face: usize,
    /// Frames classified after calibration
    pub classified: usize,
    /// Rising edges of the jump command
    pub jumps: usize,
    /// Rising edges of the duck command
    pub ducks: usize,
    /// How the last calibration was produced
    pub calibration: Option<CalibrationOutcome>,
}

/// Replay application
pub struct ReplayApp {
    config: AppConfig,
    tracker: HeadTiltTracker,
}

impl ReplayApp {
    /// Build the tracker around a replay source for the configured trace
    pub fn new(config: AppConfig) -> Result<Self> {
        info!("Initializing replay of {}", config.trace.display());
        let source = ReplaySource::new(&config.trace);
        Self::with_source(config, Box::new(source))
    }

    /// Build the tracker around an arbitrary landmark source
    pub fn with_source(config: AppConfig, source: Box<dyn LandmarkSource>) -> Result<Self> {
        let tracker = HeadTiltTracker::new(&config.tracker, source)?;
        info!("Pitch filter: {}", tracker.filter_name());
        Ok(Self { config, tracker })
    }

    /// Run the replay to the end of the trace.
    ///
    /// The tracker is stopped before returning, whether or not the replay
    /// completed.
    ///
    /// # Errors
    ///
    /// Returns `SensorUnavailable` if the trace cannot be opened, or the
    /// source's error if reading it fails part way.
    pub fn run(&mut self) -> Result<ReplaySummary> {
        let start = Instant::now();
        let result = self
            .tracker
            .start_at(start)
            .and_then(|()| self.replay(start));
        self.tracker.stop();

        let summary = result?;
        info!(
            "Replay finished: {} frames, {} skipped, {} jumps, {} ducks",
            summary.frames, summary.skipped, summary.jumps, summary.ducks
        );
        Ok(summary)
    }

    fn replay(&mut self, start: Instant) -> Result<ReplaySummary> {
        // A clock that advances one frame period per frame keeps timeouts
        // reproducible when replaying faster than realtime.
        let frame_period = Duration::from_secs_f64(1.0 / self.config.fps.max(1.0));
        let mut clock = start;
        let reader = self.tracker.command_reader();

        let mut summary = ReplaySummary::default();
        let mut previous: Option<Command> = None;

        info!("Entering replay loop");
        loop {
            if self.config.realtime {
                let elapsed = frame_period * u32::try_from(summary.frames).unwrap_or(u32::MAX);
                let target = start + elapsed;
                if let Some(wait) = target.checked_duration_since(Instant::now()) {
                    thread::sleep(wait);
                }
            }

            if self.config.recalibrate_after == Some(summary.frames) && summary.frames > 0 {
                info!("Recalibrating after {} frames", summary.frames);
                self.tracker.recalibrate_at(clock)?;
            }

            let Some(outcome) = self.tracker.step_at(clock)? else {
                info!("End of trace reached");
                break;
            };
            summary.frames += 1;
            clock += frame_period;
            if self.tracker.calibration().is_complete() {
                summary.calibration = self.tracker.calibration().outcome();
            }

            match outcome {
                FrameOutcome::Skipped(reason) => {
                    summary.skipped += 1;
                    if reason == SkipReason::NoFace {
                        summary.no_face += 1;
                    }
                }
                FrameOutcome::Calibrated(thresholds) => {
                    info!(
                        "Calibrated at frame {}: neutral pitch {:.2}",
                        summary.frames, thresholds.neutral_pitch
                    );
                }
                FrameOutcome::Classified { raw, emitted } => {
                    summary.classified += 1;
                    debug!("Frame {}: raw {raw}, emitted {emitted:?}", summary.frames);
                }
                FrameOutcome::Calibrating(_) | FrameOutcome::Ignored => {}
            }

            // Game-loop side: act on rising edges only
            let current = reader.command();
            if current != previous {
                match current {
                    Some(Command { up: true, .. }) => {
                        summary.jumps += 1;
                        info!("Frame {}: JUMP", summary.frames);
                    }
                    Some(Command { down: true, .. }) => {
                        summary.ducks += 1;
                        info!("Frame {}: DUCK", summary.frames);
                    }
                    _ => {}
                }
                previous = current;
            }
        }

        if summary.calibration.is_none() {
            warn!("Trace ended before calibration completed");
        }
        Ok(summary)
    }

    /// Tracker driven by this application
    #[must_use]
    pub fn tracker(&self) -> &HeadTiltTracker {
        &self.tracker
    }
}
