//! Head tilt control for pose-driven games.
//!
//! This library turns a stream of 2D facial landmarks into a stable
//! three-state game command (jump / duck / nothing):
//! - Pitch estimation from the nose, eye, chin and forehead landmarks
//! - Per-user calibration of the neutral head position
//! - Per-frame classification against the calibrated thresholds
//! - Recency-weighted voting over the last few frames to reject noise
//!
//! The landmark detector itself is external: anything that can hand over
//! normalized Face Mesh style points per frame implements
//! [`source::LandmarkSource`].
//!
//! # Examples
//!
//! ## Driving the tracker frame by frame
//!
//! ```no_run
//! use head_tilt_control::{
//!     config::Config,
//!     landmarks::FaceDetection,
//!     source::MemorySource,
//!     tracker::HeadTiltTracker,
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let source = MemorySource::new(vec![]);
//! let mut tracker = HeadTiltTracker::new(&Config::default(), Box::new(source))?;
//! tracker.start()?;
//!
//! // Called by whatever owns the camera subscription, once per frame
//! let detection = FaceDetection::new(vec![(0.5, 0.5); 468]);
//! tracker.process_frame(&detection);
//!
//! // Polled by the game loop, once per render tick
//! if let Some(command) = tracker.command() {
//!     if command.up {
//!         println!("jump");
//!     } else if command.down {
//!         println!("duck");
//!     }
//! }
//!
//! tracker.stop();
//! # Ok(())
//! # }
//! ```
//!
//! ## Reading commands from another thread
//!
//! ```no_run
//! use head_tilt_control::{config::Config, source::ReplaySource, tracker::HeadTiltTracker};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let source = ReplaySource::new("session.jsonl");
//! let mut tracker = HeadTiltTracker::new(&Config::default(), Box::new(source))?;
//! let reader = tracker.command_reader();
//!
//! let game = std::thread::spawn(move || {
//!     for _ in 0..600 {
//!         let _jumping = reader.command().is_some_and(|c| c.up);
//!         std::thread::sleep(std::time::Duration::from_millis(16));
//!     }
//! });
//!
//! tracker.start()?;
//! while tracker.step()?.is_some() {}
//! tracker.stop();
//! game.join().ok();
//! # Ok(())
//! # }
//! ```

/// Landmark input types and named-point extraction
pub mod landmarks;

/// Pitch estimation from facial landmarks
pub mod pose_estimation;

/// Pitch smoothing filters
pub mod filters;

/// Neutral-pose calibration
pub mod calibration;

/// Per-frame command classification
pub mod classifier;

/// Recency-weighted command voting
pub mod stabilizer;

/// Landmark sources (trace replay, in-memory)
pub mod source;

/// Tracker lifecycle and command output
pub mod tracker;

/// Error types and result handling
pub mod error;

/// Replay application
pub mod app;

/// Constants used throughout the library
pub mod constants;

/// Configuration management
pub mod config;

pub use error::{Error, Result};
