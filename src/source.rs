//! Landmark sources.
//!
//! A [`LandmarkSource`] owns the underlying sensor (a camera feeding a face
//! landmark detector, or a recorded trace). The tracker opens it on start,
//! pulls one detection per frame, and closes it on stop.

use crate::{landmarks::FaceDetection, Error, Result};
use log::{debug, info, warn};
use std::{
    collections::VecDeque,
    fs::File,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
};

/// Provider of per-frame face detections
pub trait LandmarkSource: Send {
    /// Acquire the sensor
    ///
    /// # Errors
    ///
    /// Returns `SensorUnavailable` if the sensor cannot be started
    fn open(&mut self) -> Result<()>;

    /// Next detection; `Ok(None)` when the stream has ended
    fn next_frame(&mut self) -> Result<Option<FaceDetection>>;

    /// Release the sensor. Must be idempotent.
    fn close(&mut self);

    /// Whether the sensor is currently held
    fn is_open(&self) -> bool;

    /// Human-readable name for logs
    fn name(&self) -> &str;
}

/// Replays a JSON-lines landmark trace, one [`FaceDetection`] per line.
///
/// Lines that do not decode are logged and skipped; the stream continues.
pub struct ReplaySource {
    path: PathBuf,
    reader: Option<BufReader<File>>,
    line: usize,
    corrupt_lines: usize,
    name: String,
}

impl ReplaySource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let name = format!("replay:{}", path.display());
        Self {
            path,
            reader: None,
            line: 0,
            corrupt_lines: 0,
            name,
        }
    }

    /// Lines consumed so far
    #[must_use]
    pub fn line(&self) -> usize {
        self.line
    }

    /// Lines skipped because they did not decode
    #[must_use]
    pub fn corrupt_lines(&self) -> usize {
        self.corrupt_lines
    }
}

impl LandmarkSource for ReplaySource {
    fn open(&mut self) -> Result<()> {
        let file = File::open(&self.path).map_err(|e| {
            Error::SensorUnavailable(format!("cannot open trace {}: {e}", self.path.display()))
        })?;
        info!("Opened landmark trace {}", self.path.display());
        self.reader = Some(BufReader::new(file));
        self.line = 0;
        self.corrupt_lines = 0;
        Ok(())
    }

    fn next_frame(&mut self) -> Result<Option<FaceDetection>> {
        let Some(reader) = self.reader.as_mut() else {
            return Err(Error::InvalidState("trace is not open".to_string()));
        };

        let mut buf = String::new();
        loop {
            buf.clear();
            if reader.read_line(&mut buf)? == 0 {
                debug!("End of trace after {} lines", self.line);
                return Ok(None);
            }
            self.line += 1;
            let trimmed = buf.trim();
            // Blank lines and comments
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            match serde_json::from_str(trimmed) {
                Ok(detection) => return Ok(Some(detection)),
                Err(e) => {
                    self.corrupt_lines += 1;
                    warn!("Skipping undecodable trace line {}: {}", self.line, Error::from(e));
                }
            }
        }
    }

    fn close(&mut self) {
        if self.reader.take().is_some() {
            info!("Closed landmark trace {}", self.path.display());
        }
    }

    fn is_open(&self) -> bool {
        self.reader.is_some()
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// In-memory source, for scripted sessions and benchmarks
#[derive(Debug, Default)]
pub struct MemorySource {
    frames: VecDeque<FaceDetection>,
    open: bool,
    fail_open: bool,
}

impl MemorySource {
    pub fn new(frames: impl IntoIterator<Item = FaceDetection>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
            open: false,
            fail_open: false,
        }
    }

    /// Source whose sensor never starts
    #[must_use]
    pub fn unavailable() -> Self {
        Self {
            fail_open: true,
            ..Self::default()
        }
    }

    /// Frames not yet consumed
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl LandmarkSource for MemorySource {
    fn open(&mut self) -> Result<()> {
        if self.fail_open {
            return Err(Error::SensorUnavailable("memory source configured to fail".to_string()));
        }
        self.open = true;
        Ok(())
    }

    fn next_frame(&mut self) -> Result<Option<FaceDetection>> {
        if !self.open {
            return Err(Error::InvalidState("source is not open".to_string()));
        }
        Ok(self.frames.pop_front())
    }

    fn close(&mut self) {
        self.open = false;
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn temp_trace(name: &str, content: &str) -> PathBuf {
        let path = std::env::temp_dir()
            .join(format!("head_tilt_{}_{name}.jsonl", std::process::id()));
        let mut file = File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_replay_reads_lines() {
        let path = temp_trace(
            "reads",
            concat!(
                "# recorded session\n",
                "{\"points\": [[0.1, 0.2], [0.3, 0.4]], \"confidence\": 0.9}\n",
                "\n",
                "{\"points\": []}\n",
            ),
        );
        let mut source = ReplaySource::new(&path);
        source.open().unwrap();

        let first = source.next_frame().unwrap().unwrap();
        assert_eq!(first.points.len(), 2);
        assert_eq!(first.confidence, Some(0.9));

        let second = source.next_frame().unwrap().unwrap();
        assert!(!second.has_face());

        assert!(source.next_frame().unwrap().is_none());
        source.close();
        assert!(!source.is_open());
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_replay_missing_file_is_sensor_unavailable() {
        let mut source = ReplaySource::new("/nonexistent/trace.jsonl");
        assert!(matches!(source.open(), Err(Error::SensorUnavailable(_))));
        assert!(!source.is_open());
    }

    #[test]
    fn test_replay_skips_bad_lines() {
        let path = temp_trace(
            "bad",
            "not json\n{\"points\": [[0.1\n{\"points\": [[0.5, 0.5]]}\n",
        );
        let mut source = ReplaySource::new(&path);
        source.open().unwrap();

        let frame = source.next_frame().unwrap().unwrap();
        assert_eq!(frame.points, vec![(0.5, 0.5)]);
        assert_eq!(source.corrupt_lines(), 2);
        assert_eq!(source.line(), 3);
        assert!(source.next_frame().unwrap().is_none());
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_memory_source() {
        let mut source = MemorySource::new(vec![FaceDetection::empty()]);
        assert!(source.next_frame().is_err());
        source.open().unwrap();
        assert!(source.next_frame().unwrap().is_some());
        assert!(source.next_frame().unwrap().is_none());
        assert!(MemorySource::unavailable().open().is_err());
    }
}
