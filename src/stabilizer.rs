//! Temporal stabilization of raw commands.
//!
//! The last few raw commands vote; the newest counts extra so an intentional
//! movement is believed faster than it is forgotten. A non-neutral command is
//! only emitted once its vote total reaches `min_votes`, which suppresses a
//! single spurious frame amid neutral ones.

use crate::{classifier::RawCommand, config::StabilizerConfig};
use std::collections::VecDeque;

/// Recency-weighted vote over a short command history
#[derive(Debug, Clone)]
pub struct CommandStabilizer {
    capacity: usize,
    recency_weight: u32,
    min_votes: u32,
    history: VecDeque<RawCommand>,
    current: RawCommand,
}

impl CommandStabilizer {
    /// Create a stabilizer
    #[must_use]
    pub fn new(capacity: usize, recency_weight: u32, min_votes: u32) -> Self {
        Self {
            capacity,
            recency_weight,
            min_votes,
            history: VecDeque::with_capacity(capacity),
            current: RawCommand::Neutral,
        }
    }

    /// Create a stabilizer from configuration
    #[must_use]
    pub fn from_config(config: &StabilizerConfig) -> Self {
        Self::new(config.history_size, config.recency_weight, config.min_votes)
    }

    /// Record a raw command and return the stabilized command
    pub fn push(&mut self, raw: RawCommand) -> RawCommand {
        while self.history.len() >= self.capacity.max(1) {
            self.history.pop_front();
        }
        self.history.push_back(raw);

        self.current = self.vote();
        self.current
    }

    /// Stabilized command after the latest push
    #[must_use]
    pub fn current(&self) -> RawCommand {
        self.current
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.history.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// Clear the history
    pub fn reset(&mut self) {
        self.history.clear();
        self.current = RawCommand::Neutral;
    }

    fn vote(&self) -> RawCommand {
        // Tallies in first-seen order so ties go to the oldest label
        let mut tallies: Vec<(RawCommand, u32)> = Vec::with_capacity(3);
        let newest = self.history.len().saturating_sub(1);

        for (i, &command) in self.history.iter().enumerate() {
            let weight = if i == newest { self.recency_weight } else { 1 };
            match tallies.iter_mut().find(|(c, _)| *c == command) {
                Some((_, total)) => *total += weight,
                None => tallies.push((command, weight)),
            }
        }

        let mut winner: Option<(RawCommand, u32)> = None;
        for &(command, total) in &tallies {
            if winner.map_or(true, |(_, best)| total > best) {
                winner = Some((command, total));
            }
        }

        match winner {
            Some((command, total)) if !command.is_neutral() && total >= self.min_votes => command,
            _ => RawCommand::Neutral,
        }
    }
}

impl Default for CommandStabilizer {
    fn default() -> Self {
        Self::from_config(&StabilizerConfig::default())
    }
}
