//! Timer abstraction for phase transitions
//!
//! The engine asks a `Scheduler` to deliver a `TimerToken` back after a delay
//! and remembers the one token it is waiting for. Drivers call
//! `GameEngine::fire` when a token comes due; anything other than the pending
//! token is ignored.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Identifier of one scheduled transition
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerToken(pub u64);

/// Which transition a timer drives
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TimerKind {
    /// `Rolling -> Result`
    RollComplete,
    /// `Result -> Waiting`
    ResultExpired,
}

/// Delivers tokens back to the engine's driver after a delay
pub trait Scheduler {
    fn schedule(&mut self, delay: Duration, token: TimerToken);

    /// Drop a scheduled token; unknown tokens are ignored
    fn cancel(&mut self, token: TimerToken);
}

/// Virtual-clock scheduler driven by `GameEngine::advance`
#[derive(Debug, Default)]
pub struct ManualScheduler {
    now: Duration,
    timers: Vec<(Duration, TimerToken)>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Virtual time elapsed so far
    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn pending_count(&self) -> usize {
        self.timers.len()
    }

    /// Deadline of the earliest timer, if any
    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.iter().map(|(due, _)| *due).min()
    }

    /// Remove and return the earliest timer due at or before `deadline`
    ///
    /// Moves the clock to that timer's deadline. Ties fire in scheduling order.
    pub fn pop_due(&mut self, deadline: Duration) -> Option<TimerToken> {
        let index = self
            .timers
            .iter()
            .enumerate()
            .filter(|(_, (due, _))| *due <= deadline)
            .min_by_key(|(_, (due, token))| (*due, *token))
            .map(|(index, _)| index)?;

        let (due, token) = self.timers.remove(index);
        self.now = self.now.max(due);
        Some(token)
    }

    /// Move the clock forward without firing anything
    pub fn set_now(&mut self, now: Duration) {
        self.now = self.now.max(now);
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&mut self, delay: Duration, token: TimerToken) {
        self.timers.push((self.now + delay, token));
    }

    fn cancel(&mut self, token: TimerToken) {
        self.timers.retain(|(_, scheduled)| *scheduled != token);
    }
}
