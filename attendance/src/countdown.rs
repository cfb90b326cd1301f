//! Countdown arithmetic and phase classification.
//!
//! Remaining seconds are read off a monotonic deadline taken when the backend
//! value arrived, rounded up to whole seconds. The tick timer only decides
//! when to look, so any tick interval counts in real seconds and a suspended
//! process catches up on resume instead of drifting. The value never goes up
//! between backend refreshes.

use serde::Serialize;
use std::time::Duration;
use tokio::time::Instant;
use util::config::AppConfig;

/// Timer constants for one controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountdownTiming {
    pub tick: Duration,
    pub warning_threshold_secs: u64,
    pub highlight: Duration,
    pub fade: Duration,
}

impl Default for CountdownTiming {
    fn default() -> Self {
        Self {
            tick: Duration::from_secs(1),
            warning_threshold_secs: 10,
            highlight: Duration::from_millis(500),
            fade: Duration::from_millis(2000),
        }
    }
}

impl CountdownTiming {
    pub fn from_config(cfg: &AppConfig) -> Self {
        Self {
            tick: Duration::from_millis(cfg.tick_interval_ms.max(1)),
            warning_threshold_secs: cfg.warning_threshold_secs,
            highlight: Duration::from_millis(cfg.expiry_highlight_ms),
            fade: Duration::from_millis(cfg.expiry_fade_ms),
        }
    }

    /// Highlight plus fade: how long an expired session stays visible.
    pub fn expiry_transition(&self) -> Duration {
        self.highlight + self.fade
    }

    pub fn phase_for(&self, remaining_seconds: u64) -> SessionPhase {
        if remaining_seconds == 0 {
            SessionPhase::Expiring
        } else if remaining_seconds <= self.warning_threshold_secs {
            SessionPhase::Warning
        } else {
            SessionPhase::Running
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// Nothing tracked.
    Idle,
    /// Counting down, above the warning threshold.
    Running,
    /// Inside the warning window; extend is offered.
    Warning,
    /// Reached zero; the expiry transition is playing.
    Expiring,
}

impl SessionPhase {
    /// Whether the tick timer should be alive in this phase.
    pub fn is_counting(self) -> bool {
        matches!(self, SessionPhase::Running | SessionPhase::Warning)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Countdown {
    remaining: u64,
    deadline: Instant,
}

impl Countdown {
    pub fn new(remaining_seconds: u64, now: Instant) -> Self {
        Self {
            remaining: remaining_seconds,
            deadline: now + Duration::from_secs(remaining_seconds),
        }
    }

    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    /// Re-reads the deadline at `now` and returns the remaining seconds.
    pub fn tick(&mut self, now: Instant) -> u64 {
        let left = self.deadline.saturating_duration_since(now);
        // Round up so a slightly late tick does not skip a second.
        let left_secs = left.as_millis().div_ceil(1000) as u64;
        self.remaining = self.remaining.min(left_secs);
        self.remaining
    }

    pub fn force_zero(&mut self) {
        self.remaining = 0;
    }
}
