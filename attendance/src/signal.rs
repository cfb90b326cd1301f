//! Presentation signals and the broadcast bus that carries them.
//!
//! Views subscribe to a [`SignalBus`] and render whatever they receive; the
//! controller never knows how a tick or the expiry transition is drawn.

use crate::error::{ErrorKind, Operation};
use crate::model::AttendanceSession;
use chrono::Utc;
use serde::Serialize;
use tokio::sync::broadcast;

const CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "payload", rename_all = "snake_case")]
pub enum SessionSignal {
    /// A new session is being tracked.
    Started { session: AttendanceSession },
    /// One countdown step happened.
    Tick { remaining_seconds: u64 },
    /// Countdown entered the warning window; show the extend affordance.
    WarningThresholdReached,
    /// The backend confirmed an extension; countdown restarts from here.
    Extended { remaining_seconds: u64 },
    /// Countdown hit zero. Highlight for `highlight_ms`, then fade for `fade_ms`.
    Expired { highlight_ms: u64, fade_ms: u64 },
    /// Fade finished; the session is gone.
    Cleared,
    Error {
        operation: Operation,
        kind: ErrorKind,
        message: String,
    },
}

impl SessionSignal {
    pub fn name(&self) -> &'static str {
        match self {
            SessionSignal::Started { .. } => "attendance.started",
            SessionSignal::Tick { .. } => "attendance.tick",
            SessionSignal::WarningThresholdReached => "attendance.warning",
            SessionSignal::Extended { .. } => "attendance.extended",
            SessionSignal::Expired { .. } => "attendance.expired",
            SessionSignal::Cleared => "attendance.cleared",
            SessionSignal::Error { .. } => "attendance.error",
        }
    }
}

/// Standard envelope for serialized signals.
#[derive(Serialize)]
pub struct SignalEnvelope<'a> {
    pub name: &'static str,
    #[serde(flatten)]
    pub signal: &'a SessionSignal,
    pub ts: String,
}

impl SessionSignal {
    /// JSON line for log sinks and machine-readable views.
    pub fn to_json(&self) -> Option<String> {
        let env = SignalEnvelope {
            name: self.name(),
            signal: self,
            ts: Utc::now().to_rfc3339(),
        };
        serde_json::to_string(&env).ok()
    }
}

/// Fan-out of [`SessionSignal`]s to any number of views.
#[derive(Clone)]
pub struct SignalBus {
    tx: broadcast::Sender<SessionSignal>,
}

impl Default for SignalBus {
    fn default() -> Self {
        Self::new()
    }
}

impl SignalBus {
    pub fn new() -> Self {
        Self {
            tx: broadcast::channel(CHANNEL_CAPACITY).0,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionSignal> {
        self.tx.subscribe()
    }

    /// Sends to current subscribers; a no-op when nobody listens.
    pub fn emit(&self, signal: SessionSignal) {
        tracing::trace!(signal = signal.name(), "emit");
        let _ = self.tx.send(signal);
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}
