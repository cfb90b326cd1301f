#![allow(dead_code, unused_imports)]

pub mod backend;
pub mod server;

pub use backend::{ScriptedBackend, expiry, session};
pub use server::{MockApi, spawn_mock_api};

use attendance::SessionSignal;
use tokio::sync::broadcast::{Receiver, error::TryRecvError};

/// Collects every signal already queued on `rx`.
pub fn drain(rx: &mut Receiver<SessionSignal>) -> Vec<SessionSignal> {
    let mut out = Vec::new();
    loop {
        match rx.try_recv() {
            Ok(signal) => out.push(signal),
            Err(TryRecvError::Lagged(_)) => continue,
            Err(_) => break,
        }
    }
    out
}

pub fn ticks(signals: &[SessionSignal]) -> Vec<u64> {
    signals
        .iter()
        .filter_map(|s| match s {
            SessionSignal::Tick { remaining_seconds } => Some(*remaining_seconds),
            _ => None,
        })
        .collect()
}

pub fn count(signals: &[SessionSignal], name: &str) -> usize {
    signals.iter().filter(|s| s.name() == name).count()
}
