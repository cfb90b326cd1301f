//! # Attendance session controller
//!
//! Tracks at most one attendance session and drives its countdown:
//!
//! ```text
//! Idle --start--> Running --tick (<= threshold)--> Warning --tick (0)--> Expiring --fade--> Idle
//!                    ^                                |
//!                    +-----------extend---------------+
//! Running | Warning --cancel--> Expiring
//! ```
//!
//! Backend calls never hold the state lock. Their results are applied in one
//! critical section, so a tick never observes a half-applied extension. Every
//! timer task is tagged with a generation number; bumping it (new session,
//! extension, expiry, shutdown) silences anything still scheduled from before.

use crate::backend::AttendanceBackend;
use crate::countdown::{Countdown, CountdownTiming, SessionPhase};
use crate::error::{AttendanceError, Operation};
use crate::model::{AttendanceSession, ClassId, SessionExpiry, SessionId};
use crate::notify::{Notification, NotificationSurface};
use crate::signal::{SessionSignal, SignalBus};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at, sleep};
use tracing::{debug, info, warn};

struct Tracked {
    session: AttendanceSession,
    countdown: Countdown,
    phase: SessionPhase,
}

#[derive(Default)]
struct State {
    tracked: Option<Tracked>,
    generation: u64,
    ticker: Option<JoinHandle<()>>,
    fader: Option<JoinHandle<()>>,
}

impl State {
    /// Aborts any scheduled tick or fade and invalidates their generation.
    fn stop_timers(&mut self) -> u64 {
        if let Some(handle) = self.ticker.take() {
            handle.abort();
        }
        if let Some(handle) = self.fader.take() {
            handle.abort();
        }
        self.generation += 1;
        self.generation
    }

    fn tracked_mut(&mut self, id: &SessionId) -> Option<&mut Tracked> {
        self.tracked.as_mut().filter(|t| &t.session.id == id)
    }
}

struct Shared {
    state: Mutex<State>,
    bus: SignalBus,
    timing: CountdownTiming,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn track(self: &Arc<Self>, session: AttendanceSession) {
        let mut st = self.lock();
        st.stop_timers();

        let remaining = session.time_remaining_seconds;
        let phase = self.timing.phase_for(remaining);
        st.tracked = Some(Tracked {
            countdown: Countdown::new(remaining, Instant::now()),
            session: session.clone(),
            phase: SessionPhase::Running,
        });
        self.bus.emit(SessionSignal::Started { session });

        self.enter(&mut st, phase);
    }

    /// Moves the tracked session into `phase` and (re)schedules its timer.
    /// Expects timers to be stopped unless `phase` is `Expiring`.
    fn enter(self: &Arc<Self>, st: &mut State, phase: SessionPhase) {
        let Some(tracked) = st.tracked.as_mut() else {
            return;
        };
        let previous = tracked.phase;
        tracked.phase = phase;

        match phase {
            SessionPhase::Expiring => self.begin_expiry(st),
            SessionPhase::Running | SessionPhase::Warning => {
                if phase == SessionPhase::Warning && previous != SessionPhase::Warning {
                    self.bus.emit(SessionSignal::WarningThresholdReached);
                }
                let generation = st.generation;
                st.ticker = Some(tokio::spawn(run_ticker(Arc::clone(self), generation)));
            }
            SessionPhase::Idle => {}
        }
    }

    fn begin_expiry(self: &Arc<Self>, st: &mut State) {
        let generation = st.stop_timers();
        let Some(tracked) = st.tracked.as_mut() else {
            return;
        };
        tracked.phase = SessionPhase::Expiring;
        tracked.countdown.force_zero();
        tracked.session.time_remaining_seconds = 0;
        tracked.session.is_active = false;
        info!(session_id = %tracked.session.id, "attendance session expired");

        self.bus.emit(SessionSignal::Expired {
            highlight_ms: self.timing.highlight.as_millis() as u64,
            fade_ms: self.timing.fade.as_millis() as u64,
        });

        let shared = Arc::clone(self);
        let transition = self.timing.expiry_transition();
        st.fader = Some(tokio::spawn(async move {
            sleep(transition).await;
            shared.on_faded(generation);
        }));
    }

    /// Returns `false` once the ticker should stop.
    fn on_tick(self: &Arc<Self>, generation: u64) -> bool {
        let mut st = self.lock();
        if st.generation != generation {
            return false;
        }
        let Some(tracked) = st.tracked.as_mut() else {
            return false;
        };
        if !tracked.phase.is_counting() {
            return false;
        }

        let before = tracked.countdown.remaining();
        let remaining = tracked.countdown.tick(Instant::now());
        if remaining == before {
            return true;
        }
        tracked.session.time_remaining_seconds = remaining;
        let current = tracked.phase;
        debug!(session_id = %tracked.session.id, remaining, "tick");
        self.bus.emit(SessionSignal::Tick {
            remaining_seconds: remaining,
        });

        match self.timing.phase_for(remaining) {
            SessionPhase::Expiring => {
                st.ticker = None;
                self.begin_expiry(&mut st);
                false
            }
            SessionPhase::Warning if current == SessionPhase::Running => {
                if let Some(tracked) = st.tracked.as_mut() {
                    tracked.phase = SessionPhase::Warning;
                }
                self.bus.emit(SessionSignal::WarningThresholdReached);
                true
            }
            _ => true,
        }
    }

    fn on_faded(&self, generation: u64) {
        let mut st = self.lock();
        if st.generation != generation {
            return;
        }
        st.fader = None;
        if let Some(tracked) = st.tracked.take() {
            info!(session_id = %tracked.session.id, "attendance session cleared");
            self.bus.emit(SessionSignal::Cleared);
        }
    }

    /// Applies a confirmed extension. Returns `false` if `id` is not tracked.
    fn apply_extension(self: &Arc<Self>, id: &SessionId, expiry: &SessionExpiry) -> bool {
        let mut st = self.lock();
        let Some(tracked) = st.tracked_mut(id) else {
            return false;
        };
        let remaining = expiry.time_remaining_seconds;
        let was_expiring = tracked.phase == SessionPhase::Expiring;
        tracked.session.apply_expiry(expiry);

        if remaining == 0 {
            if !was_expiring {
                self.begin_expiry(&mut st);
            }
            return true;
        }

        if let Some(tracked) = st.tracked.as_mut() {
            tracked.countdown = Countdown::new(remaining, Instant::now());
        }
        st.stop_timers();
        self.bus.emit(SessionSignal::Extended {
            remaining_seconds: remaining,
        });
        let phase = self.timing.phase_for(remaining);
        self.enter(&mut st, phase);
        true
    }

    /// Forces the tracked session to expire. Returns `false` if `id` is not tracked.
    fn apply_cancellation(self: &Arc<Self>, id: &SessionId, expiry: &SessionExpiry) -> bool {
        let mut st = self.lock();
        let Some(tracked) = st.tracked_mut(id) else {
            return false;
        };
        if tracked.phase == SessionPhase::Expiring {
            return true;
        }
        tracked.session.expires_at = expiry.expires_at;
        self.begin_expiry(&mut st);
        true
    }

    fn teardown(&self) {
        let mut st = self.lock();
        st.stop_timers();
        if let Some(tracked) = st.tracked.take() {
            debug!(session_id = %tracked.session.id, "controller torn down");
        }
    }
}

async fn run_ticker(shared: Arc<Shared>, generation: u64) {
    let period = shared.timing.tick;
    let mut interval = interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        interval.tick().await;
        if !shared.on_tick(generation) {
            break;
        }
    }
}

/// Owns the lifecycle of one attendance session for one view.
///
/// Dropping the controller (or calling [`shutdown`](Self::shutdown)) stops all
/// timers; no signal is emitted afterwards.
pub struct AttendanceSessionController {
    shared: Arc<Shared>,
    backend: Arc<dyn AttendanceBackend>,
    notifier: Arc<dyn NotificationSurface>,
}

impl AttendanceSessionController {
    pub fn new(
        backend: Arc<dyn AttendanceBackend>,
        notifier: Arc<dyn NotificationSurface>,
        timing: CountdownTiming,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(State::default()),
                bus: SignalBus::new(),
                timing,
            }),
            backend,
            notifier,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionSignal> {
        self.shared.bus.subscribe()
    }

    pub fn timing(&self) -> CountdownTiming {
        self.shared.timing
    }

    pub fn phase(&self) -> SessionPhase {
        self.shared
            .lock()
            .tracked
            .as_ref()
            .map_or(SessionPhase::Idle, |t| t.phase)
    }

    /// Current snapshot, including the locally ticked remaining time.
    pub fn session(&self) -> Option<AttendanceSession> {
        self.shared.lock().tracked.as_ref().map(|t| t.session.clone())
    }

    pub fn remaining_seconds(&self) -> Option<u64> {
        self.shared
            .lock()
            .tracked
            .as_ref()
            .map(|t| t.countdown.remaining())
    }

    /// Creates a session for `class_id` and starts counting it down.
    ///
    /// Any session tracked so far is replaced on success and kept on failure.
    pub async fn start(&self, class_id: &ClassId) -> Result<AttendanceSession, AttendanceError> {
        match self.backend.create_session(class_id).await {
            Ok(session) => {
                info!(
                    class_id = %class_id,
                    session_id = %session.id,
                    remaining = session.time_remaining_seconds,
                    "attendance session started"
                );
                self.shared.track(session.clone());
                self.notifier.notify(Notification::success(
                    Operation::Start.success_title(),
                    format!(
                        "Attendance code {} is live for {}s",
                        session.code, session.time_remaining_seconds
                    ),
                ));
                Ok(session)
            }
            Err(err) => {
                self.report(Operation::Start, &err);
                Err(err)
            }
        }
    }

    /// Asks the backend for more time on `session_id`.
    ///
    /// On failure the countdown carries on untouched.
    pub async fn extend(&self, session_id: &SessionId) -> Result<SessionExpiry, AttendanceError> {
        match self.backend.extend_session(session_id).await {
            Ok(expiry) => {
                if self.shared.apply_extension(session_id, &expiry) {
                    info!(
                        session_id = %session_id,
                        remaining = expiry.time_remaining_seconds,
                        "attendance session extended"
                    );
                } else {
                    debug!(session_id = %session_id, "extension for untracked session not applied");
                }
                self.notifier.notify(Notification::success(
                    Operation::Extend.success_title(),
                    format!("{}s remaining", expiry.time_remaining_seconds),
                ));
                Ok(expiry)
            }
            Err(err) => {
                self.report(Operation::Extend, &err);
                Err(err)
            }
        }
    }

    /// Ends `session_id` now and plays the expiry transition.
    ///
    /// On failure the countdown carries on untouched.
    pub async fn cancel(&self, session_id: &SessionId) -> Result<SessionExpiry, AttendanceError> {
        match self.backend.cancel_session(session_id).await {
            Ok(expiry) => {
                if self.shared.apply_cancellation(session_id, &expiry) {
                    info!(session_id = %session_id, "attendance session cancelled");
                } else {
                    debug!(
                        session_id = %session_id,
                        "cancellation for untracked session not applied"
                    );
                }
                self.notifier.notify(Notification::success(
                    Operation::Cancel.success_title(),
                    "Students can no longer use this code",
                ));
                Ok(expiry)
            }
            Err(err) => {
                self.report(Operation::Cancel, &err);
                Err(err)
            }
        }
    }

    /// Stops all timers and forgets the session (the owning view went away).
    pub fn shutdown(&self) {
        self.shared.teardown();
    }

    fn report(&self, operation: Operation, err: &AttendanceError) {
        let kind = err.kind();
        let message = err.user_message();
        warn!(%operation, %kind, error = %err, "attendance operation failed");

        self.notifier.notify(Notification::error(
            operation.failure_title(kind),
            message.clone(),
        ));
        self.shared.bus.emit(SessionSignal::Error {
            operation,
            kind,
            message,
        });
    }
}

impl Drop for AttendanceSessionController {
    fn drop(&mut self) {
        self.shared.teardown();
    }
}
