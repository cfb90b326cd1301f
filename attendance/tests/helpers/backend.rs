use async_trait::async_trait;
use attendance::{
    AttendanceBackend, AttendanceError, AttendanceSession, ClassId, SessionExpiry, SessionId,
};
use chrono::{TimeZone, Utc};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

pub fn session(id: &str, remaining: u64) -> AttendanceSession {
    let created = Utc.with_ymd_and_hms(2025, 9, 1, 8, 0, 0).unwrap();
    AttendanceSession {
        id: SessionId::new(id),
        class_id: ClassId::new("cos301"),
        class_name: Some("COS 301".into()),
        code: format!("CODE{id}"),
        created_at: created,
        expires_at: created + chrono::Duration::seconds(remaining as i64),
        time_remaining_seconds: remaining,
        is_active: remaining > 0,
    }
}

pub fn expiry(remaining: u64) -> SessionExpiry {
    SessionExpiry {
        expires_at: Utc.with_ymd_and_hms(2025, 9, 1, 9, 0, 0).unwrap(),
        time_remaining_seconds: remaining,
    }
}

type Script<T> = Mutex<VecDeque<Result<T, AttendanceError>>>;

/// Backend whose answers are queued up front by the test.
#[derive(Default)]
pub struct ScriptedBackend {
    starts: Script<AttendanceSession>,
    extends: Script<SessionExpiry>,
    cancels: Script<SessionExpiry>,
    delay: Mutex<Duration>,
    pub calls: AtomicUsize,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_start(self, result: Result<AttendanceSession, AttendanceError>) -> Self {
        self.starts.lock().unwrap().push_back(result);
        self
    }

    pub fn on_extend(self, result: Result<SessionExpiry, AttendanceError>) -> Self {
        self.extends.lock().unwrap().push_back(result);
        self
    }

    pub fn on_cancel(self, result: Result<SessionExpiry, AttendanceError>) -> Self {
        self.cancels.lock().unwrap().push_back(result);
        self
    }

    /// Every call waits this long before answering.
    pub fn with_delay(self, delay: Duration) -> Self {
        *self.delay.lock().unwrap() = delay;
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn answer<T>(&self, script: &Script<T>) -> Result<T, AttendanceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(AttendanceError::BackendRejected {
                    status: 500,
                    message: "unscripted call".into(),
                })
            })
    }
}

#[async_trait]
impl AttendanceBackend for ScriptedBackend {
    async fn create_session(
        &self,
        _class_id: &ClassId,
    ) -> Result<AttendanceSession, AttendanceError> {
        self.answer(&self.starts).await
    }

    async fn extend_session(
        &self,
        _session_id: &SessionId,
    ) -> Result<SessionExpiry, AttendanceError> {
        self.answer(&self.extends).await
    }

    async fn cancel_session(
        &self,
        _session_id: &SessionId,
    ) -> Result<SessionExpiry, AttendanceError> {
        self.answer(&self.cancels).await
    }
}
