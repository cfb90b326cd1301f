//! Remote authority for attendance sessions.
//!
//! The backend issues, extends and cancels sessions and owns the real expiry.
//! Calls are one-shot; nothing at this layer retries.

pub mod http;

use crate::error::AttendanceError;
use crate::model::{AttendanceSession, ClassId, SessionExpiry, SessionId};
use async_trait::async_trait;

pub use http::HttpAttendanceBackend;

#[async_trait]
pub trait AttendanceBackend: Send + Sync {
    /// Creates a session for `class_id`.
    async fn create_session(&self, class_id: &ClassId)
    -> Result<AttendanceSession, AttendanceError>;

    /// Pushes out the expiry of `session_id`. The backend decides whether this is allowed.
    async fn extend_session(&self, session_id: &SessionId)
    -> Result<SessionExpiry, AttendanceError>;

    /// Ends `session_id` now.
    async fn cancel_session(&self, session_id: &SessionId)
    -> Result<SessionExpiry, AttendanceError>;
}
