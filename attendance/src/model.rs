//! Attendance session data model and the backend's JSON bodies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Opaque session identifier assigned by the backend.
///
/// The backend may send it as a JSON number or string; it is kept as text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for SessionId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(i64),
            Text(String),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Number(n) => SessionId(n.to_string()),
            Raw::Text(s) => SessionId(s),
        })
    }
}

/// Identifier of the class that owns a session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassId(String);

impl ClassId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Snapshot of one attendance session as last reported by the backend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttendanceSession {
    pub id: SessionId,
    pub class_id: ClassId,
    pub class_name: Option<String>,
    pub code: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub time_remaining_seconds: u64,
    pub is_active: bool,
}

impl AttendanceSession {
    /// Builds the snapshot from a create-session body for `class_id`.
    pub fn from_created(class_id: ClassId, body: CreatedSessionBody) -> Self {
        Self {
            id: body.id,
            class_id,
            class_name: body.class_name,
            code: body.attendance_code,
            created_at: body.created_at,
            expires_at: body.expires_at,
            time_remaining_seconds: clamp_remaining(body.time_remaining),
            is_active: body.is_active,
        }
    }

    /// Overwrites the expiry fields with a fresh backend value.
    pub fn apply_expiry(&mut self, expiry: &SessionExpiry) {
        self.expires_at = expiry.expires_at;
        self.time_remaining_seconds = expiry.time_remaining_seconds;
        self.is_active = expiry.time_remaining_seconds > 0;
    }
}

/// New expiry returned by extend and cancel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionExpiry {
    pub expires_at: DateTime<Utc>,
    pub time_remaining_seconds: u64,
}

impl From<ExpiryBody> for SessionExpiry {
    fn from(body: ExpiryBody) -> Self {
        Self {
            expires_at: body.expires_at,
            time_remaining_seconds: clamp_remaining(body.time_remaining),
        }
    }
}

/// `201` body of create-session.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedSessionBody {
    pub id: SessionId,
    #[serde(default)]
    pub class_name: Option<String>,
    pub attendance_code: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub time_remaining: i64,
}

fn default_active() -> bool {
    true
}

/// `200` body of extend-session and cancel-session.
#[derive(Debug, Clone, Deserialize)]
pub struct ExpiryBody {
    pub expires_at: DateTime<Utc>,
    pub time_remaining: i64,
}

/// Negative remaining time from the backend means "already over".
pub fn clamp_remaining(time_remaining: i64) -> u64 {
    time_remaining.max(0) as u64
}
