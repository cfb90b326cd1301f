//! Attendance Error Types
//!
//! [`AttendanceError`] covers every way a start, extend or cancel call can fail.
//! Failures are reported to the user and never roll back or pause a running
//! countdown; [`ErrorKind`] is the coarse classification handed to views.

use serde::Serialize;
use std::fmt;

pub const FALLBACK_MESSAGE: &str = "Something went wrong. Please try again.";
pub const NETWORK_MESSAGE: &str =
    "Unable to reach the server. Check your connection and try again.";
pub const AUTH_MESSAGE: &str = "You are not signed in. Please log in again.";

#[derive(Debug, thiserror::Error)]
pub enum AttendanceError {
    /// No bearer token is available; nothing was sent.
    #[error("Authentication token missing")]
    AuthenticationMissing,

    /// The backend refused the token (401/403).
    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    /// The backend answered with a non-success status.
    #[error("Backend rejected request ({status}): {message}")]
    BackendRejected { status: u16, message: String },

    /// The request never completed (connect failure, timeout).
    #[error("Network unavailable: {0}")]
    NetworkUnavailable(String),

    /// A success status whose body could not be decoded.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Coarse error classes exposed to presentation code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Authentication,
    Rejected,
    Network,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ErrorKind::Authentication => "authentication",
            ErrorKind::Rejected => "rejected",
            ErrorKind::Network => "network",
        })
    }
}

impl AttendanceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AttendanceError::AuthenticationMissing | AttendanceError::Unauthorized { .. } => {
                ErrorKind::Authentication
            }
            AttendanceError::BackendRejected { .. } | AttendanceError::InvalidResponse(_) => {
                ErrorKind::Rejected
            }
            AttendanceError::NetworkUnavailable(_) => ErrorKind::Network,
        }
    }

    /// Text shown to the lecturer for this failure.
    pub fn user_message(&self) -> String {
        match self {
            AttendanceError::AuthenticationMissing => AUTH_MESSAGE.to_string(),
            AttendanceError::Unauthorized { message }
            | AttendanceError::BackendRejected { message, .. } => message.clone(),
            AttendanceError::NetworkUnavailable(_) => NETWORK_MESSAGE.to_string(),
            AttendanceError::InvalidResponse(_) => FALLBACK_MESSAGE.to_string(),
        }
    }
}

impl From<reqwest::Error> for AttendanceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            AttendanceError::InvalidResponse(err.to_string())
        } else {
            AttendanceError::NetworkUnavailable(err.to_string())
        }
    }
}

/// Controller operation a failure or success belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Start,
    Extend,
    Cancel,
}

impl Operation {
    /// Notification title for a failure of this operation.
    pub fn failure_title(self, kind: ErrorKind) -> &'static str {
        if kind == ErrorKind::Authentication {
            return "Authentication Error";
        }
        match self {
            Operation::Start => "Start Failed",
            Operation::Extend => "Extension Failed",
            Operation::Cancel => "Cancellation Failed",
        }
    }

    pub fn success_title(self) -> &'static str {
        match self {
            Operation::Start => "Attendance Started",
            Operation::Extend => "Session Extended",
            Operation::Cancel => "Session Cancelled",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operation::Start => "start",
            Operation::Extend => "extend",
            Operation::Cancel => "cancel",
        })
    }
}
