//! Lecturer-side attendance session tracking.
//!
//! [`AttendanceSessionController`] starts, counts down, extends and cancels one
//! attendance session against an [`AttendanceBackend`], reports outcomes through
//! a [`NotificationSurface`], and publishes [`SessionSignal`]s for whatever view
//! renders the countdown.

pub mod backend;
pub mod controller;
pub mod countdown;
pub mod error;
pub mod model;
pub mod notify;
pub mod signal;
pub mod token;

pub use backend::{AttendanceBackend, HttpAttendanceBackend};
pub use controller::AttendanceSessionController;
pub use countdown::{CountdownTiming, SessionPhase};
pub use error::{AttendanceError, ErrorKind, Operation};
pub use model::{AttendanceSession, ClassId, SessionExpiry, SessionId};
pub use notify::{
    Notification, NotificationLevel, NotificationSurface, RecordingNotifier, TracingNotifier,
};
pub use signal::{SessionSignal, SignalBus};
pub use token::{MemoryTokenStore, TokenStore};
