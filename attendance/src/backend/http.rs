//! # REST backend
//!
//! [`HttpAttendanceBackend`] talks to the attendance API with `reqwest`. Every
//! request carries `Authorization: Bearer <token>` from the [`TokenStore`]; when
//! the store is empty the call fails with
//! [`AttendanceError::AuthenticationMissing`] before anything is sent.
//!
//! ## Endpoints (relative to the base URL)
//!
//! - `POST /attendance/classes/{class_id}/sessions/` → `201`
//! - `POST /attendance/sessions/{session_id}/extend/` → `200`
//! - `POST /attendance/sessions/{session_id}/cancel/` → `200`

use super::AttendanceBackend;
use crate::error::{AUTH_MESSAGE, AttendanceError, FALLBACK_MESSAGE};
use crate::model::{
    AttendanceSession, ClassId, CreatedSessionBody, ExpiryBody, SessionExpiry, SessionId,
};
use crate::token::TokenStore;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use util::config::AppConfig;

pub struct HttpAttendanceBackend {
    client: Client,
    base_url: String,
    tokens: Arc<dyn TokenStore>,
}

impl HttpAttendanceBackend {
    pub fn new(
        base_url: impl Into<String>,
        timeout_secs: u64,
        tokens: Arc<dyn TokenStore>,
    ) -> Result<Self, reqwest::Error> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self {
            client: util::http::build_client(timeout_secs)?,
            base_url,
            tokens,
        })
    }

    pub fn from_config(
        cfg: &AppConfig,
        tokens: Arc<dyn TokenStore>,
    ) -> Result<Self, reqwest::Error> {
        Self::new(cfg.api_base_url.clone(), cfg.api_timeout_secs, tokens)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post<T: DeserializeOwned>(&self, path: &str) -> Result<T, AttendanceError> {
        let token = self
            .tokens
            .access_token()
            .await
            .ok_or(AttendanceError::AuthenticationMissing)?;

        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%url, "POST");

        let resp = self
            .client
            .post(&url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| AttendanceError::NetworkUnavailable(e.to_string()))?;

        let status = resp.status();
        if status.is_success() {
            let text = resp.text().await?;
            return serde_json::from_str::<T>(&text).map_err(|e| {
                AttendanceError::InvalidResponse(format!(
                    "error decoding response body: {e}. Full response: {text}"
                ))
            });
        }

        let body = resp.text().await.unwrap_or_default();
        let message = extract_error_message(&body);
        tracing::debug!(%url, %status, body = %body, "request rejected");

        Err(match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AttendanceError::Unauthorized {
                message: message.unwrap_or_else(|| AUTH_MESSAGE.to_string()),
            },
            _ => AttendanceError::BackendRejected {
                status: status.as_u16(),
                message: message.unwrap_or_else(|| FALLBACK_MESSAGE.to_string()),
            },
        })
    }
}

#[async_trait]
impl AttendanceBackend for HttpAttendanceBackend {
    async fn create_session(
        &self,
        class_id: &ClassId,
    ) -> Result<AttendanceSession, AttendanceError> {
        let body: CreatedSessionBody = self
            .post(&format!("/attendance/classes/{class_id}/sessions/"))
            .await?;
        Ok(AttendanceSession::from_created(class_id.clone(), body))
    }

    async fn extend_session(
        &self,
        session_id: &SessionId,
    ) -> Result<SessionExpiry, AttendanceError> {
        let body: ExpiryBody = self
            .post(&format!("/attendance/sessions/{session_id}/extend/"))
            .await?;
        Ok(body.into())
    }

    async fn cancel_session(
        &self,
        session_id: &SessionId,
    ) -> Result<SessionExpiry, AttendanceError> {
        let body: ExpiryBody = self
            .post(&format!("/attendance/sessions/{session_id}/cancel/"))
            .await?;
        Ok(body.into())
    }
}

/// Pulls a human-readable message out of an error payload.
///
/// Looks at `message`, `detail` and `error` in that order, then the first
/// entry of `non_field_errors`. Blank strings are skipped.
pub fn extract_error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;

    for key in ["message", "detail", "error"] {
        if let Some(text) = value.get(key).and_then(Value::as_str) {
            let text = text.trim();
            if !text.is_empty() {
                return Some(text.to_string());
            }
        }
    }

    value
        .get("non_field_errors")
        .and_then(Value::as_array)
        .and_then(|errs| errs.iter().find_map(Value::as_str))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_field_wins() {
        let body = r#"{"success":false,"message":"Class not found","detail":"x"}"#;
        assert_eq!(extract_error_message(body).as_deref(), Some("Class not found"));
    }

    #[test]
    fn falls_through_detail_and_error() {
        assert_eq!(
            extract_error_message(r#"{"detail":"Extension window closed"}"#).as_deref(),
            Some("Extension window closed")
        );
        assert_eq!(
            extract_error_message(r#"{"message":"  ","error":"Session inactive"}"#).as_deref(),
            Some("Session inactive")
        );
    }

    #[test]
    fn non_field_errors_are_used_last() {
        let body = r#"{"non_field_errors":["Only one active session per class"]}"#;
        assert_eq!(
            extract_error_message(body).as_deref(),
            Some("Only one active session per class")
        );
    }

    #[test]
    fn non_json_bodies_have_no_message() {
        assert!(extract_error_message("<html>502 Bad Gateway</html>").is_none());
        assert!(extract_error_message("").is_none());
        assert!(extract_error_message(r#"{"status":"bad"}"#).is_none());
    }
}
