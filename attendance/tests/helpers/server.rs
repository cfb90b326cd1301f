use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    routing::post,
};
use serde_json::{Value, json};
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::net::TcpListener;

pub const GOOD_TOKEN: &str = "good-token";

/// Handle on a running mock attendance API.
#[derive(Clone)]
pub struct MockApi {
    pub addr: SocketAddr,
    hits: Arc<AtomicUsize>,
}

impl MockApi {
    pub fn base_url(&self) -> String {
        format!("http://{}/api/", self.addr)
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

type Reply = (StatusCode, Json<Value>);

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {GOOD_TOKEN}"))
}

fn unauthorized() -> Reply {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "detail": "Token expired" })),
    )
}

async fn create_session(
    State(hits): State<Arc<AtomicUsize>>,
    Path(class_id): Path<String>,
    headers: HeaderMap,
) -> Reply {
    hits.fetch_add(1, Ordering::SeqCst);
    if !authorized(&headers) {
        return unauthorized();
    }
    match class_id.as_str() {
        "missing" => (
            StatusCode::NOT_FOUND,
            Json(json!({ "success": false, "message": "Class not found" })),
        ),
        "garbled" => (StatusCode::CREATED, Json(json!({ "id": 1 }))),
        "broken" => (StatusCode::BAD_GATEWAY, Json(json!({}))),
        "brief" => (
            StatusCode::CREATED,
            Json(json!({
                "id": 78,
                "attendance_code": "B2RIEF",
                "created_at": "2025-09-01T08:00:00Z",
                "expires_at": "2025-09-01T08:00:02Z",
                "time_remaining": 2
            })),
        ),
        _ => (
            StatusCode::CREATED,
            Json(json!({
                "id": 77,
                "class_name": format!("Class {class_id}"),
                "attendance_code": "Q4T9ZK",
                "is_active": true,
                "created_at": "2025-09-01T08:00:00Z",
                "expires_at": "2025-09-01T08:00:12Z",
                "time_remaining": 12
            })),
        ),
    }
}

async fn extend_session(
    State(hits): State<Arc<AtomicUsize>>,
    Path(session_id): Path<String>,
    headers: HeaderMap,
) -> Reply {
    hits.fetch_add(1, Ordering::SeqCst);
    if !authorized(&headers) {
        return unauthorized();
    }
    if session_id == "closed" {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "non_field_errors": ["Extension only allowed near expiry"] })),
        );
    }
    (
        StatusCode::OK,
        Json(json!({ "expires_at": "2025-09-01T08:01:00Z", "time_remaining": 30 })),
    )
}

async fn cancel_session(
    State(hits): State<Arc<AtomicUsize>>,
    Path(_session_id): Path<String>,
    headers: HeaderMap,
) -> Reply {
    hits.fetch_add(1, Ordering::SeqCst);
    if !authorized(&headers) {
        return unauthorized();
    }
    (
        StatusCode::OK,
        Json(json!({ "expires_at": "2025-09-01T08:00:05Z", "time_remaining": -1 })),
    )
}

/// Spawns the mock API on a random local port.
pub async fn spawn_mock_api() -> MockApi {
    let hits = Arc::new(AtomicUsize::new(0));
    let app = Router::new()
        .route(
            "/api/attendance/classes/{class_id}/sessions/",
            post(create_session),
        )
        .route(
            "/api/attendance/sessions/{session_id}/extend/",
            post(extend_session),
        )
        .route(
            "/api/attendance/sessions/{session_id}/cancel/",
            post(cancel_session),
        )
        .with_state(hits.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockApi { addr, hits }
}
