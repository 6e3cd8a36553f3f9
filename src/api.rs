//! HTTP API: webhook ingestion, recording listing and playback.

use crate::ingest::{parse_payload, IngestPipeline};
use crate::repository::RecordingRepository;
use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, error, info, warn};

/// Largest webhook body accepted (base64 audio inflates by a third).
pub const MAX_BODY_BYTES: usize = 64 * 1024 * 1024;

/// Shared application state.
pub struct AppState {
    pipeline: IngestPipeline,
    repository: Arc<dyn RecordingRepository>,
}

impl AppState {
    pub fn new(pipeline: IngestPipeline) -> Self {
        let repository = pipeline.repository();
        Self {
            pipeline,
            repository,
        }
    }
}

/// Build the application router.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    Router::new()
        .route("/", get(home))
        .route("/health", get(health))
        .route("/api/webhook", post(webhook))
        .route("/api/recordings", get(list_recordings))
        .route("/api/play/", get(play_missing_id))
        .route("/api/play/{id}", get(play))
        .layer(cors)
        .with_state(state)
}

#[derive(Serialize)]
struct WebhookResponse {
    status: &'static str,
    message: &'static str,
    id: String,
}

// === Handlers ===

async fn home() -> &'static str {
    "Phone Recording Service"
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn webhook(State(state): State<Arc<AppState>>, body: Body) -> Response {
    let raw = match axum::body::to_bytes(body, MAX_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(e) => {
            error!("Error reading request body: {}", e);
            return (StatusCode::INTERNAL_SERVER_ERROR, "Error reading request body").into_response();
        }
    };
    debug!("Received webhook body ({} bytes)", raw.len());

    let payload = match parse_payload(&raw) {
        Ok(payload) => payload,
        Err(e) => {
            warn!("Error parsing JSON: {}", e);
            return (StatusCode::BAD_REQUEST, "Error parsing JSON").into_response();
        }
    };

    let outcome = state.pipeline.process(payload).await;

    (
        StatusCode::CREATED,
        Json(WebhookResponse {
            status: "success",
            message: "Recording data received",
            id: outcome.id,
        }),
    )
        .into_response()
}

async fn list_recordings(State(state): State<Arc<AppState>>) -> Response {
    match state.repository.list().await {
        Ok(recordings) => Json(recordings).into_response(),
        Err(e) => {
            error!("Database query error: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Database query error").into_response()
        }
    }
}

async fn play_missing_id() -> Response {
    (StatusCode::BAD_REQUEST, "Recording ID required").into_response()
}

async fn play(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    if id.trim().is_empty() {
        return play_missing_id().await;
    }

    let file_path = match state.repository.file_path(&id).await {
        Ok(Some(path)) => path,
        Ok(None) => {
            info!("Recording not found: {}", id);
            return (StatusCode::NOT_FOUND, "Recording not found").into_response();
        }
        Err(e) => {
            error!("Error looking up recording {}: {}", id, e);
            return (StatusCode::INTERNAL_SERVER_ERROR, "Database query error").into_response();
        }
    };

    let bytes = match tokio::fs::read(&file_path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!("MP3 file not found at path: {}", file_path);
            return (StatusCode::NOT_FOUND, "MP3 file not found").into_response();
        }
        Err(e) => {
            error!("Error reading {}: {}", file_path, e);
            return (StatusCode::INTERNAL_SERVER_ERROR, "Error reading recording").into_response();
        }
    };

    audio_response(bytes, headers.get(header::RANGE))
}

/// Byte span selected by a `Range` request header.
#[derive(Debug, PartialEq)]
enum ByteRange {
    Full,
    Partial { start: u64, end: u64 },
    Unsatisfiable,
}

/// Interpret a single `bytes=` range against a body of `total` bytes.
///
/// Headers that cannot be parsed, or that ask for several ranges, are ignored
/// and the whole body is served.
fn byte_range(value: Option<&HeaderValue>, total: u64) -> ByteRange {
    let Some(spec) = value
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().strip_prefix("bytes="))
    else {
        return ByteRange::Full;
    };
    if spec.contains(',') {
        return ByteRange::Full;
    }
    let Some((first, last)) = spec.split_once('-') else {
        return ByteRange::Full;
    };
    let (first, last) = (first.trim(), last.trim());

    if first.is_empty() {
        // Suffix range: the final `last` bytes.
        return match last.parse::<u64>() {
            Ok(0) => ByteRange::Unsatisfiable,
            Ok(_) if total == 0 => ByteRange::Unsatisfiable,
            Ok(n) => ByteRange::Partial {
                start: total.saturating_sub(n),
                end: total - 1,
            },
            Err(_) => ByteRange::Full,
        };
    }

    let Ok(start) = first.parse::<u64>() else {
        return ByteRange::Full;
    };
    if start >= total {
        return ByteRange::Unsatisfiable;
    }
    let end = if last.is_empty() {
        total - 1
    } else {
        match last.parse::<u64>() {
            Ok(end) if end >= start => end.min(total - 1),
            _ => return ByteRange::Full,
        }
    };

    ByteRange::Partial { start, end }
}

fn audio_response(bytes: Vec<u8>, range: Option<&HeaderValue>) -> Response {
    let total = bytes.len() as u64;

    let (status, body, content_range) = match byte_range(range, total) {
        ByteRange::Full => (StatusCode::OK, bytes, None),
        ByteRange::Partial { start, end } => {
            debug!("Serving bytes {}-{} of {}", start, end, total);
            let slice = bytes[start as usize..=end as usize].to_vec();
            (
                StatusCode::PARTIAL_CONTENT,
                slice,
                Some(format!("bytes {}-{}/{}", start, end, total)),
            )
        }
        ByteRange::Unsatisfiable => (
            StatusCode::RANGE_NOT_SATISFIABLE,
            Vec::new(),
            Some(format!("bytes */{}", total)),
        ),
    };

    let mut response = Response::new(Body::from(body));
    *response.status_mut() = status;
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("audio/mpeg"));
    headers.insert(header::CONTENT_DISPOSITION, HeaderValue::from_static("inline"));
    headers.insert(header::ACCEPT_RANGES, HeaderValue::from_static("bytes"));
    if let Some(value) = content_range.and_then(|v| HeaderValue::from_str(&v).ok()) {
        headers.insert(header::CONTENT_RANGE, value);
    }
    response
}
