//! HTTP endpoints for the locbook service.
//!
//! Tracking clients post their messages to any path. Every POST is answered
//! with `200` and an empty body, whether or not the message was usable, so
//! clients never queue and retry a payload that will never decode. Decode
//! failures only show up in the log.
//!
//! - `GET /api/health` - Liveness check
//! - `POST <any path>` - Ingest one message
//!
//! Any other method on an ingest path gets `405 Method Not Allowed`.
//!
//! # Example
//!
//! ```ignore
//! use locbook_service::api;
//!
//! let app = api::router().with_state(state);
//! ```

use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::{Method, StatusCode},
    routing::get,
};
use serde::Serialize;
use time::OffsetDateTime;
use tracing::{debug, warn};

use crate::ingest::{self, Outcome};
use crate::state::AppState;

/// Create the API router.
///
/// Request bodies are not size-limited: a body too large to be a message is
/// read, fails to decode and is still acknowledged with `200`.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/health", get(health).post(ingest_message))
        .fallback(ingest_any)
        .layer(DefaultBodyLimit::disable())
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

/// Health check endpoint.
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: OffsetDateTime::now_utc(),
    })
}

/// Catch-all route: POST ingests, everything else is refused.
async fn ingest_any(state: State<Arc<AppState>>, method: Method, body: Bytes) -> StatusCode {
    if method != Method::POST {
        return StatusCode::METHOD_NOT_ALLOWED;
    }
    ingest_message(state, body).await
}

async fn ingest_message(State(state): State<Arc<AppState>>, body: Bytes) -> StatusCode {
    match ingest::handle(&state, &body).await {
        Ok(Outcome::Recorded { device, .. }) => debug!("Recorded location from {}", device),
        Ok(Outcome::Ignored) => {}
        Err(e) => warn!("Dropped message ({} bytes): {}", body.len(), e),
    }
    StatusCode::OK
}
