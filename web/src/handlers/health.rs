//! Liveness endpoint.

use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Body of `GET /api/health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `"ok"` while the process serves requests
    pub status: String,
    /// Server time the response was produced
    pub timestamp: DateTime<Utc>,
}

/// Simple health check endpoint (for basic liveness).
///
/// Does not touch the database; a process that can answer is alive.
///
/// # Endpoint
///
/// ```text
/// GET /api/health
/// ```
///
/// # Response
///
/// ```json
/// { "status": "ok", "timestamp": "2026-03-02T09:00:00Z" }
/// ```
#[allow(clippy::unused_async)] // Axum handler signature requires async
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: Utc::now(),
    })
}
