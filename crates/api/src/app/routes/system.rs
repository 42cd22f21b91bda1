//! Health endpoints for load balancers and Kubernetes probes.

use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde_json::json;

pub fn router() -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/health/live", get(live))
        .route("/health/ready", get(ready))
}

pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok", "timestamp": Utc::now() }))
}

pub async fn live() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// Readiness mirrors liveness: the pool connects lazily, so the process is
/// ready as soon as it can answer.
pub async fn ready() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}
