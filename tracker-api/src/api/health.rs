//! Liveness probe

use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::AppState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub message: String,
}

/// GET /health/
///
/// Liveness probe; like every other endpoint it requires no authentication.
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        message: "Server is up!".to_string(),
    })
}

/// Build health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
