//! tracker-api library - HTTP service for the Target Tracker
//!
//! All endpoints are open-access by contract; there is no authentication
//! layer. The shared SQLite pool is the only cross-request state.

use axum::Router;
use sqlx::SqlitePool;
use tower::Layer;
use tower_http::cors::CorsLayer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};
use tower_http::trace::TraceLayer;

pub mod api;
pub mod error;
pub mod pagination;
pub mod query;
pub mod scoring;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
}

impl AppState {
    /// Create new application state
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::health_routes())
        .merge(api::target_routes())
        .merge(api::source_routes())
        .merge(api::indicator_routes())
        .merge(api::association_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Build the full application service.
///
/// The external contract uses trailing-slash URLs (`/targets/`,
/// `/targets/{id}/score/`); trimming the trailing slash before routing
/// makes both spellings hit the same handler.
pub fn build_app(state: AppState) -> NormalizePath<Router> {
    NormalizePathLayer::trim_trailing_slash().layer(build_router(state))
}
