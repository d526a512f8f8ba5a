//! Error types for tracker-api
//!
//! Every error renders as `{"detail": "..."}` with the matching HTTP
//! status. Uniqueness violations surface as 400s, not 409s; Conflict is
//! deliberately not modeled separately.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("{0}")]
    NotFound(String),

    /// Invalid request (400): bounds violation, bad enum value, malformed
    /// filter value, uniqueness violation, dangling reference
    #[error("{0}")]
    BadRequest(String),

    /// Database error (500)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Internal server error (500)
    #[error("{0}")]
    Internal(String),
}

impl From<tracker_common::Error> for ApiError {
    fn from(err: tracker_common::Error) -> Self {
        match err {
            tracker_common::Error::NotFound(msg) => ApiError::NotFound(msg),
            tracker_common::Error::InvalidInput(msg) => ApiError::BadRequest(msg),
            tracker_common::Error::Database(e) => ApiError::Database(e),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl ApiError {
    /// Classify a failed insert/update.
    ///
    /// Uniqueness and foreign-key violations are caller errors (400);
    /// anything else propagates as a store failure.
    pub fn from_write(err: sqlx::Error, unique_msg: &str) -> Self {
        if let sqlx::Error::Database(db) = &err {
            if db.is_unique_violation() {
                return ApiError::BadRequest(unique_msg.to_string());
            }
            if db.is_foreign_key_violation() {
                return ApiError::BadRequest("referenced record does not exist".to_string());
            }
        }
        ApiError::Database(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Database(err) => {
                tracing::error!("database error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "database error".to_string(),
                )
            }
            ApiError::Internal(msg) => {
                tracing::error!("internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        let body = Json(json!({ "detail": detail }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
