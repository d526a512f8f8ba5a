//! Target CRUD endpoints plus the score and promote actions

use std::collections::HashMap;
use std::str::FromStr;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use uuid::Uuid;

use tracker_common::db::models::Target;
use tracker_common::{validate, TargetStatus};

use crate::error::{ApiError, ApiResult};
use crate::pagination::Page;
use crate::query::{self, FilterField, FilterKind, ListSpec};
use crate::{scoring, AppState};

static LIST: ListSpec = ListSpec {
    select: "SELECT * FROM targets",
    count: "SELECT COUNT(*) FROM targets",
    filters: &[
        // Status filtering is case-insensitive; promotion validation is not
        FilterField {
            param: "status",
            column: "status",
            kind: FilterKind::ExactCi,
        },
        FilterField {
            param: "priority_min",
            column: "priority",
            kind: FilterKind::IntMin,
        },
        FilterField {
            param: "priority_max",
            column: "priority",
            kind: FilterKind::IntMax,
        },
        FilterField {
            param: "confidence_min",
            column: "confidence",
            kind: FilterKind::FloatMin,
        },
        FilterField {
            param: "confidence_max",
            column: "confidence",
            kind: FilterKind::FloatMax,
        },
        FilterField {
            param: "created_at_min",
            column: "created_at",
            kind: FilterKind::DateMin,
        },
        FilterField {
            param: "created_at_max",
            column: "created_at",
            kind: FilterKind::DateMax,
        },
    ],
    search_columns: &["name", "description", "tags"],
    ordering_fields: &[
        ("priority", "priority"),
        ("confidence", "confidence"),
        ("updated_at", "updated_at"),
        ("created_at", "created_at"),
    ],
    default_order: "updated_at DESC, priority DESC, confidence DESC",
};

pub fn target_routes() -> Router<AppState> {
    Router::new()
        .route("/targets", get(list_targets).post(create_target))
        .route(
            "/targets/:id",
            get(get_target)
                .patch(update_target)
                .put(update_target)
                .delete(delete_target),
        )
        .route("/targets/:id/score", get(target_score))
        .route("/targets/:id/promote", post(promote_target))
}

async fn fetch_target(db: &SqlitePool, id: &str) -> ApiResult<Target> {
    sqlx::query_as::<_, Target>("SELECT * FROM targets WHERE id = ?")
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("target {} not found", id)))
}

/// GET /targets/
async fn list_targets(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Json<Page<Target>>> {
    let page = query::fetch_page::<Target>(&state.db, &LIST, &params).await?;
    Ok(Json(page))
}

#[derive(Debug, Deserialize)]
struct CreateTarget {
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    status: TargetStatus,
    #[serde(default)]
    priority: u32,
    #[serde(default)]
    tags: String,
    #[serde(default)]
    confidence: f64,
}

/// POST /targets/
async fn create_target(
    State(state): State<AppState>,
    Json(body): Json<CreateTarget>,
) -> ApiResult<(StatusCode, Json<Target>)> {
    validate::unit_interval("confidence", body.confidence)?;

    let id = Uuid::new_v4().to_string();
    let now = Utc::now();

    sqlx::query(
        "INSERT INTO targets (id, name, description, status, priority, tags, confidence, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(&body.name)
    .bind(&body.description)
    .bind(body.status)
    .bind(body.priority as i64)
    .bind(&body.tags)
    .bind(body.confidence)
    .bind(now)
    .bind(now)
    .execute(&state.db)
    .await
    .map_err(|e| ApiError::from_write(e, "target with this name already exists"))?;

    let target = fetch_target(&state.db, &id).await?;
    Ok((StatusCode::CREATED, Json(target)))
}

/// GET /targets/{id}/
async fn get_target(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Target>> {
    Ok(Json(fetch_target(&state.db, &id).await?))
}

#[derive(Debug, Default, Deserialize)]
struct UpdateTarget {
    name: Option<String>,
    description: Option<String>,
    status: Option<TargetStatus>,
    priority: Option<u32>,
    tags: Option<String>,
    confidence: Option<f64>,
}

/// PATCH|PUT /targets/{id}/
///
/// Partial update: absent fields keep their current values. updated_at is
/// refreshed on every accepted write.
async fn update_target(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<UpdateTarget>,
) -> ApiResult<Json<Target>> {
    let current = fetch_target(&state.db, &id).await?;

    if let Some(confidence) = body.confidence {
        validate::unit_interval("confidence", confidence)?;
    }

    let name = body.name.unwrap_or(current.name);
    let description = body.description.unwrap_or(current.description);
    let status = body.status.unwrap_or(current.status);
    let priority = body.priority.map(i64::from).unwrap_or(current.priority);
    let tags = body.tags.unwrap_or(current.tags);
    let confidence = body.confidence.unwrap_or(current.confidence);

    sqlx::query(
        "UPDATE targets SET name = ?, description = ?, status = ?, priority = ?, tags = ?, confidence = ?, updated_at = ? \
         WHERE id = ?",
    )
    .bind(&name)
    .bind(&description)
    .bind(status)
    .bind(priority)
    .bind(&tags)
    .bind(confidence)
    .bind(Utc::now())
    .bind(&id)
    .execute(&state.db)
    .await
    .map_err(|e| ApiError::from_write(e, "target with this name already exists"))?;

    Ok(Json(fetch_target(&state.db, &id).await?))
}

/// DELETE /targets/{id}/
///
/// Cascades to the target's associations.
async fn delete_target(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let result = sqlx::query("DELETE FROM targets WHERE id = ?")
        .bind(&id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound(format!("target {} not found", id)));
    }

    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Serialize)]
struct ScoreResponse {
    target: String,
    score: f64,
}

/// GET /targets/{id}/score/
///
/// Weighted score over the target's associations, computed in the store on
/// every call.
async fn target_score(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ScoreResponse>> {
    let score = scoring::compute_score(&state.db, &id).await?;
    Ok(Json(ScoreResponse { target: id, score }))
}

#[derive(Debug, Deserialize)]
struct PromoteRequest {
    #[serde(default)]
    status: Option<String>,
}

/// POST /targets/{id}/promote/
///
/// Sets the target status to any of the four valid values; no transition
/// graph beyond enum membership. Idempotent: promoting to the current
/// status succeeds and still refreshes updated_at.
async fn promote_target(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<PromoteRequest>,
) -> ApiResult<Json<Target>> {
    // 404 before status validation
    fetch_target(&state.db, &id).await?;

    let requested = body.status.unwrap_or_default();
    let status = TargetStatus::from_str(&requested)?;

    sqlx::query("UPDATE targets SET status = ?, updated_at = ? WHERE id = ?")
        .bind(status)
        .bind(Utc::now())
        .bind(&id)
        .execute(&state.db)
        .await?;

    Ok(Json(fetch_target(&state.db, &id).await?))
}
