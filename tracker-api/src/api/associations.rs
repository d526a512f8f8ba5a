//! Association CRUD endpoints
//!
//! Associations are weighted target/indicator links. Every read joins
//! through to the target, indicator and source so responses carry the
//! denormalized display fields.

use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use sqlx::SqlitePool;
use uuid::Uuid;

use tracker_common::db::models::Association;
use tracker_common::validate;

use crate::error::{ApiError, ApiResult};
use crate::pagination::Page;
use crate::query::{self, FilterField, FilterKind, ListSpec};
use crate::AppState;

const SELECT: &str = "SELECT a.id, a.target_id, a.indicator_id, a.rationale, a.analyst_notes, \
     a.weight, a.created_at, a.updated_at, \
     t.name AS target_name, i.type AS indicator_type, i.value AS indicator_value, \
     s.name AS source_name \
     FROM associations a \
     JOIN targets t ON t.id = a.target_id \
     JOIN indicators i ON i.id = a.indicator_id \
     JOIN sources s ON s.id = i.source_id";

static LIST: ListSpec = ListSpec {
    select: SELECT,
    count: "SELECT COUNT(*) FROM associations a",
    filters: &[
        FilterField {
            param: "target",
            column: "a.target_id",
            kind: FilterKind::Exact,
        },
        FilterField {
            param: "indicator",
            column: "a.indicator_id",
            kind: FilterKind::Exact,
        },
        FilterField {
            param: "weight_min",
            column: "a.weight",
            kind: FilterKind::FloatMin,
        },
        FilterField {
            param: "weight_max",
            column: "a.weight",
            kind: FilterKind::FloatMax,
        },
    ],
    search_columns: &["a.rationale", "a.analyst_notes"],
    ordering_fields: &[
        ("weight", "a.weight"),
        ("created_at", "a.created_at"),
        ("updated_at", "a.updated_at"),
    ],
    default_order: "a.created_at DESC, a.weight DESC",
};

pub fn association_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/associations",
            get(list_associations).post(create_association),
        )
        .route(
            "/associations/:id",
            get(get_association)
                .patch(update_association)
                .put(update_association)
                .delete(delete_association),
        )
}

async fn fetch_association(db: &SqlitePool, id: &str) -> ApiResult<Association> {
    let sql = format!("{} WHERE a.id = ?", SELECT);
    sqlx::query_as::<_, Association>(&sql)
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("association {} not found", id)))
}

/// GET /associations/
async fn list_associations(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Json<Page<Association>>> {
    let page = query::fetch_page::<Association>(&state.db, &LIST, &params).await?;
    Ok(Json(page))
}

fn default_weight() -> f64 {
    0.5
}

#[derive(Debug, Deserialize)]
struct CreateAssociation {
    #[serde(rename = "target")]
    target_id: String,
    #[serde(rename = "indicator")]
    indicator_id: String,
    #[serde(default)]
    rationale: String,
    #[serde(default)]
    analyst_notes: String,
    #[serde(default = "default_weight")]
    weight: f64,
}

/// POST /associations/
///
/// At most one association may exist per (target, indicator) pair; a
/// second create for the same pair is a 400, not a 409.
async fn create_association(
    State(state): State<AppState>,
    Json(body): Json<CreateAssociation>,
) -> ApiResult<(StatusCode, Json<Association>)> {
    validate::unit_interval("weight", body.weight)?;

    let id = Uuid::new_v4().to_string();
    let now = Utc::now();

    sqlx::query(
        "INSERT INTO associations (id, target_id, indicator_id, rationale, analyst_notes, weight, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(&body.target_id)
    .bind(&body.indicator_id)
    .bind(&body.rationale)
    .bind(&body.analyst_notes)
    .bind(body.weight)
    .bind(now)
    .bind(now)
    .execute(&state.db)
    .await
    .map_err(|e| {
        ApiError::from_write(
            e,
            "association already exists for this target and indicator",
        )
    })?;

    let association = fetch_association(&state.db, &id).await?;
    Ok((StatusCode::CREATED, Json(association)))
}

/// GET /associations/{id}/
async fn get_association(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Association>> {
    Ok(Json(fetch_association(&state.db, &id).await?))
}

#[derive(Debug, Default, Deserialize)]
struct UpdateAssociation {
    #[serde(rename = "target")]
    target_id: Option<String>,
    #[serde(rename = "indicator")]
    indicator_id: Option<String>,
    rationale: Option<String>,
    analyst_notes: Option<String>,
    weight: Option<f64>,
}

/// PATCH|PUT /associations/{id}/
async fn update_association(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<UpdateAssociation>,
) -> ApiResult<Json<Association>> {
    let current = fetch_association(&state.db, &id).await?;

    if let Some(weight) = body.weight {
        validate::unit_interval("weight", weight)?;
    }

    let target_id = body.target_id.unwrap_or(current.target_id);
    let indicator_id = body.indicator_id.unwrap_or(current.indicator_id);
    let rationale = body.rationale.unwrap_or(current.rationale);
    let analyst_notes = body.analyst_notes.unwrap_or(current.analyst_notes);
    let weight = body.weight.unwrap_or(current.weight);

    sqlx::query(
        "UPDATE associations SET target_id = ?, indicator_id = ?, rationale = ?, analyst_notes = ?, weight = ?, updated_at = ? \
         WHERE id = ?",
    )
    .bind(&target_id)
    .bind(&indicator_id)
    .bind(&rationale)
    .bind(&analyst_notes)
    .bind(weight)
    .bind(Utc::now())
    .bind(&id)
    .execute(&state.db)
    .await
    .map_err(|e| {
        ApiError::from_write(
            e,
            "association already exists for this target and indicator",
        )
    })?;

    Ok(Json(fetch_association(&state.db, &id).await?))
}

/// DELETE /associations/{id}/
async fn delete_association(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let result = sqlx::query("DELETE FROM associations WHERE id = ?")
        .bind(&id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound(format!("association {} not found", id)));
    }

    Ok(StatusCode::NO_CONTENT)
}
