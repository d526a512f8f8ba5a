//! Indicator CRUD endpoints

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

use tracker_common::db::models::Indicator;
use tracker_common::{validate, IndicatorType};

use crate::error::{ApiError, ApiResult};
use crate::pagination::Page;
use crate::query::{self, FilterField, FilterKind, ListSpec};
use crate::AppState;

static LIST: ListSpec = ListSpec {
    select: "SELECT * FROM indicators",
    count: "SELECT COUNT(*) FROM indicators",
    filters: &[
        FilterField {
            param: "type",
            column: "type",
            kind: FilterKind::ExactCi,
        },
        FilterField {
            param: "source",
            column: "source_id",
            kind: FilterKind::Exact,
        },
        FilterField {
            param: "score_min",
            column: "score",
            kind: FilterKind::FloatMin,
        },
        FilterField {
            param: "score_max",
            column: "score",
            kind: FilterKind::FloatMax,
        },
    ],
    search_columns: &["value"],
    ordering_fields: &[
        ("score", "score"),
        ("created_at", "created_at"),
        ("updated_at", "updated_at"),
    ],
    default_order: "created_at DESC, score DESC",
};

pub fn indicator_routes() -> Router<AppState> {
    Router::new()
        .route("/indicators", get(list_indicators).post(create_indicator))
        .route(
            "/indicators/:id",
            get(get_indicator)
                .patch(update_indicator)
                .put(update_indicator)
                .delete(delete_indicator),
        )
}

async fn fetch_indicator(db: &SqlitePool, id: &str) -> ApiResult<Indicator> {
    sqlx::query_as::<_, Indicator>("SELECT * FROM indicators WHERE id = ?")
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("indicator {} not found", id)))
}

/// GET /indicators/
async fn list_indicators(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Json<Page<Indicator>>> {
    let page = query::fetch_page::<Indicator>(&state.db, &LIST, &params).await?;
    Ok(Json(page))
}

#[derive(Debug, Deserialize)]
struct CreateIndicator {
    #[serde(rename = "type")]
    indicator_type: IndicatorType,
    value: String,
    #[serde(default)]
    score: f64,
    #[serde(rename = "source")]
    source_id: String,
}

/// POST /indicators/
async fn create_indicator(
    State(state): State<AppState>,
    Json(body): Json<CreateIndicator>,
) -> ApiResult<(StatusCode, Json<Indicator>)> {
    validate::unit_interval("score", body.score)?;

    let id = Uuid::new_v4().to_string();
    let now = Utc::now();

    sqlx::query(
        "INSERT INTO indicators (id, type, value, score, source_id, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(body.indicator_type)
    .bind(&body.value)
    .bind(body.score)
    .bind(&body.source_id)
    .bind(now)
    .bind(now)
    .execute(&state.db)
    .await
    .map_err(|e| ApiError::from_write(e, "indicator already exists"))?;

    let indicator = fetch_indicator(&state.db, &id).await?;
    Ok((StatusCode::CREATED, Json(indicator)))
}

/// GET /indicators/{id}/
async fn get_indicator(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Indicator>> {
    Ok(Json(fetch_indicator(&state.db, &id).await?))
}

#[derive(Debug, Default, Deserialize)]
struct UpdateIndicator {
    #[serde(rename = "type")]
    indicator_type: Option<IndicatorType>,
    value: Option<String>,
    score: Option<f64>,
    #[serde(rename = "source")]
    source_id: Option<String>,
}

/// PATCH|PUT /indicators/{id}/
async fn update_indicator(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<UpdateIndicator>,
) -> ApiResult<Json<Indicator>> {
    let current = fetch_indicator(&state.db, &id).await?;

    if let Some(score) = body.score {
        validate::unit_interval("score", score)?;
    }

    let indicator_type = body.indicator_type.unwrap_or(current.indicator_type);
    let value = body.value.unwrap_or(current.value);
    let score = body.score.unwrap_or(current.score);
    let source_id = body.source_id.unwrap_or(current.source_id);

    sqlx::query(
        "UPDATE indicators SET type = ?, value = ?, score = ?, source_id = ?, updated_at = ? \
         WHERE id = ?",
    )
    .bind(indicator_type)
    .bind(&value)
    .bind(score)
    .bind(&source_id)
    .bind(Utc::now())
    .bind(&id)
    .execute(&state.db)
    .await
    .map_err(|e| ApiError::from_write(e, "indicator already exists"))?;

    Ok(Json(fetch_indicator(&state.db, &id).await?))
}

/// DELETE /indicators/{id}/
///
/// Cascades to the indicator's associations.
async fn delete_indicator(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let result = sqlx::query("DELETE FROM indicators WHERE id = ?")
        .bind(&id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound(format!("indicator {} not found", id)));
    }

    Ok(StatusCode::NO_CONTENT)
}
