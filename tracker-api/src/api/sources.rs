//! Source CRUD endpoints

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

use tracker_common::db::models::Source;
use tracker_common::SourceType;

use crate::error::{ApiError, ApiResult};
use crate::pagination::Page;
use crate::query::{self, FilterField, FilterKind, ListSpec};
use crate::AppState;

static LIST: ListSpec = ListSpec {
    select: "SELECT * FROM sources",
    count: "SELECT COUNT(*) FROM sources",
    filters: &[FilterField {
        param: "type",
        column: "type",
        kind: FilterKind::Exact,
    }],
    search_columns: &["name", "url"],
    ordering_fields: &[
        ("name", "name"),
        ("created_at", "created_at"),
        ("updated_at", "updated_at"),
    ],
    default_order: "name ASC",
};

pub fn source_routes() -> Router<AppState> {
    Router::new()
        .route("/sources", get(list_sources).post(create_source))
        .route(
            "/sources/:id",
            get(get_source)
                .patch(update_source)
                .put(update_source)
                .delete(delete_source),
        )
}

async fn fetch_source(db: &SqlitePool, id: &str) -> ApiResult<Source> {
    sqlx::query_as::<_, Source>("SELECT * FROM sources WHERE id = ?")
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("source {} not found", id)))
}

/// GET /sources/
async fn list_sources(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Json<Page<Source>>> {
    let page = query::fetch_page::<Source>(&state.db, &LIST, &params).await?;
    Ok(Json(page))
}

fn default_metadata() -> serde_json::Value {
    serde_json::json!({})
}

#[derive(Debug, Deserialize)]
struct CreateSource {
    name: String,
    #[serde(rename = "type")]
    source_type: SourceType,
    #[serde(default)]
    url: String,
    #[serde(default = "default_metadata")]
    metadata: serde_json::Value,
}

/// POST /sources/
async fn create_source(
    State(state): State<AppState>,
    Json(body): Json<CreateSource>,
) -> ApiResult<(StatusCode, Json<Source>)> {
    let id = Uuid::new_v4().to_string();
    let now = Utc::now();

    sqlx::query(
        "INSERT INTO sources (id, name, type, url, metadata, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(&body.name)
    .bind(body.source_type)
    .bind(&body.url)
    .bind(body.metadata.clone())
    .bind(now)
    .bind(now)
    .execute(&state.db)
    .await
    .map_err(|e| ApiError::from_write(e, "source with this name already exists"))?;

    let source = fetch_source(&state.db, &id).await?;
    Ok((StatusCode::CREATED, Json(source)))
}

/// GET /sources/{id}/
async fn get_source(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Source>> {
    Ok(Json(fetch_source(&state.db, &id).await?))
}

#[derive(Debug, Default, Deserialize)]
struct UpdateSource {
    name: Option<String>,
    #[serde(rename = "type")]
    source_type: Option<SourceType>,
    url: Option<String>,
    metadata: Option<serde_json::Value>,
}

/// PATCH|PUT /sources/{id}/
async fn update_source(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<UpdateSource>,
) -> ApiResult<Json<Source>> {
    let current = fetch_source(&state.db, &id).await?;

    let name = body.name.unwrap_or(current.name);
    let source_type = body.source_type.unwrap_or(current.source_type);
    let url = body.url.unwrap_or(current.url);
    let metadata = body.metadata.unwrap_or(current.metadata);

    sqlx::query(
        "UPDATE sources SET name = ?, type = ?, url = ?, metadata = ?, updated_at = ? WHERE id = ?",
    )
    .bind(&name)
    .bind(source_type)
    .bind(&url)
    .bind(metadata.clone())
    .bind(Utc::now())
    .bind(&id)
    .execute(&state.db)
    .await
    .map_err(|e| ApiError::from_write(e, "source with this name already exists"))?;

    Ok(Json(fetch_source(&state.db, &id).await?))
}

/// DELETE /sources/{id}/
///
/// Cascades to the source's indicators and their associations.
async fn delete_source(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let result = sqlx::query("DELETE FROM sources WHERE id = ?")
        .bind(&id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound(format!("source {} not found", id)));
    }

    Ok(StatusCode::NO_CONTENT)
}
