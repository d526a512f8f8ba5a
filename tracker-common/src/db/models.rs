//! Database models
//!
//! Serialized field names follow the external API contract: foreign keys
//! appear as `source`, `target`, `indicator`; `id`, `created_at` and
//! `updated_at` are server-assigned and read-only.

use crate::types::{IndicatorType, SourceType, TargetStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Target {
    pub id: String,
    pub name: String,
    pub description: String,
    pub status: TargetStatus,
    pub priority: i64,
    pub tags: String,
    pub confidence: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Source {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub source_type: SourceType,
    pub url: String,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Indicator {
    pub id: String,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub indicator_type: IndicatorType,
    pub value: String,
    pub score: f64,
    #[serde(rename = "source")]
    pub source_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Association row joined with its target, indicator and source.
///
/// The `target_name`/`indicator_type`/`indicator_value`/`source_name`
/// fields are denormalized for client convenience and never writable.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Association {
    pub id: String,
    #[serde(rename = "target")]
    pub target_id: String,
    #[serde(rename = "indicator")]
    pub indicator_id: String,
    pub rationale: String,
    pub analyst_notes: String,
    pub weight: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub target_name: String,
    pub indicator_type: IndicatorType,
    pub indicator_value: String,
    pub source_name: String,
}
