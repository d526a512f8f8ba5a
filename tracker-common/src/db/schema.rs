//! Table definitions
//!
//! Idempotent schema creation; every statement is CREATE ... IF NOT EXISTS
//! so startup is safe against an existing database.

use crate::Result;
use sqlx::SqlitePool;

/// Create all tables and indexes if they do not already exist.
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    create_targets_table(pool).await?;
    create_sources_table(pool).await?;
    create_indicators_table(pool).await?;
    create_associations_table(pool).await?;
    Ok(())
}

async fn create_targets_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS targets (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            description TEXT NOT NULL DEFAULT '',
            status TEXT NOT NULL DEFAULT 'new',
            priority INTEGER NOT NULL DEFAULT 0,
            tags TEXT NOT NULL DEFAULT '',
            confidence REAL NOT NULL DEFAULT 0.0,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_targets_status_priority ON targets(status, priority)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_targets_confidence ON targets(confidence)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_targets_updated_at ON targets(updated_at)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_sources_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS sources (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            type TEXT NOT NULL,
            url TEXT NOT NULL DEFAULT '',
            metadata TEXT NOT NULL DEFAULT '{}',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_sources_type ON sources(type)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_indicators_table(pool: &SqlitePool) -> Result<()> {
    // Indicators are owned by their source: deleting the source deletes them
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS indicators (
            id TEXT PRIMARY KEY,
            type TEXT NOT NULL,
            value TEXT NOT NULL,
            score REAL NOT NULL DEFAULT 0.0,
            source_id TEXT NOT NULL REFERENCES sources(id) ON DELETE CASCADE,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_indicators_type ON indicators(type)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_indicators_score ON indicators(score)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_indicators_source ON indicators(source_id)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_associations_table(pool: &SqlitePool) -> Result<()> {
    // Join record owned jointly by target and indicator; at most one
    // association per (target, indicator) pair
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS associations (
            id TEXT PRIMARY KEY,
            target_id TEXT NOT NULL REFERENCES targets(id) ON DELETE CASCADE,
            indicator_id TEXT NOT NULL REFERENCES indicators(id) ON DELETE CASCADE,
            rationale TEXT NOT NULL DEFAULT '',
            analyst_notes TEXT NOT NULL DEFAULT '',
            weight REAL NOT NULL DEFAULT 0.5,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            UNIQUE(target_id, indicator_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_associations_target_weight ON associations(target_id, weight)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_associations_indicator ON associations(indicator_id)")
        .execute(pool)
        .await?;

    Ok(())
}
