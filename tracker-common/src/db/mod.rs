//! Database access layer
//!
//! SQLite via sqlx. Referential integrity (cascading deletes, uniqueness)
//! is enforced by the store; `PRAGMA foreign_keys = ON` is mandatory for
//! the cascade behavior and is applied to every connection.

use crate::Result;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use std::path::Path;
use tracing::info;

pub mod models;
pub mod schema;

pub use schema::create_schema;

/// Open (or create) the tracker database and ensure the schema exists.
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    // mode=rwc creates the database file on first run
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    configure_connection(&pool).await?;
    create_schema(&pool).await?;

    Ok(pool)
}

/// Connect to a fresh in-memory database with the full schema.
///
/// Single-connection pool: each in-memory SQLite connection is its own
/// database, so a larger pool would see different contents per connection.
pub async fn connect_memory() -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;

    configure_connection(&pool).await?;
    create_schema(&pool).await?;

    Ok(pool)
}

async fn configure_connection(pool: &SqlitePool) -> Result<()> {
    // Required for ON DELETE CASCADE on indicators and associations
    sqlx::query("PRAGMA foreign_keys = ON").execute(pool).await?;

    // WAL allows concurrent readers with one writer
    sqlx::query("PRAGMA journal_mode = WAL").execute(pool).await?;

    sqlx::query("PRAGMA busy_timeout = 5000").execute(pool).await?;

    Ok(())
}
