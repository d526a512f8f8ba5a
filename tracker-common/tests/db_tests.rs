//! Tests for database initialization and the store-enforced invariants:
//! cascading deletes and the (target, indicator) uniqueness constraint.

use sqlx::SqlitePool;
use tracker_common::db::{connect_memory, init_database};

async fn insert_source(pool: &SqlitePool, id: &str, name: &str) {
    sqlx::query(
        "INSERT INTO sources (id, name, type, url, metadata, created_at, updated_at) \
         VALUES (?, ?, 'osint', '', '{}', '2026-01-01T00:00:00Z', '2026-01-01T00:00:00Z')",
    )
    .bind(id)
    .bind(name)
    .execute(pool)
    .await
    .unwrap();
}

async fn insert_target(pool: &SqlitePool, id: &str, name: &str) {
    sqlx::query(
        "INSERT INTO targets (id, name, created_at, updated_at) \
         VALUES (?, ?, '2026-01-01T00:00:00Z', '2026-01-01T00:00:00Z')",
    )
    .bind(id)
    .bind(name)
    .execute(pool)
    .await
    .unwrap();
}

async fn insert_indicator(pool: &SqlitePool, id: &str, source_id: &str) {
    sqlx::query(
        "INSERT INTO indicators (id, type, value, score, source_id, created_at, updated_at) \
         VALUES (?, 'keyword', 'v', 0.5, ?, '2026-01-01T00:00:00Z', '2026-01-01T00:00:00Z')",
    )
    .bind(id)
    .bind(source_id)
    .execute(pool)
    .await
    .unwrap();
}

async fn insert_association(pool: &SqlitePool, id: &str, target_id: &str, indicator_id: &str) {
    sqlx::query(
        "INSERT INTO associations (id, target_id, indicator_id, weight, created_at, updated_at) \
         VALUES (?, ?, ?, 0.5, '2026-01-01T00:00:00Z', '2026-01-01T00:00:00Z')",
    )
    .bind(id)
    .bind(target_id)
    .bind(indicator_id)
    .execute(pool)
    .await
    .unwrap();
}

async fn count(pool: &SqlitePool, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
        .fetch_one(pool)
        .await
        .unwrap()
}

#[tokio::test]
async fn test_database_creation_when_missing() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("tracker.db");

    let pool = init_database(&db_path).await.expect("init should succeed");
    assert!(db_path.exists(), "database file was not created");

    // Schema should be queryable immediately
    assert_eq!(count(&pool, "targets").await, 0);
    assert_eq!(count(&pool, "associations").await, 0);
}

#[tokio::test]
async fn test_database_opens_existing() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("tracker.db");

    let pool1 = init_database(&db_path).await.unwrap();
    insert_target(&pool1, "t1", "Target A").await;
    drop(pool1);

    // Second open must not lose data (schema creation is idempotent)
    let pool2 = init_database(&db_path).await.unwrap();
    assert_eq!(count(&pool2, "targets").await, 1);
}

#[tokio::test]
async fn test_deleting_source_cascades_to_indicators_and_associations() {
    let pool = connect_memory().await.unwrap();
    insert_source(&pool, "s1", "SRC1").await;
    insert_target(&pool, "t1", "Target A").await;
    insert_indicator(&pool, "i1", "s1").await;
    insert_association(&pool, "a1", "t1", "i1").await;

    sqlx::query("DELETE FROM sources WHERE id = 's1'")
        .execute(&pool)
        .await
        .unwrap();

    assert_eq!(count(&pool, "indicators").await, 0);
    assert_eq!(count(&pool, "associations").await, 0);
    // The target itself is untouched
    assert_eq!(count(&pool, "targets").await, 1);
}

#[tokio::test]
async fn test_deleting_target_cascades_to_associations_only() {
    let pool = connect_memory().await.unwrap();
    insert_source(&pool, "s1", "SRC1").await;
    insert_target(&pool, "t1", "Target A").await;
    insert_indicator(&pool, "i1", "s1").await;
    insert_association(&pool, "a1", "t1", "i1").await;

    sqlx::query("DELETE FROM targets WHERE id = 't1'")
        .execute(&pool)
        .await
        .unwrap();

    assert_eq!(count(&pool, "associations").await, 0);
    assert_eq!(count(&pool, "indicators").await, 1);
}

#[tokio::test]
async fn test_deleting_indicator_cascades_to_associations_only() {
    let pool = connect_memory().await.unwrap();
    insert_source(&pool, "s1", "SRC1").await;
    insert_target(&pool, "t1", "Target A").await;
    insert_indicator(&pool, "i1", "s1").await;
    insert_association(&pool, "a1", "t1", "i1").await;

    sqlx::query("DELETE FROM indicators WHERE id = 'i1'")
        .execute(&pool)
        .await
        .unwrap();

    assert_eq!(count(&pool, "associations").await, 0);
    assert_eq!(count(&pool, "targets").await, 1);
}

#[tokio::test]
async fn test_duplicate_association_pair_rejected() {
    let pool = connect_memory().await.unwrap();
    insert_source(&pool, "s1", "SRC1").await;
    insert_target(&pool, "t1", "Target A").await;
    insert_indicator(&pool, "i1", "s1").await;
    insert_association(&pool, "a1", "t1", "i1").await;

    let result = sqlx::query(
        "INSERT INTO associations (id, target_id, indicator_id, weight, created_at, updated_at) \
         VALUES ('a2', 't1', 'i1', 0.9, '2026-01-01T00:00:00Z', '2026-01-01T00:00:00Z')",
    )
    .execute(&pool)
    .await;

    let err = result.expect_err("duplicate (target, indicator) pair should fail");
    let db_err = match err {
        sqlx::Error::Database(e) => e,
        other => panic!("expected database error, got {:?}", other),
    };
    assert!(db_err.is_unique_violation());
}

#[tokio::test]
async fn test_indicator_requires_existing_source() {
    let pool = connect_memory().await.unwrap();

    let result = sqlx::query(
        "INSERT INTO indicators (id, type, value, score, source_id, created_at, updated_at) \
         VALUES ('i1', 'keyword', 'v', 0.5, 'missing', '2026-01-01T00:00:00Z', '2026-01-01T00:00:00Z')",
    )
    .execute(&pool)
    .await;

    assert!(result.is_err(), "dangling source reference should fail");
}
