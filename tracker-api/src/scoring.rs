//! Weighted score aggregation for targets
//!
//! The score of a target is Σ (indicator.score × association.weight) over
//! every association referencing it. Computed in the store on every call:
//! indicator scores and association weights change independently, so there
//! is no cached score to go stale.

use sqlx::SqlitePool;

use crate::error::{ApiError, ApiResult};

/// Compute the weighted score for a target.
///
/// Returns 0.0 for a target with no associations; NotFound if the target
/// itself does not exist.
pub async fn compute_score(db: &SqlitePool, target_id: &str) -> ApiResult<f64> {
    let exists: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM targets WHERE id = ?")
        .bind(target_id)
        .fetch_one(db)
        .await?;

    if exists == 0 {
        return Err(ApiError::NotFound(format!(
            "target {} not found",
            target_id
        )));
    }

    let score: f64 = sqlx::query_scalar(
        "SELECT COALESCE(SUM(i.score * a.weight), 0.0) \
         FROM associations a \
         JOIN indicators i ON i.id = a.indicator_id \
         WHERE a.target_id = ?",
    )
    .bind(target_id)
    .fetch_one(db)
    .await?;

    Ok(score)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracker_common::db::connect_memory;

    async fn seed(db: &SqlitePool) {
        sqlx::query(
            "INSERT INTO sources (id, name, type, url, metadata, created_at, updated_at) \
             VALUES ('s1', 'SRC1', 'osint', '', '{}', '2026-01-01T00:00:00Z', '2026-01-01T00:00:00Z')",
        )
        .execute(db)
        .await
        .unwrap();

        sqlx::query(
            "INSERT INTO targets (id, name, created_at, updated_at) \
             VALUES ('t1', 'Target A', '2026-01-01T00:00:00Z', '2026-01-01T00:00:00Z')",
        )
        .execute(db)
        .await
        .unwrap();

        for (id, score) in [("i1", 0.7), ("i2", 0.4)] {
            sqlx::query(
                "INSERT INTO indicators (id, type, value, score, source_id, created_at, updated_at) \
                 VALUES (?, 'keyword', 'v', ?, 's1', '2026-01-01T00:00:00Z', '2026-01-01T00:00:00Z')",
            )
            .bind(id)
            .bind(score)
            .execute(db)
            .await
            .unwrap();
        }
    }

    async fn associate(db: &SqlitePool, id: &str, indicator: &str, weight: f64) {
        sqlx::query(
            "INSERT INTO associations (id, target_id, indicator_id, weight, created_at, updated_at) \
             VALUES (?, 't1', ?, ?, '2026-01-01T00:00:00Z', '2026-01-01T00:00:00Z')",
        )
        .bind(id)
        .bind(indicator)
        .bind(weight)
        .execute(db)
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_weighted_sum() {
        let db = connect_memory().await.unwrap();
        seed(&db).await;
        associate(&db, "a1", "i1", 0.8).await;
        associate(&db, "a2", "i2", 0.3).await;

        // 0.7*0.8 + 0.4*0.3 = 0.68
        let score = compute_score(&db, "t1").await.unwrap();
        assert!((score - 0.68).abs() < 1e-9, "got {}", score);
    }

    #[tokio::test]
    async fn test_no_associations_scores_zero() {
        let db = connect_memory().await.unwrap();
        seed(&db).await;

        let score = compute_score(&db, "t1").await.unwrap();
        assert_eq!(score, 0.0);
    }

    #[tokio::test]
    async fn test_missing_target_is_not_found() {
        let db = connect_memory().await.unwrap();

        let err = compute_score(&db, "missing").await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_score_reflects_current_weights() {
        let db = connect_memory().await.unwrap();
        seed(&db).await;
        associate(&db, "a1", "i1", 0.8).await;

        let before = compute_score(&db, "t1").await.unwrap();

        sqlx::query("UPDATE associations SET weight = 0.1 WHERE id = 'a1'")
            .execute(&db)
            .await
            .unwrap();

        let after = compute_score(&db, "t1").await.unwrap();
        assert!((before - 0.56).abs() < 1e-9);
        assert!((after - 0.07).abs() < 1e-9);
    }
}
