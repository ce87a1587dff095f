// Risk window repository implementation

use crate::db::DbPool;
use crate::errors::StorageError;
use crate::models::RiskWindowRecord;
use async_trait::async_trait;
use tracing::instrument;

/// Append-only record of persist-to-deliver latency
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LatencyLog: Send + Sync {
    async fn save(&self, record: &RiskWindowRecord) -> Result<(), StorageError>;
}

/// Repository for the `risk_window_log` table
#[derive(Debug, Clone)]
pub struct RiskWindowRepository {
    pool: DbPool,
}

impl RiskWindowRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Number of latency records written for one item
    #[instrument(skip(self))]
    pub async fn count_for_item(&self, item_id: &str) -> Result<i64, StorageError> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM risk_window_log WHERE item_id = ?1")
                .bind(item_id)
                .fetch_one(self.pool.pool())
                .await?;
        Ok(count)
    }
}

#[async_trait]
impl LatencyLog for RiskWindowRepository {
    #[instrument(skip(self, record), fields(item_id = %record.item_id, elapsed_micros = record.elapsed_micros))]
    async fn save(&self, record: &RiskWindowRecord) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            INSERT INTO risk_window_log (category, item_id, saved_at, notified_at, elapsed_micros)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&record.category)
        .bind(&record.item_id)
        .bind(record.persisted_at)
        .bind(record.notified_at)
        .bind(record.elapsed_micros)
        .execute(self.pool.pool())
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatabaseConfig;
    use chrono::{Duration, Utc};

    #[tokio::test]
    async fn test_save_appends_records() {
        let dir = tempfile::tempdir().unwrap();
        let config = DatabaseConfig {
            url: format!("sqlite://{}", dir.path().join("latency.db").display()),
            max_connections: 2,
            busy_timeout_seconds: 5,
        };
        let pool = DbPool::new(&config).await.unwrap();
        pool.migrate().await.unwrap();
        let log = RiskWindowRepository::new(pool.clone());

        let persisted_at = Utc::now();
        let record = RiskWindowRecord {
            category: "CSE".to_string(),
            item_id: "cse-1".to_string(),
            persisted_at,
            notified_at: persisted_at + Duration::milliseconds(12),
            elapsed_micros: 12_000,
        };

        log.save(&record).await.unwrap();
        log.save(&record).await.unwrap();

        assert_eq!(log.count_for_item("cse-1").await.unwrap(), 2);
        assert_eq!(log.count_for_item("cse-2").await.unwrap(), 0);

        let (elapsed,): (i64,) =
            sqlx::query_as("SELECT elapsed_micros FROM risk_window_log LIMIT 1")
                .fetch_one(pool.pool())
                .await
                .unwrap();
        assert_eq!(elapsed, 12_000);
    }
}
