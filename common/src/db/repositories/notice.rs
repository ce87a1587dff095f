// Notice repository implementation
// The primary key on `notices.id` is the single decision point for "new or already seen"

use crate::db::DbPool;
use crate::errors::StorageError;
use crate::models::{NotificationPayload, StoredNotice};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite};
use tracing::instrument;

/// Item store contract used by the crawl scheduler
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NoticeStore: Send + Sync {
    /// Insert the item unless its id exists; `true` iff a row was created
    async fn save(&self, category: &str, item: &NotificationPayload) -> Result<bool, StorageError>;

    /// Delete every row not dated `date`; returns rows removed
    async fn delete_excluding_date(&self, date: &str) -> Result<u64, StorageError>;

    /// Delete every row whose date is none of `dates`; returns rows removed
    async fn delete_excluding_dates(&self, dates: &[String]) -> Result<u64, StorageError>;
}

/// Repository for the `notices` table
#[derive(Debug, Clone)]
pub struct NoticeRepository {
    pool: DbPool,
}

impl NoticeRepository {
    /// Create a new NoticeRepository
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Find a stored notice by id
    #[instrument(skip(self))]
    pub async fn find_by_id(&self, id: &str) -> Result<Option<StoredNotice>, StorageError> {
        let notice = sqlx::query_as::<_, StoredNotice>(
            r#"
            SELECT id, category, title, link, date, created_at
            FROM notices
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool.pool())
        .await?;

        Ok(notice)
    }

    /// Number of stored notices
    pub async fn count(&self) -> Result<i64, StorageError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM notices")
            .fetch_one(self.pool.pool())
            .await?;
        Ok(count)
    }
}

#[async_trait]
impl NoticeStore for NoticeRepository {
    #[instrument(skip(self, item), fields(item_id = %item.id))]
    async fn save(&self, category: &str, item: &NotificationPayload) -> Result<bool, StorageError> {
        // One statement: concurrent callers race on the unique key, not on a prior read
        let result = sqlx::query(
            r#"
            INSERT INTO notices (id, category, title, link, date, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(id) DO NOTHING
            "#,
        )
        .bind(&item.id)
        .bind(category)
        .bind(&item.title)
        .bind(&item.link)
        .bind(&item.date)
        .bind(Utc::now())
        .execute(self.pool.pool())
        .await?;

        let inserted = result.rows_affected() == 1;
        tracing::debug!(inserted, "Notice save attempted");
        Ok(inserted)
    }

    #[instrument(skip(self))]
    async fn delete_excluding_date(&self, date: &str) -> Result<u64, StorageError> {
        let result = sqlx::query("DELETE FROM notices WHERE date <> ?1")
            .bind(date)
            .execute(self.pool.pool())
            .await?;

        Ok(result.rows_affected())
    }

    #[instrument(skip(self))]
    async fn delete_excluding_dates(&self, dates: &[String]) -> Result<u64, StorageError> {
        if dates.is_empty() {
            return Err(StorageError::QueryFailed(
                "refusing to purge without a date to keep".to_string(),
            ));
        }

        let mut builder = QueryBuilder::<Sqlite>::new("DELETE FROM notices WHERE date NOT IN (");
        let mut separated = builder.separated(", ");
        for date in dates {
            separated.push_bind(date.as_str());
        }
        separated.push_unseparated(")");

        let result = builder.build().execute(self.pool.pool()).await?;
        Ok(result.rows_affected())
    }
}
