// HTTP source adapter
//
// Reads per-category listing endpoints that serve already-extracted rows as
// JSON, and turns each row into a NotificationPayload with a store-wide id.

use crate::errors::FetchError;
use crate::models::{DateFormat, NoticeBatch, NoticePage, NotificationPayload};
use crate::source::identity::{normalize_date, notice_id, source_tag};
use crate::source::SourceAdapter;
use async_trait::async_trait;
use futures::future::try_join_all;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// One row of a listing endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingRow {
    pub title: String,
    pub link: String,
    pub date: String,
    #[serde(default)]
    pub writer: Option<String>,
    #[serde(default)]
    pub access: Option<String>,
}

/// Source adapter over JSON listing endpoints, one per category
pub struct HttpSourceAdapter {
    client: Client,
    provider: String,
    date_format: DateFormat,
    categories: BTreeMap<String, String>,
}

impl HttpSourceAdapter {
    pub fn new(
        provider: impl Into<String>,
        date_format: DateFormat,
        categories: BTreeMap<String, String>,
        timeout_seconds: u64,
    ) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .map_err(|e| FetchError::Http(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            provider: provider.into(),
            date_format,
            categories,
        })
    }

    /// Convert a raw row; rows that cannot be identified or dated are skipped
    fn to_payload(&self, category: &str, row: ListingRow) -> Option<NotificationPayload> {
        let id = match notice_id(&source_tag(&self.provider, category), &row.link) {
            Ok(id) => id,
            Err(e) => {
                warn!(category, link = %row.link, error = %e, "Skipping row without post id");
                return None;
            }
        };
        let date = match normalize_date(&row.date, self.date_format) {
            Ok(date) => date,
            Err(e) => {
                warn!(category, item_id = %id, error = %e, "Skipping row with unreadable date");
                return None;
            }
        };

        Some(NotificationPayload {
            id,
            title: row.title.trim().to_string(),
            link: row.link,
            date,
            writer: row.writer,
            access: row.access,
        })
    }
}

#[async_trait]
impl SourceAdapter for HttpSourceAdapter {
    #[instrument(skip(self), fields(provider = %self.provider))]
    async fn fetch_all_notices(&self) -> Result<NoticeBatch, FetchError> {
        let pages = try_join_all(self.categories.keys().map(|category| async move {
            let page = self.fetch_notices(category, 1).await?;
            Ok::<_, FetchError>((category.clone(), page.general))
        }))
        .await?;

        Ok(pages.into_iter().collect())
    }

    #[instrument(skip(self), fields(provider = %self.provider))]
    async fn fetch_notices(&self, category: &str, page: u32) -> Result<NoticePage, FetchError> {
        let url = self
            .categories
            .get(category)
            .ok_or_else(|| FetchError::UnknownCategory(category.to_string()))?;

        let response = self
            .client
            .get(url)
            .query(&[("page", page)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.clone(),
                status: status.as_u16(),
            });
        }

        let rows: Vec<ListingRow> = response.json().await?;
        debug!(rows = rows.len(), "Listing fetched");

        let general = rows
            .into_iter()
            .filter_map(|row| self.to_payload(category, row))
            .collect();

        Ok(NoticePage { general })
    }

    fn all_categories(&self) -> Vec<String> {
        self.categories.keys().cloned().collect()
    }
}
