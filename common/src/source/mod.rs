// Source adapters: fetch raw listings and normalize them into notification payloads

pub mod http;
pub mod identity;

use crate::errors::FetchError;
use crate::models::{NoticeBatch, NoticePage};
use async_trait::async_trait;

pub use http::{HttpSourceAdapter, ListingRow};
pub use identity::{extract_post_id, normalize_date, notice_id, source_tag};

/// Fetches listings of one category family
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// First page of every category, keyed by category
    async fn fetch_all_notices(&self) -> Result<NoticeBatch, FetchError>;

    /// One page of a single category
    async fn fetch_notices(&self, category: &str, page: u32) -> Result<NoticePage, FetchError>;

    /// Every category key this adapter serves
    fn all_categories(&self) -> Vec<String>;
}
