use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::HashMap;
use std::fmt;

// ============================================================================
// Notice Models
// ============================================================================

/// A listed item as normalized by a source adapter
///
/// `id` has the shape `<provider>_<category>-<postId>` and is unique across every
/// category that shares the item store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPayload {
    pub id: String,
    pub title: String,
    pub link: String,
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub writer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access: Option<String>,
}

impl NotificationPayload {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        link: impl Into<String>,
        date: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            link: link.into(),
            date: date.into(),
            writer: None,
            access: None,
        }
    }
}

/// Listings of one fetch keyed by category
pub type NoticeBatch = HashMap<String, Vec<NotificationPayload>>;

/// One listing page of a single category
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoticePage {
    pub general: Vec<NotificationPayload>,
}

/// Row of the `notices` table
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StoredNotice {
    pub id: String,
    pub category: String,
    pub title: String,
    pub link: String,
    pub date: String,
    pub created_at: DateTime<Utc>,
}

/// Row of the `risk_window_log` table: time between persisting an item and delivering it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskWindowRecord {
    pub category: String,
    pub item_id: String,
    pub persisted_at: DateTime<Utc>,
    pub notified_at: DateTime<Utc>,
    pub elapsed_micros: i64,
}

// ============================================================================
// Notification Models
// ============================================================================

/// Structured data attached to a push
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationData {
    pub id: String,
    pub link: String,
    pub date: String,
}

impl NotificationData {
    /// Flatten into the string map push transports expect
    pub fn to_map(&self) -> HashMap<String, String> {
        HashMap::from([
            ("id".to_string(), self.id.clone()),
            ("link".to_string(), self.link.clone()),
            ("date".to_string(), self.date.clone()),
        ])
    }
}

/// A composed push: display title, body and data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationMessage {
    pub title: String,
    pub body: String,
    pub data: NotificationData,
}

// ============================================================================
// Family Models
// ============================================================================

/// Category family; each owns a title table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FamilyKind {
    AcademicCalendar,
    Department,
    Library,
    University,
}

impl fmt::Display for FamilyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FamilyKind::AcademicCalendar => write!(f, "academic_calendar"),
            FamilyKind::Department => write!(f, "department"),
            FamilyKind::Library => write!(f, "library"),
            FamilyKind::University => write!(f, "university"),
        }
    }
}

/// Calendar string format used by a family's listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateFormat {
    /// `YYYY.MM.DD`
    #[default]
    Dotted,
    /// `YYYY-MM-DD`
    Dashed,
}

impl DateFormat {
    pub fn pattern(&self) -> &'static str {
        match self {
            DateFormat::Dotted => "%Y.%m.%d",
            DateFormat::Dashed => "%Y-%m-%d",
        }
    }

    pub fn all() -> [DateFormat; 2] {
        [DateFormat::Dotted, DateFormat::Dashed]
    }
}

/// Outcome counters of one crawl run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlReport {
    pub fetched: usize,
    pub dated_today: usize,
    pub rejected: usize,
    pub inserted: usize,
    pub duplicates: usize,
    pub delivered: usize,
    pub delivery_failures: usize,
    pub storage_failures: usize,
    pub aborted: bool,
}
