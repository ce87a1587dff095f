// Error handling framework
// One enum per failure domain of the ingestion pipeline: fetch, storage, delivery, schedule

use thiserror::Error;

/// Schedule-related errors
#[derive(Error, Debug)]
pub enum ScheduleError {
    #[error("Invalid cron expression '{expression}': {reason}")]
    InvalidCronExpression { expression: String, reason: String },

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("No next execution time available for '{expression}'")]
    NoNextExecution { expression: String },
}

/// Source adapter errors (network or malformed listings)
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("Listing request to {url} returned status {status}")]
    Status { url: String, status: u16 },

    #[error("Failed to parse listing: {0}")]
    Parse(String),

    #[error("Cannot derive a post id from URL: {0}")]
    InvalidPostUrl(String),

    #[error("Unrecognized date '{0}'")]
    InvalidDate(String),

    #[error("Unknown category: {0}")]
    UnknownCategory(String),
}

/// Item store and latency log errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),
}

/// Push delivery errors
#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error("Failed to build push client: {0}")]
    ClientBuild(String),

    #[error("Push transport failed: {0}")]
    Transport(String),

    #[error("Push endpoint rejected message with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Message serialization failed: {0}")]
    Serialization(String),
}

/// Validation errors
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid field value for {field}: {reason}")]
    InvalidFieldValue { field: String, reason: String },
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                StorageError::ConnectionFailed(err.to_string())
            }
            sqlx::Error::Database(db_err) => StorageError::QueryFailed(db_err.message().to_string()),
            _ => StorageError::QueryFailed(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for StorageError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        StorageError::MigrationFailed(err.to_string())
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            FetchError::Parse(err.to_string())
        } else {
            FetchError::Http(err.to_string())
        }
    }
}

impl From<reqwest::Error> for DeliveryError {
    fn from(err: reqwest::Error) -> Self {
        DeliveryError::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for DeliveryError {
    fn from(err: serde_json::Error) -> Self {
        DeliveryError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schedule_error_display() {
        let err = ScheduleError::InvalidCronExpression {
            expression: "* * * *".to_string(),
            reason: "invalid format".to_string(),
        };
        assert!(err.to_string().contains("Invalid cron expression"));
    }

    #[test]
    fn test_fetch_status_display() {
        let err = FetchError::Status {
            url: "https://board.example/list".to_string(),
            status: 503,
        };
        assert!(err.to_string().contains("503"));
        assert!(err.to_string().contains("board.example"));
    }

    #[test]
    fn test_row_not_found_maps_to_query_failed() {
        let err: StorageError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, StorageError::QueryFailed(_)));
    }

    #[test]
    fn test_pool_timeout_maps_to_connection_failed() {
        let err: StorageError = sqlx::Error::PoolTimedOut.into();
        assert!(matches!(err, StorageError::ConnectionFailed(_)));
    }

    #[test]
    fn test_delivery_rejected_display() {
        let err = DeliveryError::Rejected {
            status: 401,
            body: "InvalidKey".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Push endpoint rejected message with status 401: InvalidKey"
        );
    }
}
