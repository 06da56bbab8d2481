//! Upstream source of posts and their insights.

use crate::domain::FetchedMedia;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt;

pub mod instagram;
pub mod mock;

pub use instagram::InstagramDataSource;
pub use mock::MockDataSource;

/// Source of recent posts with metrics.
///
/// One call is one round trip; implementations do not retry.
#[async_trait]
pub trait MediaSource: Send + Sync + fmt::Debug {
    /// Fetch posts published at or after `since`, plus the account's current
    /// follower count.
    async fn fetch_recent_posts(
        &self,
        since: DateTime<Utc>,
    ) -> Result<FetchedMedia, DataSourceError>;
}

/// Error type for data source operations.
#[derive(Debug, Clone)]
pub enum DataSourceError {
    /// Credentials for the source were not provided.
    NotConfigured(String),
    /// Network error (e.g., connection timeout, DNS failure)
    NetworkError(String),
    /// Non-success HTTP status
    HttpError { status: u16, message: String },
    /// Invalid JSON or malformed response
    ParseError(String),
    /// Other error
    Other(String),
}

impl fmt::Display for DataSourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSourceError::NotConfigured(msg) => write!(f, "Source not configured: {}", msg),
            DataSourceError::NetworkError(msg) => write!(f, "Network error: {}", msg),
            DataSourceError::HttpError { status, message } => {
                write!(f, "HTTP error {}: {}", status, message)
            }
            DataSourceError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            DataSourceError::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for DataSourceError {}
