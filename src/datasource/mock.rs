//! Mock data source for testing without network calls.

use super::{DataSourceError, MediaSource};
use crate::domain::{FetchedMedia, Post};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Mock data source that returns predefined posts, or a predefined error.
#[derive(Debug, Clone)]
pub struct MockDataSource {
    posts: Vec<Post>,
    follower_count: i64,
    error: Option<DataSourceError>,
    calls: Arc<AtomicUsize>,
}

impl MockDataSource {
    /// Create a new mock data source with no posts and zero followers.
    pub fn new() -> Self {
        Self {
            posts: Vec::new(),
            follower_count: 0,
            error: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Mock whose every fetch fails with `error`.
    pub fn failing(error: DataSourceError) -> Self {
        Self {
            error: Some(error),
            ..Self::new()
        }
    }

    /// Add a post to the mock data source.
    pub fn with_post(mut self, post: Post) -> Self {
        self.posts.push(post);
        self
    }

    /// Add multiple posts to the mock data source.
    pub fn with_posts(mut self, posts: Vec<Post>) -> Self {
        self.posts.extend(posts);
        self
    }

    /// Set the follower count returned with every fetch.
    pub fn with_follower_count(mut self, count: i64) -> Self {
        self.follower_count = count;
        self
    }

    /// Number of fetches made so far.
    pub fn fetch_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for MockDataSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MediaSource for MockDataSource {
    async fn fetch_recent_posts(
        &self,
        _since: DateTime<Utc>,
    ) -> Result<FetchedMedia, DataSourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = &self.error {
            return Err(err.clone());
        }
        Ok(FetchedMedia {
            posts: self.posts.clone(),
            follower_count: self.follower_count,
        })
    }
}
