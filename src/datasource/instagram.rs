//! Instagram Graph API client implementation.

use super::{DataSourceError, MediaSource};
use crate::config::InstagramConfig;
use crate::domain::{FetchedMedia, Metric, Metrics, Post, PostId};
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use reqwest::Client;
use tracing::{debug, warn};

/// Instagram data source reading the account's recent media and insights.
#[derive(Debug, Clone)]
pub struct InstagramDataSource {
    client: Client,
    config: InstagramConfig,
    offset: FixedOffset,
}

impl InstagramDataSource {
    /// Create a new data source. `offset` is the report's local offset used
    /// to turn publication timestamps into calendar days.
    pub fn new(config: InstagramConfig, offset: FixedOffset) -> Result<Self, DataSourceError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| DataSourceError::Other(e.to_string()))?;
        Ok(Self {
            client,
            config,
            offset,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/{}/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.api_version,
            self.config.user_id
        )
    }
}

/// `fields` query value asking for follower count plus media since `since`.
pub fn fields_param(since: DateTime<Utc>) -> String {
    let mut metrics: Vec<&str> = Metric::ALL.iter().map(|m| m.name()).collect();
    metrics.sort_unstable();
    format!(
        "followers_count,media.since({}).fields(id,permalink,timestamp,caption,insights.metric({}))",
        since.timestamp(),
        metrics.join(",")
    )
}

#[async_trait]
impl MediaSource for InstagramDataSource {
    async fn fetch_recent_posts(
        &self,
        since: DateTime<Utc>,
    ) -> Result<FetchedMedia, DataSourceError> {
        debug!("Fetching media since {}", since);

        let response = self
            .client
            .get(self.endpoint())
            .query(&[
                ("fields", fields_param(since)),
                ("access_token", self.config.access_token.clone()),
            ])
            .send()
            .await
            .map_err(|e| DataSourceError::NetworkError(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| DataSourceError::NetworkError(e.to_string()))?;

        if !status.is_success() {
            return Err(DataSourceError::HttpError {
                status: status.as_u16(),
                message: graph_error_message(&body).unwrap_or_else(|| "request failed".to_string()),
            });
        }

        let json: serde_json::Value = serde_json::from_str(&body)
            .map_err(|e| DataSourceError::ParseError(e.to_string()))?;

        parse_media_response(&json, self.offset)
    }
}

fn graph_error_message(body: &str) -> Option<String> {
    let json: serde_json::Value = serde_json::from_str(body).ok()?;
    json.get("error")?
        .get("message")?
        .as_str()
        .map(|s| s.to_string())
}

/// Parse the account response into posts. Malformed media items are skipped.
pub fn parse_media_response(
    json: &serde_json::Value,
    offset: FixedOffset,
) -> Result<FetchedMedia, DataSourceError> {
    let follower_count = json
        .get("followers_count")
        .and_then(|v| v.as_i64())
        .ok_or_else(|| DataSourceError::ParseError("Missing followers_count field".to_string()))?;

    let items: &[serde_json::Value] = match json.get("media").and_then(|m| m.get("data")) {
        Some(data) => data
            .as_array()
            .ok_or_else(|| DataSourceError::ParseError("Expected media.data array".to_string()))?
            .as_slice(),
        None => &[],
    };

    let mut posts = Vec::with_capacity(items.len());
    for item in items {
        match parse_post(item, offset) {
            Ok(post) => posts.push(post),
            Err(e) => {
                warn!("Failed to parse media item: {}", e);
            }
        }
    }

    Ok(FetchedMedia {
        posts,
        follower_count,
    })
}

fn parse_post(item: &serde_json::Value, offset: FixedOffset) -> Result<Post, DataSourceError> {
    let id = item
        .get("id")
        .and_then(|v| v.as_str())
        .ok_or_else(|| DataSourceError::ParseError("Missing id field".to_string()))?;

    let ts_str = item
        .get("timestamp")
        .and_then(|v| v.as_str())
        .ok_or_else(|| DataSourceError::ParseError(format!("Missing timestamp for {}", id)))?;
    let posted_on = parse_timestamp(ts_str)?
        .with_timezone(&offset)
        .date_naive();

    let permalink = item
        .get("permalink")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();
    let caption = item.get("caption").and_then(|v| v.as_str());

    let insights = item
        .get("insights")
        .and_then(|v| v.get("data"))
        .and_then(|v| v.as_array())
        .ok_or_else(|| DataSourceError::ParseError(format!("Missing insights for {}", id)))?;

    let mut metrics = Metrics::new();
    for insight in insights {
        let Some(metric) = insight
            .get("name")
            .and_then(|v| v.as_str())
            .and_then(Metric::from_name)
        else {
            continue;
        };
        let value = insight
            .get("values")
            .and_then(|v| v.get(0))
            .and_then(|v| v.get("value"))
            .and_then(|v| v.as_i64());
        if let Some(value) = value {
            metrics.insert(metric, value);
        }
    }

    Ok(Post::new(
        PostId::new(id.to_string()),
        posted_on,
        permalink,
        caption,
        metrics,
    ))
}

/// Graph API timestamps look like `2026-10-06T14:03:11+0000`.
pub fn parse_timestamp(s: &str) -> Result<DateTime<FixedOffset>, DataSourceError> {
    DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%z")
        .or_else(|_| DateTime::parse_from_rfc3339(s))
        .map_err(|e| DataSourceError::ParseError(format!("Invalid timestamp {}: {}", s, e)))
}
