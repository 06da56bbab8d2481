//! Fetched post and its engagement metrics.

use super::cell::{BucketValues, CellValue};
use super::PostId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use unicode_segmentation::UnicodeSegmentation;

/// Engagement metric reported per post.
///
/// Declaration order is the slot order inside a bucket block. Storage is
/// positional, so this order must never change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Comments,
    Likes,
    Shares,
    Follows,
    Reach,
    TotalInteractions,
    Views,
}

impl Metric {
    pub const ALL: [Metric; 7] = [
        Metric::Comments,
        Metric::Likes,
        Metric::Shares,
        Metric::Follows,
        Metric::Reach,
        Metric::TotalInteractions,
        Metric::Views,
    ];

    /// Name used by the upstream insights API.
    pub fn name(&self) -> &'static str {
        match self {
            Metric::Comments => "comments",
            Metric::Likes => "likes",
            Metric::Shares => "shares",
            Metric::Follows => "follows",
            Metric::Reach => "reach",
            Metric::TotalInteractions => "total_interactions",
            Metric::Views => "views",
        }
    }

    pub fn from_name(name: &str) -> Option<Metric> {
        Metric::ALL.into_iter().find(|m| m.name() == name)
    }
}

/// Metric counts for one post. Not every post type reports every metric.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Metrics(BTreeMap<Metric, i64>);

impl Metrics {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn with(mut self, metric: Metric, value: i64) -> Self {
        self.0.insert(metric, value);
        self
    }

    pub fn insert(&mut self, metric: Metric, value: i64) {
        self.0.insert(metric, value);
    }

    pub fn get(&self, metric: Metric) -> Option<i64> {
        self.0.get(&metric).copied()
    }

    /// Lay the metrics out in slot order; absent metrics become blank cells.
    pub fn to_bucket_values(&self) -> BucketValues {
        Metric::ALL.map(|m| CellValue::from(self.get(m)))
    }
}

/// A post as returned by the upstream source, normalized for the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    /// Calendar day of publication at the report offset.
    pub posted_on: NaiveDate,
    pub permalink: String,
    /// Shortened caption used as the link label.
    pub caption: String,
    pub metrics: Metrics,
}

impl Post {
    /// Build a post, shortening the raw caption.
    pub fn new(
        id: PostId,
        posted_on: NaiveDate,
        permalink: String,
        raw_caption: Option<&str>,
        metrics: Metrics,
    ) -> Self {
        Self {
            id,
            posted_on,
            permalink,
            caption: shorten_caption(raw_caption.unwrap_or("")),
            metrics,
        }
    }

    /// Spreadsheet formula linking the caption to the permalink.
    pub fn title_formula(&self) -> String {
        format!(
            "=HYPERLINK(\"{}\",\"{}\")",
            escape_formula_string(&self.permalink),
            escape_formula_string(&self.caption)
        )
    }
}

/// One upstream fetch: posts in the lookback window plus the account's
/// follower count at fetch time.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FetchedMedia {
    pub posts: Vec<Post>,
    pub follower_count: i64,
}

const CAPTION_WORDS: usize = 5;

/// Strip emoji, keep the first five space-separated words, drop newlines and
/// commas.
pub fn shorten_caption(raw: &str) -> String {
    let without_emoji: String = raw.graphemes(true).filter(|g| !is_emoji(g)).collect();
    without_emoji
        .split(' ')
        .take(CAPTION_WORDS)
        .collect::<Vec<_>>()
        .join(" ")
        .replace('\n', "")
        .replace(',', "")
}

fn escape_formula_string(s: &str) -> String {
    s.replace('"', "\"\"")
}

/// Whether a grapheme cluster is an emoji, in any qualification or with a
/// skin tone.
fn is_emoji(grapheme: &str) -> bool {
    let base: String = grapheme
        .chars()
        .filter(|c| !matches!(*c, '\u{FE0F}' | '\u{1F3FB}'..='\u{1F3FF}'))
        .collect();
    emojis::get(grapheme).is_some()
        || (!base.is_empty()
            && (emojis::get(&base).is_some()
                || emojis::get(&format!("{}\u{FE0F}", base)).is_some()))
}
