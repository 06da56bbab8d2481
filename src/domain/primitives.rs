//! Domain primitives: PostId, Bucket, report date formatting.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Source-assigned post identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PostId(pub String);

impl PostId {
    /// Create a PostId from a string.
    pub fn new(id: String) -> Self {
        PostId(id)
    }

    /// Get the id as a string reference.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PostId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PostId {
    fn from(s: &str) -> Self {
        PostId(s.to_string())
    }
}

/// Age window a post's metrics are recorded under.
///
/// Declaration order is the left-to-right order of the bucket blocks in the
/// report grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bucket {
    Week1,
    Week2,
    Month,
}

impl Bucket {
    pub const ALL: [Bucket; 3] = [Bucket::Week1, Bucket::Week2, Bucket::Month];

    /// Position of this bucket among the three blocks (0-based).
    pub fn ordinal(&self) -> usize {
        match self {
            Bucket::Week1 => 0,
            Bucket::Week2 => 1,
            Bucket::Month => 2,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Bucket::Week1 => "week1",
            Bucket::Week2 => "week2",
            Bucket::Month => "month",
        }
    }
}

impl std::fmt::Display for Bucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Format a calendar day the way the report stores it: `Y/M/D`, no padding.
pub fn format_report_date(date: NaiveDate) -> String {
    format!("{}/{}/{}", date.year(), date.month(), date.day())
}
