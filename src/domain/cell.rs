//! Cell values as they travel between the report grid and the engine.

use serde::{Serialize, Serializer};

/// Number of metric slots in one bucket block.
pub const METRIC_SLOTS: usize = 7;

/// A single grid cell.
///
/// `Blank` is distinct from `Int(0)`: a metric the source did not report is
/// written as an empty cell, never as zero.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CellValue {
    #[default]
    Blank,
    Int(i64),
    Text(String),
}

impl CellValue {
    /// Interpret raw cell text read back from the grid.
    ///
    /// Blank stays blank, integers become `Int`, anything else is kept
    /// verbatim so it is written back unchanged.
    pub fn parse_raw(raw: &str) -> Self {
        if raw.is_empty() {
            return CellValue::Blank;
        }
        match raw.trim().parse::<i64>() {
            Ok(n) => CellValue::Int(n),
            Err(_) => CellValue::Text(raw.to_string()),
        }
    }

    /// Raw text kept verbatim, blank when empty. Used for id/date/title cells.
    pub fn text(raw: &str) -> Self {
        if raw.is_empty() {
            CellValue::Blank
        } else {
            CellValue::Text(raw.to_string())
        }
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, CellValue::Blank)
    }

    /// Render as the string a grid would display in formula view.
    pub fn render(&self) -> String {
        match self {
            CellValue::Blank => String::new(),
            CellValue::Int(n) => n.to_string(),
            CellValue::Text(s) => s.clone(),
        }
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        CellValue::Int(n)
    }
}

impl From<Option<i64>> for CellValue {
    fn from(n: Option<i64>) -> Self {
        n.map(CellValue::Int).unwrap_or(CellValue::Blank)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::text(s)
    }
}

impl Serialize for CellValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CellValue::Blank => serializer.serialize_str(""),
            CellValue::Int(n) => serializer.serialize_i64(*n),
            CellValue::Text(s) => serializer.serialize_str(s),
        }
    }
}

/// The seven positional metric slots of one bucket block.
pub type BucketValues = [CellValue; METRIC_SLOTS];

/// Parse a seven-cell window. Returns `None` when every cell is blank.
pub fn parse_bucket_window(raw: &[String]) -> Option<BucketValues> {
    let values: BucketValues =
        std::array::from_fn(|i| raw.get(i).map(|s| CellValue::parse_raw(s)).unwrap_or_default());
    if values.iter().all(CellValue::is_blank) {
        None
    } else {
        Some(values)
    }
}
