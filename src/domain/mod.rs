//! Domain types for the post-insights report.
//!
//! This module provides:
//! - Primitives: PostId, Bucket, report date formatting
//! - Cell values and the seven-slot bucket window
//! - Posts and their metrics as fetched upstream
//! - The snapshot image of the report grid
//! - The report clock

pub mod cell;
pub mod clock;
pub mod post;
pub mod primitives;
pub mod snapshot;

pub use cell::{BucketValues, CellValue, METRIC_SLOTS};
pub use clock::{ReportClock, LOOKBACK_DAYS};
pub use post::{shorten_caption, FetchedMedia, Metric, Metrics, Post};
pub use primitives::{format_report_date, Bucket, PostId};
pub use snapshot::{Snapshot, SnapshotRow};
