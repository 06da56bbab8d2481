pub mod api;
pub mod config;
pub mod datasource;
pub mod domain;
pub mod engine;
pub mod error;
pub mod orchestration;
pub mod sheet;

pub use config::Config;
pub use datasource::{DataSourceError, InstagramDataSource, MediaSource, MockDataSource};
pub use domain::{
    Bucket, CellValue, FetchedMedia, Metric, Metrics, Post, PostId, ReportClock, Snapshot,
    SnapshotRow,
};
pub use engine::{Reconciler, WritePlan};
pub use error::AppError;
pub use orchestration::{GuardOutcome, ReportRunner, RunError};
pub use sheet::{GoogleSheetsClient, MemorySheet, SheetBackend, SnapshotStore};
