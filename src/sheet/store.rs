//! Snapshot store: reads the report grid into a [`Snapshot`] and applies
//! write plans and clears.
//!
//! The store is constructed either around a live backend or explicitly
//! unavailable (credentials missing at startup). Every operation checks
//! availability first.

use super::{SheetBackend, SheetError};
use crate::domain::cell::parse_bucket_window;
use crate::domain::{Bucket, CellValue, PostId, Snapshot, SnapshotRow, METRIC_SLOTS};
use crate::engine::layout::{
    self, col_index, Region, DATE_COL, FOLLOWER_COL, ID_COL, ROW_OFFSET, TITLE_COL,
};
use crate::engine::WritePlan;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("store read failed: {0}")]
    ReadFailed(#[source] SheetError),
    #[error("store write failed: {0}")]
    WriteFailed(#[source] SheetError),
    #[error("store clear failed: {0}")]
    ClearFailed(#[source] SheetError),
}

#[derive(Debug, Clone)]
pub struct SnapshotStore {
    backend: Option<Arc<dyn SheetBackend>>,
    unavailable_reason: String,
}

impl SnapshotStore {
    pub fn new(backend: Arc<dyn SheetBackend>) -> Self {
        Self {
            backend: Some(backend),
            unavailable_reason: String::new(),
        }
    }

    /// A store that fails every call with [`StoreError::Unavailable`].
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            backend: None,
            unavailable_reason: reason.into(),
        }
    }

    pub fn is_available(&self) -> bool {
        self.backend.is_some()
    }

    fn backend(&self) -> Result<&Arc<dyn SheetBackend>, StoreError> {
        self.backend
            .as_ref()
            .ok_or_else(|| StoreError::Unavailable(self.unavailable_reason.clone()))
    }

    /// Current value of the last-run marker cell.
    pub async fn read_marker(&self) -> Result<String, StoreError> {
        self.backend()?
            .read_cell(layout::marker_region())
            .await
            .map_err(StoreError::ReadFailed)
    }

    /// Read the whole report into a snapshot. An empty sheet is an empty
    /// snapshot, not an error.
    pub async fn read_snapshot(&self) -> Result<Snapshot, StoreError> {
        let grid = self
            .backend()?
            .read_grid(ROW_OFFSET)
            .await
            .map_err(StoreError::ReadFailed)?;
        let snapshot = parse_snapshot(&grid);
        debug!(
            rows = snapshot.rows().len(),
            followers = snapshot.followers().len(),
            "Read snapshot"
        );
        Ok(snapshot)
    }

    pub async fn write(&self, plan: &WritePlan) -> Result<(), StoreError> {
        self.backend()?
            .batch_write(plan.ops())
            .await
            .map_err(StoreError::WriteFailed)
    }

    pub async fn clear(&self, range: Region) -> Result<(), StoreError> {
        self.backend()?
            .batch_clear(&[range])
            .await
            .map_err(StoreError::ClearFailed)
    }
}

/// Parse grid rows (starting at the first data row) into a snapshot.
///
/// A row is recorded when its id cell is non-blank. Follower counts are
/// collected from their column independently of the id column.
pub fn parse_snapshot(grid: &[Vec<String>]) -> Snapshot {
    let width = layout::GRID_WIDTH as usize;
    let mut snapshot = Snapshot::new();

    for raw in grid {
        let mut cells = raw.clone();
        if cells.len() < width {
            cells.resize(width, String::new());
        }

        let id = &cells[col_index(ID_COL)];
        if !id.is_empty() {
            let mut row = SnapshotRow::new(
                PostId::new(id.clone()),
                CellValue::text(&cells[col_index(DATE_COL)]),
                CellValue::text(&cells[col_index(TITLE_COL)]),
            );
            for bucket in Bucket::ALL {
                let start = col_index(layout::bucket_start_col(bucket));
                let window = &cells[start..start + METRIC_SLOTS];
                if let Some(values) = parse_bucket_window(window) {
                    if values.iter().any(|v| matches!(v, CellValue::Text(_))) {
                        warn!(post_id = %id, bucket = %bucket, "Non-numeric metric kept verbatim");
                    }
                    row.set_bucket(bucket, values);
                }
            }
            snapshot.insert_row(row);
        }

        let follower = &cells[col_index(FOLLOWER_COL)];
        if !follower.is_empty() {
            match follower.trim().parse::<i64>() {
                Ok(count) => snapshot.push_follower_count(count),
                Err(_) => warn!("Skipping non-numeric follower count {:?}", follower),
            }
        }
    }

    snapshot
}
