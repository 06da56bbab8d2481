//! In-memory sheet for tests and local runs.

use super::{SheetBackend, SheetError};
use crate::engine::layout::GRID_WIDTH;
use crate::engine::{Region, WriteOp};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::Mutex;

/// Sparse grid of raw cell text keyed by (row, col), 1-based.
///
/// Writes store the rendered text of each value, so formulas read back as
/// their source the way a formula-preserving read would.
#[derive(Debug, Default)]
pub struct MemorySheet {
    cells: Mutex<BTreeMap<(u32, u32), String>>,
    write_calls: AtomicUsize,
    clear_calls: AtomicUsize,
    fail_grid_reads: AtomicBool,
    fail_cell_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl MemorySheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a row starting at column A.
    pub fn with_row(mut self, row: u32, values: &[&str]) -> Self {
        let cells = self.cells.get_mut();
        for (i, value) in values.iter().enumerate() {
            if !value.is_empty() {
                cells.insert((row, i as u32 + 1), value.to_string());
            }
        }
        self
    }

    /// Seed a single cell.
    pub fn with_cell(mut self, row: u32, col: u32, value: &str) -> Self {
        self.cells.get_mut().insert((row, col), value.to_string());
        self
    }

    pub async fn cell(&self, row: u32, col: u32) -> String {
        self.cells
            .lock()
            .await
            .get(&(row, col))
            .cloned()
            .unwrap_or_default()
    }

    /// Cells of one row from column A through Z.
    pub async fn row(&self, row: u32) -> Vec<String> {
        let cells = self.cells.lock().await;
        (1..=GRID_WIDTH)
            .map(|col| cells.get(&(row, col)).cloned().unwrap_or_default())
            .collect()
    }

    pub async fn is_blank(&self) -> bool {
        self.cells.lock().await.is_empty()
    }

    pub fn write_calls(&self) -> usize {
        self.write_calls.load(Ordering::SeqCst)
    }

    pub fn clear_calls(&self) -> usize {
        self.clear_calls.load(Ordering::SeqCst)
    }

    pub fn set_fail_grid_reads(&self, fail: bool) {
        self.fail_grid_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_cell_reads(&self, fail: bool) {
        self.fail_cell_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn unavailable() -> SheetError {
        SheetError::HttpStatus {
            status: 503,
            message: "memory sheet set to fail".to_string(),
        }
    }
}

#[async_trait]
impl SheetBackend for MemorySheet {
    async fn read_grid(&self, first_row: u32) -> Result<Vec<Vec<String>>, SheetError> {
        if self.fail_grid_reads.load(Ordering::SeqCst) {
            return Err(Self::unavailable());
        }
        let cells = self.cells.lock().await;
        let Some(last_row) = cells
            .keys()
            .filter(|(row, col)| *row >= first_row && *col <= GRID_WIDTH)
            .map(|(row, _)| *row)
            .max()
        else {
            return Ok(Vec::new());
        };

        let grid = (first_row..=last_row)
            .map(|row| {
                let mut values: Vec<String> = (1..=GRID_WIDTH)
                    .map(|col| cells.get(&(row, col)).cloned().unwrap_or_default())
                    .collect();
                while values.last().is_some_and(|v| v.is_empty()) {
                    values.pop();
                }
                values
            })
            .collect();
        Ok(grid)
    }

    async fn read_cell(&self, cell: Region) -> Result<String, SheetError> {
        if self.fail_cell_reads.load(Ordering::SeqCst) {
            return Err(Self::unavailable());
        }
        Ok(self.cell(cell.start_row, cell.start_col).await)
    }

    async fn batch_write(&self, ops: &[WriteOp]) -> Result<(), SheetError> {
        self.write_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Self::unavailable());
        }
        let mut cells = self.cells.lock().await;
        for op in ops {
            for (r, row) in op.values.iter().enumerate() {
                for (c, value) in row.iter().enumerate() {
                    let key = (op.region.start_row + r as u32, op.region.start_col + c as u32);
                    let text = value.render();
                    if text.is_empty() {
                        cells.remove(&key);
                    } else {
                        cells.insert(key, text);
                    }
                }
            }
        }
        Ok(())
    }

    async fn batch_clear(&self, ranges: &[Region]) -> Result<(), SheetError> {
        self.clear_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Self::unavailable());
        }
        let mut cells = self.cells.lock().await;
        for range in ranges {
            cells.retain(|(row, col), _| {
                !((range.start_row..=range.end_row).contains(row)
                    && (range.start_col..=range.end_col).contains(col))
            });
        }
        Ok(())
    }
}
