//! Spreadsheet destination: transport backends and the snapshot store that
//! sits on top of them.

use crate::engine::{Region, WriteOp};
use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

pub mod google;
pub mod memory;
pub mod store;

pub use google::GoogleSheetsClient;
pub use memory::MemorySheet;
pub use store::{parse_snapshot, SnapshotStore, StoreError};

#[derive(Debug, Error)]
pub enum SheetError {
    #[error("auth error: {0}")]
    Auth(String),
    #[error("http error: {0}")]
    Http(String),
    #[error("unexpected http status {status}: {message}")]
    HttpStatus { status: u16, message: String },
    #[error("response parse error: {0}")]
    Parse(String),
}

/// Rectangular-grid store addressed by row/column regions.
#[async_trait]
pub trait SheetBackend: Send + Sync + fmt::Debug {
    /// Rows from `first_row` down to the last non-empty row, columns A..Z,
    /// formulas returned as their source text. Trailing blank cells of a row
    /// may be omitted.
    async fn read_grid(&self, first_row: u32) -> Result<Vec<Vec<String>>, SheetError>;

    /// Displayed value of a single cell, empty string when blank.
    async fn read_cell(&self, cell: Region) -> Result<String, SheetError>;

    /// Write every block in one batch. Strings are parsed as if typed by a
    /// user, so formula text becomes a live formula.
    async fn batch_write(&self, ops: &[WriteOp]) -> Result<(), SheetError>;

    /// Blank every cell in the given regions.
    async fn batch_clear(&self, ranges: &[Region]) -> Result<(), SheetError>;
}
