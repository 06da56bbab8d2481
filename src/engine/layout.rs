//! Grid layout: where each piece of a report row lives.
//!
//! Rows and columns are 1-based. Data rows start at [`ROW_OFFSET`]; a row
//! index handed to this module is the 0-based dense position below that.

use crate::domain::{Bucket, METRIC_SLOTS};
use std::fmt;

/// First data row.
pub const ROW_OFFSET: u32 = 5;
/// Last row covered by a full clear.
pub const ROW_MAX: u32 = 120;

pub const ID_COL: u32 = 1;
pub const DATE_COL: u32 = 2;
pub const TITLE_COL: u32 = 3;
/// First column of the week1 block; week2 and month follow contiguously.
pub const FIRST_BUCKET_COL: u32 = 4;
pub const FOLLOWER_COL: u32 = 25;
pub const MARKER_COL: u32 = 26;
/// Width of the grid the report occupies (A..=Z).
pub const GRID_WIDTH: u32 = MARKER_COL;

/// Rectangular block of cells, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Region {
    pub start_row: u32,
    pub start_col: u32,
    pub end_row: u32,
    pub end_col: u32,
}

impl Region {
    pub fn cell(row: u32, col: u32) -> Self {
        Self {
            start_row: row,
            start_col: col,
            end_row: row,
            end_col: col,
        }
    }

    pub fn row_span(row: u32, start_col: u32, end_col: u32) -> Self {
        Self {
            start_row: row,
            start_col,
            end_row: row,
            end_col,
        }
    }

    pub fn width(&self) -> u32 {
        self.end_col - self.start_col + 1
    }

    pub fn is_single_cell(&self) -> bool {
        self.start_row == self.end_row && self.start_col == self.end_col
    }

    /// A1 notation, e.g. `D5:J5` or `Z5`.
    pub fn to_a1(&self) -> String {
        let start = format!("{}{}", column_letters(self.start_col), self.start_row);
        if self.is_single_cell() {
            start
        } else {
            format!(
                "{}:{}{}",
                start,
                column_letters(self.end_col),
                self.end_row
            )
        }
    }

    /// A1 notation qualified with a sheet name: `'Tab'!D5:J5`.
    pub fn qualified(&self, sheet: &str) -> String {
        format!("'{}'!{}", sheet.replace('\'', "''"), self.to_a1())
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_a1())
    }
}

/// Spreadsheet column letters for a 1-based column (1 → A, 27 → AA).
pub fn column_letters(mut col: u32) -> String {
    let mut out = Vec::new();
    while col > 0 {
        let rem = (col - 1) % 26;
        out.push(b'A' + rem as u8);
        col = (col - 1) / 26;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

/// Grid row for a dense 0-based row index.
pub fn grid_row(row_index: usize) -> u32 {
    row_index as u32 + ROW_OFFSET
}

/// First column of a bucket's seven-wide block.
pub fn bucket_start_col(bucket: Bucket) -> u32 {
    FIRST_BUCKET_COL + (bucket.ordinal() * METRIC_SLOTS) as u32
}

/// Seven-wide metric block for `bucket` on the given row.
pub fn bucket_region(row_index: usize, bucket: Bucket) -> Region {
    let start = bucket_start_col(bucket);
    Region::row_span(grid_row(row_index), start, start + METRIC_SLOTS as u32 - 1)
}

/// id/date/title block on the given row.
pub fn metadata_region(row_index: usize) -> Region {
    Region::row_span(grid_row(row_index), ID_COL, TITLE_COL)
}

/// Follower-count cell for the `slot`-th historical fetch (0 = newest).
pub fn follower_region(slot: usize) -> Region {
    Region::cell(grid_row(slot), FOLLOWER_COL)
}

/// Last-run marker cell.
pub fn marker_region() -> Region {
    Region::cell(ROW_OFFSET, MARKER_COL)
}

/// Everything a clear removes.
pub fn full_range() -> Region {
    Region {
        start_row: ROW_OFFSET,
        start_col: ID_COL,
        end_row: ROW_MAX,
        end_col: GRID_WIDTH,
    }
}

/// 0-based offset of a column inside a row read starting at column A.
pub fn col_index(col: u32) -> usize {
    (col - 1) as usize
}
