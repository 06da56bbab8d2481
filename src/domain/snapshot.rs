//! In-memory image of the report grid.

use super::cell::{BucketValues, CellValue};
use super::{Bucket, PostId};
use std::collections::HashMap;

/// One recorded post row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotRow {
    pub id: PostId,
    /// Date cell exactly as stored (may be a serial number once the grid has
    /// parsed it).
    pub date: CellValue,
    /// Title cell in formula form.
    pub title: CellValue,
    buckets: [Option<BucketValues>; 3],
}

impl SnapshotRow {
    pub fn new(id: PostId, date: CellValue, title: CellValue) -> Self {
        Self {
            id,
            date,
            title,
            buckets: [None, None, None],
        }
    }

    pub fn with_bucket(mut self, bucket: Bucket, values: BucketValues) -> Self {
        self.set_bucket(bucket, values);
        self
    }

    pub fn set_bucket(&mut self, bucket: Bucket, values: BucketValues) {
        self.buckets[bucket.ordinal()] = Some(values);
    }

    pub fn bucket(&self, bucket: Bucket) -> Option<&BucketValues> {
        self.buckets[bucket.ordinal()].as_ref()
    }

    /// Populated buckets in grid order.
    pub fn buckets(&self) -> impl Iterator<Item = (Bucket, &BucketValues)> {
        Bucket::ALL
            .into_iter()
            .filter_map(move |b| self.bucket(b).map(|v| (b, v)))
    }
}

/// Full report state: rows keyed by post id in grid order, plus the
/// follower-count history (newest first).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    rows: Vec<SnapshotRow>,
    index: HashMap<PostId, usize>,
    followers: Vec<i64>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a row. A repeated id keeps its first position and takes the
    /// newer content.
    pub fn insert_row(&mut self, row: SnapshotRow) {
        match self.index.get(&row.id) {
            Some(&pos) => self.rows[pos] = row,
            None => {
                self.index.insert(row.id.clone(), self.rows.len());
                self.rows.push(row);
            }
        }
    }

    pub fn with_row(mut self, row: SnapshotRow) -> Self {
        self.insert_row(row);
        self
    }

    pub fn push_follower_count(&mut self, count: i64) {
        self.followers.push(count);
    }

    pub fn with_followers(mut self, counts: Vec<i64>) -> Self {
        self.followers = counts;
        self
    }

    pub fn get(&self, id: &PostId) -> Option<&SnapshotRow> {
        self.index.get(id).map(|&pos| &self.rows[pos])
    }

    pub fn rows(&self) -> &[SnapshotRow] {
        &self.rows
    }

    pub fn followers(&self) -> &[i64] {
        &self.followers
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() && self.followers.is_empty()
    }
}
