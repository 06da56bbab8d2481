//! Reconciliation of a fresh fetch against the recorded report.
//!
//! Produces the full set of targeted cell writes for one run. Writes only
//! touch the regions they name, so every bucket that must survive is
//! re-emitted from the snapshot: carry-forward for live posts, full replay
//! for archived ones.

use super::layout::{self, Region, ROW_MAX};
use super::recency;
use crate::domain::{
    format_report_date, Bucket, CellValue, Post, PostId, Snapshot, SnapshotRow, METRIC_SLOTS,
};
use chrono::NaiveDate;
use std::collections::HashSet;
use tracing::{debug, warn};

/// What a single write in the plan represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteKind {
    /// id/date/title block.
    Metadata,
    /// Freshly fetched metrics for the post's current bucket.
    Fresh(Bucket),
    /// Previously recorded bucket values re-emitted unchanged.
    CarryForward(Bucket),
    /// Bucket the row holds no values for; blanked so a reused row keeps
    /// nothing from its previous occupant.
    Blank(Bucket),
    /// One follower-count history cell.
    Follower,
    /// Last-run marker.
    Marker,
}

/// A block of values destined for one region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOp {
    pub region: Region,
    pub values: Vec<Vec<CellValue>>,
    pub kind: WriteKind,
}

impl WriteOp {
    fn row(region: Region, values: Vec<CellValue>, kind: WriteKind) -> Self {
        Self {
            region,
            values: vec![values],
            kind,
        }
    }
}

/// Counts describing a plan, for logging and responses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlanSummary {
    pub fresh_rows: usize,
    pub archived_rows: usize,
    pub dropped_posts: usize,
    pub follower_slots: usize,
}

impl PlanSummary {
    pub fn total_rows(&self) -> usize {
        self.fresh_rows + self.archived_rows
    }
}

/// Ordered writes for one run. All entries are independent of each other.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WritePlan {
    ops: Vec<WriteOp>,
    summary: PlanSummary,
}

impl WritePlan {
    pub fn ops(&self) -> &[WriteOp] {
        &self.ops
    }

    pub fn summary(&self) -> PlanSummary {
        self.summary
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Writes targeting the given dense row index (metadata and buckets).
    pub fn ops_for_row(&self, row_index: usize) -> impl Iterator<Item = &WriteOp> {
        let row = layout::grid_row(row_index);
        self.ops.iter().filter(move |op| {
            op.region.start_row == row
                && matches!(
                    op.kind,
                    WriteKind::Metadata
                        | WriteKind::Fresh(_)
                        | WriteKind::CarryForward(_)
                        | WriteKind::Blank(_)
                )
        })
    }

    fn push(&mut self, op: WriteOp) {
        self.ops.push(op);
    }
}

/// Builds write plans for a given report day.
#[derive(Debug, Clone, Copy)]
pub struct Reconciler {
    today: NaiveDate,
}

impl Reconciler {
    pub fn new(today: NaiveDate) -> Self {
        Self { today }
    }

    /// Merge a fetch into the recorded state.
    ///
    /// Kept fresh posts take dense rows first in input order; archived posts
    /// (recorded but no longer fetched) follow in their recorded order.
    pub fn reconcile(
        &self,
        posts: &[Post],
        follower_count: i64,
        snapshot: &Snapshot,
    ) -> WritePlan {
        let mut plan = WritePlan::default();

        let fetched_ids: HashSet<&PostId> = posts.iter().map(|p| &p.id).collect();
        let archived: Vec<&SnapshotRow> = snapshot
            .rows()
            .iter()
            .filter(|row| !fetched_ids.contains(&row.id))
            .collect();

        let mut row_index = 0usize;

        for post in posts {
            let Some(bucket) = recency::classify(post.posted_on, self.today) else {
                debug!(
                    post_id = %post.id,
                    age_days = recency::age_in_days(post.posted_on, self.today),
                    "Post outside every bucket window, skipping"
                );
                plan.summary.dropped_posts += 1;
                continue;
            };

            self.plan_fresh_row(&mut plan, row_index, bucket, post, snapshot.get(&post.id));
            plan.summary.fresh_rows += 1;
            row_index += 1;
        }

        for row in archived {
            plan_archived_row(&mut plan, row_index, row);
            plan.summary.archived_rows += 1;
            row_index += 1;
        }

        if row_index > 0 && layout::grid_row(row_index - 1) > ROW_MAX {
            warn!(
                rows = row_index,
                row_max = ROW_MAX,
                "Report extends past the cleared range"
            );
        }

        let history = std::iter::once(follower_count).chain(snapshot.followers().iter().copied());
        for (slot, count) in history.enumerate() {
            plan.push(WriteOp::row(
                layout::follower_region(slot),
                vec![CellValue::Int(count)],
                WriteKind::Follower,
            ));
            plan.summary.follower_slots += 1;
        }

        plan.push(WriteOp::row(
            layout::marker_region(),
            vec![CellValue::Text(format_report_date(self.today))],
            WriteKind::Marker,
        ));

        plan
    }

    fn plan_fresh_row(
        &self,
        plan: &mut WritePlan,
        row_index: usize,
        bucket: Bucket,
        post: &Post,
        recorded: Option<&SnapshotRow>,
    ) {
        plan.push(WriteOp::row(
            layout::metadata_region(row_index),
            vec![
                CellValue::Text(post.id.to_string()),
                CellValue::Text(format_report_date(post.posted_on)),
                CellValue::Text(post.title_formula()),
            ],
            WriteKind::Metadata,
        ));

        let mut populated = [false; 3];
        let fresh_region = layout::bucket_region(row_index, bucket);
        if let Some(recorded) = recorded {
            for (old_bucket, values) in recorded.buckets() {
                let region = layout::bucket_region(row_index, old_bucket);
                if region != fresh_region {
                    plan.push(WriteOp::row(
                        region,
                        values.to_vec(),
                        WriteKind::CarryForward(old_bucket),
                    ));
                    populated[old_bucket.ordinal()] = true;
                }
            }
        }

        plan.push(WriteOp::row(
            fresh_region,
            post.metrics.to_bucket_values().to_vec(),
            WriteKind::Fresh(bucket),
        ));
        populated[bucket.ordinal()] = true;

        plan_blank_buckets(plan, row_index, populated);
    }
}

fn plan_archived_row(plan: &mut WritePlan, row_index: usize, row: &SnapshotRow) {
    plan.push(WriteOp::row(
        layout::metadata_region(row_index),
        vec![
            CellValue::Text(row.id.to_string()),
            row.date.clone(),
            row.title.clone(),
        ],
        WriteKind::Metadata,
    ));

    let mut populated = [false; 3];
    for (bucket, values) in row.buckets() {
        plan.push(WriteOp::row(
            layout::bucket_region(row_index, bucket),
            values.to_vec(),
            WriteKind::CarryForward(bucket),
        ));
        populated[bucket.ordinal()] = true;
    }

    plan_blank_buckets(plan, row_index, populated);
}

fn plan_blank_buckets(plan: &mut WritePlan, row_index: usize, populated: [bool; 3]) {
    for bucket in Bucket::ALL {
        if !populated[bucket.ordinal()] {
            plan.push(WriteOp::row(
                layout::bucket_region(row_index, bucket),
                vec![CellValue::Blank; METRIC_SLOTS],
                WriteKind::Blank(bucket),
            ));
        }
    }
}
