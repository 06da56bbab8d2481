//! Pure computation: bucket classification, grid layout, and reconciliation
//! of a fetch into a write plan. Nothing here performs I/O.

pub mod layout;
pub mod recency;
pub mod reconcile;

pub use layout::{Region, ROW_MAX, ROW_OFFSET};
pub use recency::classify;
pub use reconcile::{PlanSummary, Reconciler, WriteKind, WriteOp, WritePlan};
