pub mod guard;
pub mod runner;

pub use guard::{run_once_per_period, GuardDecision, GuardOutcome, GuardPolicy, SkipReason};
pub use runner::{ReportRunner, RunError, RunSummary};
