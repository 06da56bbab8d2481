//! Once-per-period guard around write and clear actions.
//!
//! The marker cell holds the date of the last successful run. A write is
//! skipped when the marker already shows today; a clear is skipped when the
//! marker is blank (nothing to clear). This is a comparison, not a lock: two
//! callers that both read the marker before either writes will both proceed.

use std::future::Future;

/// What the guard decided for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Proceed,
    Skip(SkipReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The marker already carries this date.
    AlreadyRanToday(String),
    /// The marker is blank; the sheet holds no report.
    AlreadyEmpty,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::AlreadyRanToday(date) => write!(f, "already ran for {}", date),
            SkipReason::AlreadyEmpty => write!(f, "sheet already empty"),
        }
    }
}

/// Which action the marker is guarding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardPolicy {
    /// Run at most once per report day; carries today's formatted date.
    OncePerDay { today: String },
    /// Clear only when something was written.
    ClearWhenPopulated,
}

impl GuardPolicy {
    pub fn evaluate(&self, marker: &str) -> GuardDecision {
        match self {
            GuardPolicy::OncePerDay { today } if marker == today => {
                GuardDecision::Skip(SkipReason::AlreadyRanToday(today.clone()))
            }
            GuardPolicy::ClearWhenPopulated if marker.is_empty() => {
                GuardDecision::Skip(SkipReason::AlreadyEmpty)
            }
            _ => GuardDecision::Proceed,
        }
    }
}

/// Result of a guarded action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome<T> {
    Ran(T),
    Skipped(SkipReason),
}

impl<T> GuardOutcome<T> {
    pub fn ran(&self) -> bool {
        matches!(self, GuardOutcome::Ran(_))
    }
}

/// Evaluate `policy` against `marker` and run `action` only when allowed.
pub async fn run_once_per_period<A, Fut, T, E>(
    policy: &GuardPolicy,
    marker: &str,
    action: A,
) -> Result<GuardOutcome<T>, E>
where
    A: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    match policy.evaluate(marker) {
        GuardDecision::Skip(reason) => {
            tracing::info!(marker, %reason, "Guard skipped action");
            Ok(GuardOutcome::Skipped(reason))
        }
        GuardDecision::Proceed => action().await.map(GuardOutcome::Ran),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn today() -> GuardPolicy {
        GuardPolicy::OncePerDay {
            today: "2026/10/16".to_string(),
        }
    }

    #[test]
    fn test_once_per_day() {
        assert_eq!(
            today().evaluate("2026/10/16"),
            GuardDecision::Skip(SkipReason::AlreadyRanToday("2026/10/16".to_string()))
        );
        assert_eq!(today().evaluate("2026/10/15"), GuardDecision::Proceed);
        assert_eq!(today().evaluate(""), GuardDecision::Proceed);
    }

    #[test]
    fn test_clear_when_populated() {
        let policy = GuardPolicy::ClearWhenPopulated;
        assert_eq!(
            policy.evaluate(""),
            GuardDecision::Skip(SkipReason::AlreadyEmpty)
        );
        assert_eq!(policy.evaluate("2026/10/16"), GuardDecision::Proceed);
    }

    #[tokio::test]
    async fn test_action_runs_at_most_once_for_unchanged_marker() {
        let runs = Cell::new(0);
        let mut marker = "2026/10/15".to_string();

        for _ in 0..2 {
            let outcome: GuardOutcome<()> = run_once_per_period(&today(), &marker, || async {
                runs.set(runs.get() + 1);
                Ok::<_, ()>(())
            })
            .await
            .unwrap();
            if outcome.ran() {
                marker = "2026/10/16".to_string();
            }
        }

        assert_eq!(runs.get(), 1);
    }

    #[tokio::test]
    async fn test_action_error_propagates() {
        let result: Result<GuardOutcome<()>, &str> =
            run_once_per_period(&GuardPolicy::ClearWhenPopulated, "x", || async { Err("boom") })
                .await;
        assert_eq!(result, Err("boom"));
    }

    #[tokio::test]
    async fn test_skip_never_invokes_action() {
        let runs = Cell::new(0);
        let outcome = run_once_per_period(&GuardPolicy::ClearWhenPopulated, "", || async {
            runs.set(runs.get() + 1);
            Ok::<(), ()>(())
        })
        .await
        .unwrap();
        assert_eq!(outcome, GuardOutcome::Skipped(SkipReason::AlreadyEmpty));
        assert_eq!(runs.get(), 0);
    }
}
