use crate::datasource::{DataSourceError, MediaSource};
use crate::domain::{format_report_date, ReportClock, Snapshot};
use crate::engine::layout;
use crate::engine::{PlanSummary, Reconciler};
use crate::orchestration::guard::{run_once_per_period, GuardOutcome, GuardPolicy};
use crate::sheet::{SnapshotStore, StoreError};
use chrono::NaiveDate;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};

/// Drives one report refresh or clear from start to finish.
#[derive(Clone)]
pub struct ReportRunner {
    source: Option<Arc<dyn MediaSource>>,
    store: SnapshotStore,
    clock: ReportClock,
}

/// What a completed refresh did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub plan: PlanSummary,
    pub writes: usize,
    /// The snapshot could not be read and the plan was built without it.
    pub snapshot_read_failed: bool,
}

#[derive(Debug, Error)]
pub enum RunError {
    #[error("upstream unavailable: {0}")]
    Upstream(#[from] DataSourceError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ReportRunner {
    /// `source` is `None` when upstream credentials were not configured.
    pub fn new(
        source: Option<Arc<dyn MediaSource>>,
        store: SnapshotStore,
        clock: ReportClock,
    ) -> Self {
        Self {
            source,
            store,
            clock,
        }
    }

    pub fn source_available(&self) -> bool {
        self.source.is_some()
    }

    pub fn store_available(&self) -> bool {
        self.store.is_available()
    }

    /// Fetch, reconcile and write the report, at most once per report day.
    pub async fn batch_update(&self) -> Result<GuardOutcome<RunSummary>, RunError> {
        let today = self.clock.today();
        let marker = self.store.read_marker().await?;
        let policy = GuardPolicy::OncePerDay {
            today: format_report_date(today),
        };
        run_once_per_period(&policy, &marker, || self.refresh(today)).await
    }

    /// Blank the whole report range unless it is already empty.
    pub async fn clear_all(&self) -> Result<GuardOutcome<()>, RunError> {
        let marker = self.store.read_marker().await?;
        run_once_per_period(&GuardPolicy::ClearWhenPopulated, &marker, || async {
            self.store.clear(layout::full_range()).await?;
            info!("Cleared report range {}", layout::full_range());
            Ok::<(), RunError>(())
        })
        .await
    }

    async fn refresh(&self, today: NaiveDate) -> Result<RunSummary, RunError> {
        let source = self
            .source
            .as_ref()
            .ok_or_else(|| DataSourceError::NotConfigured("ACCESS_TOKEN/USER_ID".to_string()))?;

        let fetched = match source.fetch_recent_posts(self.clock.lookback_start()).await {
            Ok(fetched) => fetched,
            Err(e) => {
                warn!(error = %e, "Upstream fetch failed, nothing written");
                return Err(e.into());
            }
        };
        info!(
            posts = fetched.posts.len(),
            follower_count = fetched.follower_count,
            "Fetched recent media"
        );

        let (snapshot, snapshot_read_failed) = match self.store.read_snapshot().await {
            Ok(snapshot) => (snapshot, false),
            Err(StoreError::Unavailable(reason)) => {
                return Err(StoreError::Unavailable(reason).into())
            }
            Err(e) => {
                error!(error = %e, "Snapshot read failed, reconciling against an empty snapshot");
                (Snapshot::new(), true)
            }
        };

        let plan =
            Reconciler::new(today).reconcile(&fetched.posts, fetched.follower_count, &snapshot);
        let summary = plan.summary();
        info!(
            fresh_rows = summary.fresh_rows,
            archived_rows = summary.archived_rows,
            dropped_posts = summary.dropped_posts,
            writes = plan.len(),
            "Built write plan"
        );

        self.store.write(&plan).await?;

        Ok(RunSummary {
            plan: summary,
            writes: plan.len(),
            snapshot_read_failed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datasource::MockDataSource;
    use crate::domain::{Metric, Metrics, Post, PostId};
    use crate::sheet::MemorySheet;
    use chrono::{FixedOffset, TimeZone, Utc};

    fn clock() -> ReportClock {
        ReportClock::fixed(
            FixedOffset::west_opt(5 * 3600).unwrap(),
            Utc.with_ymd_and_hms(2026, 10, 16, 15, 0, 0).unwrap(),
        )
    }

    fn post(id: &str, posted_on: (i32, u32, u32)) -> Post {
        Post::new(
            PostId::from(id),
            NaiveDate::from_ymd_opt(posted_on.0, posted_on.1, posted_on.2).unwrap(),
            format!("https://www.instagram.com/p/{}/", id),
            Some("a caption"),
            Metrics::new().with(Metric::Likes, 9),
        )
    }

    fn runner(source: MockDataSource, sheet: Arc<MemorySheet>) -> ReportRunner {
        ReportRunner::new(
            Some(Arc::new(source)),
            SnapshotStore::new(sheet),
            clock(),
        )
    }

    #[tokio::test]
    async fn test_marker_today_means_no_store_writes() {
        let sheet = Arc::new(MemorySheet::new().with_cell(5, 26, "2026/10/16"));
        let source = MockDataSource::new().with_post(post("a", (2026, 10, 6)));
        let r = runner(source.clone(), sheet.clone());

        let outcome = r.batch_update().await.unwrap();
        assert!(!outcome.ran());
        assert_eq!(sheet.write_calls(), 0);
        assert_eq!(source.fetch_count(), 0);
    }

    #[tokio::test]
    async fn test_blank_marker_means_no_clear() {
        let sheet = Arc::new(MemorySheet::new());
        let r = runner(MockDataSource::new(), sheet.clone());

        let outcome = r.clear_all().await.unwrap();
        assert!(!outcome.ran());
        assert_eq!(sheet.clear_calls(), 0);
    }

    #[tokio::test]
    async fn test_refresh_writes_and_sets_marker() {
        let sheet = Arc::new(MemorySheet::new());
        let source = MockDataSource::new()
            .with_post(post("a", (2026, 10, 6)))
            .with_follower_count(321);
        let r = runner(source, sheet.clone());

        let outcome = r.batch_update().await.unwrap();
        let GuardOutcome::Ran(summary) = outcome else {
            panic!("expected the refresh to run");
        };
        assert_eq!(summary.plan.fresh_rows, 1);
        assert!(!summary.snapshot_read_failed);
        assert_eq!(sheet.write_calls(), 1);
        assert_eq!(sheet.cell(5, 1).await, "a");
        assert_eq!(sheet.cell(5, 5).await, "9");
        assert_eq!(sheet.cell(5, 25).await, "321");
        assert_eq!(sheet.cell(5, 26).await, "2026/10/16");

        // second call the same day is a no-op
        let again = r.batch_update().await.unwrap();
        assert!(!again.ran());
        assert_eq!(sheet.write_calls(), 1);
    }

    #[tokio::test]
    async fn test_upstream_failure_writes_nothing() {
        let sheet = Arc::new(MemorySheet::new());
        let source = MockDataSource::failing(DataSourceError::HttpError {
            status: 400,
            message: "bad token".to_string(),
        });
        let r = runner(source, sheet.clone());

        let err = r.batch_update().await.unwrap_err();
        assert!(matches!(err, RunError::Upstream(_)));
        assert_eq!(sheet.write_calls(), 0);
    }

    #[tokio::test]
    async fn test_missing_source_is_upstream_error() {
        let sheet = Arc::new(MemorySheet::new());
        let r = ReportRunner::new(None, SnapshotStore::new(sheet.clone()), clock());
        let err = r.batch_update().await.unwrap_err();
        assert!(matches!(err, RunError::Upstream(DataSourceError::NotConfigured(_))));
        assert_eq!(sheet.write_calls(), 0);
    }

    #[tokio::test]
    async fn test_snapshot_read_failure_continues_empty() {
        let sheet = Arc::new(MemorySheet::new().with_row(5, &["old", "2026/9/1", "t", "1"]));
        sheet.set_fail_grid_reads(true);
        let source = MockDataSource::new().with_post(post("a", (2026, 10, 6)));
        let r = runner(source, sheet.clone());

        let GuardOutcome::Ran(summary) = r.batch_update().await.unwrap() else {
            panic!("expected the refresh to run");
        };
        assert!(summary.snapshot_read_failed);
        assert_eq!(summary.plan.archived_rows, 0);
        assert_eq!(sheet.cell(5, 1).await, "a");
    }

    #[tokio::test]
    async fn test_marker_read_failure_aborts() {
        let sheet = Arc::new(MemorySheet::new());
        sheet.set_fail_cell_reads(true);
        let source = MockDataSource::new();
        let r = runner(source.clone(), sheet.clone());

        let err = r.batch_update().await.unwrap_err();
        assert!(matches!(err, RunError::Store(StoreError::ReadFailed(_))));
        assert_eq!(source.fetch_count(), 0);
    }

    #[tokio::test]
    async fn test_unavailable_store_fails_before_fetch() {
        let source = MockDataSource::new();
        let r = ReportRunner::new(
            Some(Arc::new(source.clone())),
            SnapshotStore::unavailable("WORKSHEET_ID missing"),
            clock(),
        );
        let err = r.batch_update().await.unwrap_err();
        assert!(matches!(err, RunError::Store(StoreError::Unavailable(_))));
        assert_eq!(source.fetch_count(), 0);
        assert!(matches!(
            r.clear_all().await.unwrap_err(),
            RunError::Store(StoreError::Unavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_clear_removes_report() {
        let sheet = Arc::new(
            MemorySheet::new()
                .with_row(1, &["Post insights"])
                .with_row(5, &["a", "2026/10/6", "t"])
                .with_cell(5, 26, "2026/10/15"),
        );
        let r = runner(MockDataSource::new(), sheet.clone());

        assert!(r.clear_all().await.unwrap().ran());
        assert_eq!(sheet.clear_calls(), 1);
        assert_eq!(sheet.cell(5, 1).await, "");
        assert_eq!(sheet.cell(5, 26).await, "");
        assert_eq!(sheet.cell(1, 1).await, "Post insights");

        assert!(!r.clear_all().await.unwrap().ran());
        assert_eq!(sheet.clear_calls(), 1);
    }
}
