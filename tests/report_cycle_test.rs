//! Multi-day report cycles against an in-memory sheet.

use chrono::{FixedOffset, NaiveDate, TimeZone, Utc};
use insightsync::datasource::MockDataSource;
use insightsync::domain::{Bucket, Metric, Metrics, Post, PostId, ReportClock};
use insightsync::orchestration::{GuardOutcome, ReportRunner, RunSummary};
use insightsync::sheet::{MemorySheet, SnapshotStore};
use std::sync::Arc;

fn clock_on(y: i32, m: u32, d: u32) -> ReportClock {
    // 15:00 UTC is 10:00 at UTC-5, same calendar day
    ReportClock::fixed(
        FixedOffset::west_opt(5 * 3600).unwrap(),
        Utc.with_ymd_and_hms(y, m, d, 15, 0, 0).unwrap(),
    )
}

fn post(id: &str, posted_on: NaiveDate, likes: i64) -> Post {
    Post::new(
        PostId::from(id),
        posted_on,
        format!("https://www.instagram.com/p/{}/", id),
        Some("caption"),
        Metrics::new().with(Metric::Likes, likes),
    )
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

async fn run_day(
    sheet: &Arc<MemorySheet>,
    source: MockDataSource,
    day: ReportClock,
) -> GuardOutcome<RunSummary> {
    let runner = ReportRunner::new(
        Some(Arc::new(source)),
        SnapshotStore::new(sheet.clone()),
        day,
    );
    runner.batch_update().await.unwrap()
}

#[tokio::test]
async fn test_post_moves_through_buckets_then_archives() {
    let sheet = Arc::new(MemorySheet::new());
    let posted = date(2026, 10, 6);

    // day one: 10 days old, week-one bucket
    let src = MockDataSource::new()
        .with_post(post("a", posted, 9))
        .with_follower_count(100);
    assert!(run_day(&sheet, src, clock_on(2026, 10, 16)).await.ran());
    assert_eq!(sheet.cell(5, 5).await, "9");
    assert_eq!(sheet.cell(5, 12).await, "");
    assert_eq!(sheet.cell(5, 25).await, "100");

    // day two: 18 days old, week-two bucket, week-one value carried forward
    let src = MockDataSource::new()
        .with_post(post("a", posted, 20))
        .with_follower_count(150);
    assert!(run_day(&sheet, src, clock_on(2026, 10, 24)).await.ran());
    assert_eq!(sheet.cell(5, 1).await, "a");
    assert_eq!(sheet.cell(5, 5).await, "9");
    assert_eq!(sheet.cell(5, 12).await, "20");
    assert_eq!(sheet.cell(5, 25).await, "150");
    assert_eq!(sheet.cell(6, 25).await, "100");
    assert_eq!(sheet.cell(5, 26).await, "2026/10/24");

    // day three: "a" left the fetch window; "b" takes the top row
    let src = MockDataSource::new()
        .with_post(post("b", date(2026, 11, 10), 4))
        .with_follower_count(200);
    let GuardOutcome::Ran(summary) = run_day(&sheet, src, clock_on(2026, 11, 20)).await else {
        panic!("expected the refresh to run");
    };
    assert_eq!(summary.plan.fresh_rows, 1);
    assert_eq!(summary.plan.archived_rows, 1);

    assert_eq!(sheet.cell(5, 1).await, "b");
    assert_eq!(sheet.cell(5, 5).await, "4");
    // "a" used to hold week two on this row
    assert_eq!(sheet.cell(5, 12).await, "");

    let archived = sheet.row(6).await;
    assert_eq!(archived[0], "a");
    assert_eq!(archived[1], "2026/10/6");
    assert_eq!(
        archived[2],
        "=HYPERLINK(\"https://www.instagram.com/p/a/\",\"caption\")"
    );
    assert_eq!(archived[4], "9");
    assert_eq!(archived[11], "20");
    assert!(archived[17..24].iter().all(String::is_empty));

    assert_eq!(sheet.cell(5, 25).await, "200");
    assert_eq!(sheet.cell(6, 25).await, "150");
    assert_eq!(sheet.cell(7, 25).await, "100");

    // day four: "b" keeps only its own history
    let src = MockDataSource::new()
        .with_post(post("b", date(2026, 11, 10), 5))
        .with_follower_count(210);
    assert!(run_day(&sheet, src, clock_on(2026, 11, 21)).await.ran());
    let snapshot = SnapshotStore::new(sheet.clone()).read_snapshot().await.unwrap();
    let b = snapshot.get(&PostId::from("b")).unwrap();
    assert!(b.bucket(Bucket::Week2).is_none());
    assert!(b.bucket(Bucket::Month).is_none());
    assert_eq!(sheet.cell(5, 5).await, "5");
    assert_eq!(sheet.cell(6, 12).await, "20");
}

#[tokio::test]
async fn test_archived_holes_survive_repeated_runs() {
    let sheet = Arc::new(
        MemorySheet::new()
            .with_row(
                5,
                &[
                    "old", "2026/9/20", "t", "", "", "", "", "", "", "", "2", "", "0", "", "400",
                    "12",
                ],
            )
            .with_cell(5, 25, "90")
            .with_cell(5, 26, "2026/10/15"),
    );

    for (day, followers) in [(16, 91), (17, 92)] {
        let src = MockDataSource::new()
            .with_post(post("new", date(2026, 10, 5), 1))
            .with_follower_count(followers);
        assert!(run_day(&sheet, src, clock_on(2026, 10, day)).await.ran());
    }

    let archived = sheet.row(6).await;
    assert_eq!(archived[0], "old");
    assert_eq!(&archived[10..17], &["2", "", "0", "", "400", "12", ""]);
    assert_eq!(sheet.cell(5, 25).await, "92");
    assert_eq!(sheet.cell(6, 25).await, "91");
    assert_eq!(sheet.cell(7, 25).await, "90");
}

#[tokio::test]
async fn test_young_and_stale_posts_are_not_written() {
    let sheet = Arc::new(MemorySheet::new());
    let src = MockDataSource::new().with_posts(vec![
        post("young", date(2026, 10, 14), 1),
        post("kept", date(2026, 10, 1), 2),
        post("stale", date(2026, 9, 1), 3),
    ]);

    let GuardOutcome::Ran(summary) = run_day(&sheet, src, clock_on(2026, 10, 16)).await else {
        panic!("expected the refresh to run");
    };
    assert_eq!(summary.plan.dropped_posts, 2);
    assert_eq!(sheet.cell(5, 1).await, "kept");
    assert_eq!(sheet.cell(5, 12).await, "2");
    assert_eq!(sheet.cell(6, 1).await, "");
}
