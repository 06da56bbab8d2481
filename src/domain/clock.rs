//! Report clock: "now" at the fixed source-local offset.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, Utc};
use std::fmt;
use std::sync::Arc;

/// How far back the upstream fetch reaches.
pub const LOOKBACK_DAYS: i64 = 40;

/// Clock pinned to a fixed UTC offset with an injectable time source.
#[derive(Clone)]
pub struct ReportClock {
    offset: FixedOffset,
    now: Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>,
}

impl ReportClock {
    /// Wall clock at the given offset.
    pub fn system(offset: FixedOffset) -> Self {
        Self {
            offset,
            now: Arc::new(Utc::now),
        }
    }

    /// Clock frozen at `at`.
    pub fn fixed(offset: FixedOffset, at: DateTime<Utc>) -> Self {
        Self {
            offset,
            now: Arc::new(move || at),
        }
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    pub fn now(&self) -> DateTime<Utc> {
        (self.now)()
    }

    /// Calendar day at the report offset.
    pub fn today(&self) -> NaiveDate {
        self.now().with_timezone(&self.offset).date_naive()
    }

    /// Earliest publication time the upstream fetch asks for: the local wall
    /// clock read as UTC, minus the lookback window.
    pub fn lookback_start(&self) -> DateTime<Utc> {
        self.now() + Duration::seconds(i64::from(self.offset.local_minus_utc()))
            - Duration::days(LOOKBACK_DAYS)
    }
}

impl fmt::Debug for ReportClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReportClock")
            .field("offset", &self.offset)
            .finish_non_exhaustive()
    }
}
