//! Recency classifier: post age in whole days to bucket.

use crate::domain::Bucket;
use chrono::NaiveDate;

/// Bucket windows as inclusive day ranges.
const WEEK1: (i64, i64) = (7, 13);
const WEEK2: (i64, i64) = (14, 29);
const MONTH: (i64, i64) = (30, 40);

/// Whole days between publication and `today`.
pub fn age_in_days(posted_on: NaiveDate, today: NaiveDate) -> i64 {
    (today - posted_on).num_days()
}

/// Bucket for a post of the given age, `None` when too new or expired.
pub fn classify_age(age_days: i64) -> Option<Bucket> {
    let within = |(lo, hi): (i64, i64)| (lo..=hi).contains(&age_days);
    if within(WEEK1) {
        Some(Bucket::Week1)
    } else if within(WEEK2) {
        Some(Bucket::Week2)
    } else if within(MONTH) {
        Some(Bucket::Month)
    } else {
        None
    }
}

/// Bucket for a post published on `posted_on`, evaluated on `today`.
pub fn classify(posted_on: NaiveDate, today: NaiveDate) -> Option<Bucket> {
    classify_age(age_in_days(posted_on, today))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundaries() {
        let cases = [
            (6, None),
            (7, Some(Bucket::Week1)),
            (13, Some(Bucket::Week1)),
            (14, Some(Bucket::Week2)),
            (29, Some(Bucket::Week2)),
            (30, Some(Bucket::Month)),
            (40, Some(Bucket::Month)),
            (41, None),
        ];
        for (age, expected) in cases {
            assert_eq!(classify_age(age), expected, "age {}", age);
        }
    }

    #[test]
    fn test_every_age_in_range() {
        for age in -5..=60 {
            let expected = match age {
                7..=13 => Some(Bucket::Week1),
                14..=29 => Some(Bucket::Week2),
                30..=40 => Some(Bucket::Month),
                _ => None,
            };
            assert_eq!(classify_age(age), expected, "age {}", age);
        }
    }

    #[test]
    fn test_classify_from_dates() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        let posted = NaiveDate::from_ymd_opt(2026, 10, 6).unwrap();
        assert_eq!(age_in_days(posted, today), 10);
        assert_eq!(classify(posted, today), Some(Bucket::Week1));

        // crosses a month boundary
        let posted = NaiveDate::from_ymd_opt(2026, 9, 6).unwrap();
        assert_eq!(classify(posted, today), Some(Bucket::Month));
        let posted = NaiveDate::from_ymd_opt(2026, 9, 5).unwrap();
        assert_eq!(classify(posted, today), None);
    }

    #[test]
    fn test_future_post_is_unclassified() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        let posted = NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();
        assert_eq!(classify(posted, today), None);
    }
}
