//! Hourly grid helpers shared by the generators.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Timelike, Weekday};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TimelineError {
    #[error("invalid timestamp '{0}': expected YYYY-MM-DD[ HH:MM[:SS]]")]
    InvalidTimestamp(String),
}

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Every hour from `start` to `end`, both inclusive.
///
/// The grid is anchored on `start`, so an unaligned start produces unaligned
/// grid points. An `end` before `start` yields an empty grid.
pub fn hours_between(start: NaiveDateTime, end: NaiveDateTime) -> Vec<NaiveDateTime> {
    let mut hours = Vec::new();
    let mut ts = start;
    while ts <= end {
        hours.push(ts);
        ts += Duration::hours(1);
    }
    hours
}

/// Truncate a timestamp to the start of its hour.
pub fn floor_to_hour(ts: NaiveDateTime) -> NaiveDateTime {
    ts.date()
        .and_hms_opt(ts.hour(), 0, 0)
        .unwrap_or(ts)
}

/// Day of week with Monday = 0 and Sunday = 6.
pub fn day_index(ts: NaiveDateTime) -> u32 {
    ts.weekday().num_days_from_monday()
}

pub fn is_weekend(day: Weekday) -> bool {
    matches!(day, Weekday::Sat | Weekday::Sun)
}

/// Parse a command-line timestamp. A bare date means midnight.
pub fn parse_timestamp(input: &str) -> Result<NaiveDateTime, TimelineError> {
    let trimmed = input.trim();
    for fmt in DATETIME_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Ok(ts);
        }
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| TimelineError::InvalidTimestamp(input.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(s: &str) -> NaiveDateTime {
        parse_timestamp(s).unwrap()
    }

    #[test]
    fn test_grid_is_inclusive() {
        let hours = hours_between(ts("2024-01-01 00:00"), ts("2024-01-01 03:00"));
        assert_eq!(hours.len(), 4);
        assert_eq!(hours[3], ts("2024-01-01 03:00"));
    }

    #[test]
    fn test_single_point_grid() {
        let start = ts("2024-01-01 17:00");
        assert_eq!(hours_between(start, start), vec![start]);
    }

    #[test]
    fn test_reversed_range_is_empty() {
        assert!(hours_between(ts("2024-01-02"), ts("2024-01-01")).is_empty());
    }

    #[test]
    fn test_floor_and_day_index() {
        let t = ts("2024-01-05 16:42:13");
        assert_eq!(floor_to_hour(t), ts("2024-01-05 16:00"));
        // 2024-01-05 is a Friday
        assert_eq!(day_index(t), 4);
        assert!(is_weekend(ts("2024-01-06").weekday()));
    }

    #[test]
    fn test_parse_variants() {
        assert_eq!(ts("2024-03-01"), ts("2024-03-01 00:00:00"));
        assert_eq!(ts("2024-03-01T08:30"), ts("2024-03-01 08:30:00"));
        assert!(matches!(
            parse_timestamp("yesterday"),
            Err(TimelineError::InvalidTimestamp(_))
        ));
    }
}
