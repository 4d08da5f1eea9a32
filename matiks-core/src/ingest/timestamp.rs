//! Permissive timestamp parsing for dataset cells.
//!
//! A cell that matches none of the accepted layouts yields `None`; callers
//! decide what a missing timestamp means for the row.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Date-and-time layouts, tried in order.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Date-only layouts, interpreted as midnight.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// Parse a timestamp cell, returning `None` when it is blank or unparseable.
///
/// Offsets (RFC 3339) are normalized to UTC and then dropped, so every
/// timestamp in a dataset lives on the same naive timeline.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_utc());
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd_hms(y: i32, m: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    #[test]
    fn test_parse_date_only() {
        assert_eq!(parse_timestamp("2024-03-15"), Some(ymd_hms(2024, 3, 15, 0, 0, 0)));
        assert_eq!(parse_timestamp("2024/03/15"), Some(ymd_hms(2024, 3, 15, 0, 0, 0)));
        assert_eq!(parse_timestamp("03/15/2024"), Some(ymd_hms(2024, 3, 15, 0, 0, 0)));
    }

    #[test]
    fn test_parse_date_time() {
        assert_eq!(
            parse_timestamp(" 2024-03-15 08:30:05 "),
            Some(ymd_hms(2024, 3, 15, 8, 30, 5))
        );
        assert_eq!(
            parse_timestamp("2024-03-15T08:30"),
            Some(ymd_hms(2024, 3, 15, 8, 30, 0))
        );
    }

    #[test]
    fn test_parse_rfc3339_normalizes_to_utc() {
        assert_eq!(
            parse_timestamp("2024-03-15T08:30:00+02:00"),
            Some(ymd_hms(2024, 3, 15, 6, 30, 0))
        );
    }

    #[test]
    fn test_unparseable_is_none() {
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("   "), None);
        assert_eq!(parse_timestamp("not a date"), None);
        assert_eq!(parse_timestamp("2024-13-45"), None);
        assert_eq!(parse_timestamp("NaT"), None);
    }
}
