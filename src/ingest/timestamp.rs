//! Permissive timestamp parsing for uploaded tables.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

const DATETIME_FORMATS: [&str; 7] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// Parse one timestamp cell, accepting the formats uploads commonly use.
///
/// Returns `None` for anything unparseable; callers drop those rows rather
/// than failing the whole table. Naive timestamps are taken as UTC,
/// date-only cells as midnight.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return Some(date.and_hms_opt(0, 0, 0)?.and_utc());
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parses_common_datetime_shapes() {
        let expected = Utc.with_ymd_and_hms(2024, 1, 2, 13, 30, 0).unwrap();

        assert_eq!(parse_timestamp("2024-01-02 13:30:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-02T13:30:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-02T13:30:00Z"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-02 13:30"), Some(expected));
        assert_eq!(parse_timestamp("2024/01/02 13:30:00"), Some(expected));
        assert_eq!(parse_timestamp("01/02/2024 13:30"), Some(expected));
    }

    #[test]
    fn date_only_becomes_midnight() {
        let expected = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();

        assert_eq!(parse_timestamp("2024-01-02"), Some(expected));
        assert_eq!(parse_timestamp("01/02/2024"), Some(expected));
    }

    #[test]
    fn offset_timestamps_convert_to_utc() {
        let parsed = parse_timestamp("2024-01-02T13:30:00+02:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 1, 2, 11, 30, 0).unwrap());
    }

    #[test]
    fn garbage_is_none() {
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("not a date"), None);
        assert_eq!(parse_timestamp("42.5"), None);
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        assert!(parse_timestamp("  2024-01-02 13:30:00  ").is_some());
    }
}
