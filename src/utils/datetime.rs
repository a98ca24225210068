//! Datetime parsing for CSV cell coercion and storage round-trips
//!
//! The journey exports carry naive ISO 8601 timestamps without a zone
//! suffix; ledger rows written by SQLite come back in either RFC3339 or
//! the `YYYY-MM-DD HH:MM:SS` form. Everything is normalized to UTC.

use chrono::{DateTime, NaiveDateTime, Utc};

/// Parse a timestamp from the formats seen across the pipeline.
///
/// Accepted, in order of preference:
/// - RFC3339 with zone or offset: `2021-05-31T23:57:25Z`
/// - Naive ISO 8601 (assumed UTC): `2021-05-31T23:57:25`
/// - SQLite datetime (assumed UTC): `2021-05-31 23:57:25`
pub fn parse_flexible(input: &str) -> Option<DateTime<Utc>> {
    let input = input.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt.and_utc());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(input, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.and_utc());
    }

    None
}

/// Format a timestamp for database storage
pub fn format_for_storage(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parses_naive_iso_as_utc() {
        let dt = parse_flexible("2021-05-31T23:57:25").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2021, 5, 31, 23, 57, 25).unwrap());
    }

    #[test]
    fn parses_rfc3339_with_offset() {
        let dt = parse_flexible("2021-05-31T23:57:25+02:00").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2021, 5, 31, 21, 57, 25).unwrap());
    }

    #[test]
    fn parses_sqlite_format() {
        let dt = parse_flexible("2021-05-31 23:57:25").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2021, 5, 31, 23, 57, 25).unwrap());
    }

    #[test]
    fn rejects_plain_dates_and_numbers() {
        assert!(parse_flexible("2021").is_none());
        assert!(parse_flexible("500").is_none());
        assert!(parse_flexible("not a date").is_none());
    }

    #[test]
    fn storage_round_trip() {
        let dt = Utc.with_ymd_and_hms(2021, 5, 31, 23, 57, 25).unwrap();
        assert_eq!(parse_flexible(&format_for_storage(&dt)), Some(dt));
    }
}
