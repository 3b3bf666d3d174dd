//! HTTP-date formatting and lenient parsing
//!
//! Dates are always written in the fixed `GMT` form. Parsing accepts the
//! same form with or without a trailing zone token, and drops anything after
//! a `;` (some clients append `; length=...` to If-Modified-Since).

use chrono::{DateTime, NaiveDateTime, Utc};
use std::time::SystemTime;

const TIMESTAMP_FORMAT: &str = "%a, %d %b %Y %H:%M:%S";

/// Format an instant as an HTTP-date, e.g. `Wed, 21 Oct 2015 07:28:00 GMT`
pub fn format_http_date(instant: DateTime<Utc>) -> String {
    format!("{} GMT", instant.format(TIMESTAMP_FORMAT))
}

/// Format a filesystem timestamp as an HTTP-date
pub fn format_system_time(time: SystemTime) -> String {
    format_http_date(DateTime::<Utc>::from(time))
}

/// Format milliseconds since the epoch as an HTTP-date
pub fn format_millis(millis: i64) -> Option<String> {
    DateTime::<Utc>::from_timestamp_millis(millis).map(format_http_date)
}

/// Parse an HTTP-date, returning `None` for anything malformed
pub fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.split(';').next()?.trim();

    let timestamp = match value.rsplit_once(' ') {
        Some((head, zone)) if !zone.is_empty() && zone.chars().all(|c| c.is_ascii_alphabetic()) => {
            head.trim_end()
        }
        _ => value,
    };

    NaiveDateTime::parse_from_str(timestamp, TIMESTAMP_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_http_date() {
        let instant = Utc.with_ymd_and_hms(2015, 10, 21, 7, 28, 0).unwrap();
        assert_eq!(format_http_date(instant), "Wed, 21 Oct 2015 07:28:00 GMT");
    }

    #[test]
    fn test_format_millis() {
        assert_eq!(
            format_millis(1_445_412_480_000).as_deref(),
            Some("Wed, 21 Oct 2015 07:28:00 GMT")
        );
    }

    #[test]
    fn test_parse_with_zone() {
        let parsed = parse_http_date("Wed, 21 Oct 2015 07:28:00 GMT").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2015, 10, 21, 7, 28, 0).unwrap());
    }

    #[test]
    fn test_parse_without_zone() {
        assert!(parse_http_date("Wed, 21 Oct 2015 07:28:00").is_some());
    }

    #[test]
    fn test_parse_with_length_suffix() {
        let parsed = parse_http_date("Wed, 21 Oct 2015 07:28:00 GMT; length=1024");
        assert_eq!(
            parsed,
            Some(Utc.with_ymd_and_hms(2015, 10, 21, 7, 28, 0).unwrap())
        );
    }

    #[test]
    fn test_parse_malformed_is_none() {
        assert!(parse_http_date("yesterday").is_none());
        assert!(parse_http_date("").is_none());
        assert!(parse_http_date("Wed, 32 Oct 2015 07:28:00 GMT").is_none());
    }

    #[test]
    fn test_round_trip_through_system_time() {
        let instant = Utc.with_ymd_and_hms(2020, 2, 29, 23, 59, 59).unwrap();
        let formatted = format_system_time(SystemTime::from(instant));
        assert_eq!(parse_http_date(&formatted), Some(instant));
    }
}
