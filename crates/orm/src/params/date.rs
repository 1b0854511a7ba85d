//! Date operand parsing for date-valued filters

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Parse a date operand into a UTC timestamp.
///
/// Accepts RFC 3339 / W3C strings, `YYYY-MM-DD[ HH:MM[:SS]]` (read as UTC),
/// bare dates (midnight UTC) and unix timestamps in seconds.
pub fn parse_date(input: &str) -> Option<DateTime<Utc>> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(input) {
        return Some(parsed.with_timezone(&Utc));
    }

    for format in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, format) {
            return Some(naive.and_utc());
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
    }

    if input.bytes().all(|b| b.is_ascii_digit()) {
        return input
            .parse::<i64>()
            .ok()
            .and_then(|secs| Utc.timestamp_opt(secs, 0).single());
    }

    None
}

/// Format a timestamp the way date filters expect to read it back
pub fn format_w3c(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(chrono::SecondsFormat::Secs, false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_rfc3339_with_offset_is_normalized_to_utc() {
        let parsed = parse_date("2018-04-01T10:00:00+02:00").unwrap();
        assert_eq!(parsed.hour(), 8);
    }

    #[test]
    fn test_bare_date_is_midnight_utc() {
        let parsed = parse_date("2018-04-01").unwrap();
        assert_eq!(parsed.to_rfc3339(), "2018-04-01T00:00:00+00:00");
    }

    #[test]
    fn test_database_format_and_timestamp() {
        assert!(parse_date("2018-04-01 13:45:00").is_some());
        assert_eq!(parse_date("0").unwrap().timestamp(), 0);
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(parse_date("last tuesday").is_none());
        assert!(parse_date("").is_none());
    }

    #[test]
    fn test_w3c_round_trip() {
        let value = parse_date("2020-01-02T03:04:05Z").unwrap();
        assert_eq!(format_w3c(&value), "2020-01-02T03:04:05+00:00");
        assert_eq!(parse_date(&format_w3c(&value)), Some(value));
    }
}
