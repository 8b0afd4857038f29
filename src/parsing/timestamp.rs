//! Timestamp parsing against an ordered list of accepted formats.
//!
//! Formats are `chrono` strftime patterns, plus three keywords:
//!
//! - `rfc3339`: `2024-01-01T09:00:00Z`, `2024-01-01T09:00:00+02:00`
//! - `rfc2822`: `Mon, 01 Jan 2024 09:00:00 +0000`
//! - `unix`: integer seconds (or milliseconds when 13+ digits)
//!
//! Patterns that carry an offset (`%z`, `%:z`) are honored; everything else
//! is read as UTC. Date-only patterns resolve to midnight.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Accepted formats when no configuration overrides them.
///
/// The export tool's own ISO forms come first, then common fallbacks.
pub const DEFAULT_TIMESTAMP_FORMATS: &[&str] = &[
    "rfc3339",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.fZ",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %I:%M %p",
    "%m/%d/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M",
];

/// Returns [`DEFAULT_TIMESTAMP_FORMATS`] as owned strings.
pub fn default_timestamp_formats() -> Vec<String> {
    DEFAULT_TIMESTAMP_FORMATS
        .iter()
        .map(|f| (*f).to_string())
        .collect()
}

/// Parses `input` with the first format in `formats` that accepts it.
///
/// Returns `None` if none does; callers treat that as "timestamp absent".
///
/// # Example
///
/// ```rust
/// use chataudit::parsing::{parse_timestamp, default_timestamp_formats};
///
/// let formats = default_timestamp_formats();
/// let ts = parse_timestamp("2024-01-01T09:00", &formats).unwrap();
/// assert_eq!(ts.to_rfc3339(), "2024-01-01T09:00:00+00:00");
/// assert!(parse_timestamp("yesterday", &formats).is_none());
/// ```
pub fn parse_timestamp<S: AsRef<str>>(input: &str, formats: &[S]) -> Option<DateTime<Utc>> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    formats
        .iter()
        .find_map(|format| parse_with(input, format.as_ref()))
}

fn parse_with(input: &str, format: &str) -> Option<DateTime<Utc>> {
    match format {
        "rfc3339" => DateTime::parse_from_rfc3339(input)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        "rfc2822" => DateTime::parse_from_rfc2822(input)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        "unix" => parse_unix(input),
        pattern => {
            if let Ok(dt) = DateTime::parse_from_str(input, pattern) {
                return Some(dt.with_timezone(&Utc));
            }
            if let Ok(naive) = NaiveDateTime::parse_from_str(input, pattern) {
                return Some(naive.and_utc());
            }
            NaiveDate::parse_from_str(input, pattern)
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
                .map(|naive| naive.and_utc())
        }
    }
}

fn parse_unix(input: &str) -> Option<DateTime<Utc>> {
    if !input.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let value: i64 = input.parse().ok()?;
    if input.len() >= 13 {
        DateTime::from_timestamp_millis(value)
    } else {
        DateTime::from_timestamp(value, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn defaults() -> Vec<String> {
        default_timestamp_formats()
    }

    #[test]
    fn test_native_iso_forms() {
        let expected = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
        for input in [
            "2024-01-01T09:00",
            "2024-01-01T09:00:00",
            "2024-01-01T09:00:00Z",
            "2024-01-01T09:00:00.000Z",
            "2024-01-01 09:00:00",
            "2024-01-01 09:00",
            "2024-01-01T10:00:00+01:00",
        ] {
            assert_eq!(parse_timestamp(input, &defaults()), Some(expected), "{input}");
        }
    }

    #[test]
    fn test_us_twelve_hour_clock() {
        let ts = parse_timestamp("01/15/2024 02:30:00 PM", &defaults()).unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 1, 15, 14, 30, 0).unwrap());
    }

    #[test]
    fn test_order_decides_ambiguous_dates() {
        let us_first = ["%m/%d/%Y %H:%M:%S", "%d/%m/%Y %H:%M:%S"];
        let eu_first = ["%d/%m/%Y %H:%M:%S", "%m/%d/%Y %H:%M:%S"];
        let a = parse_timestamp("03/04/2024 10:00:00", &us_first).unwrap();
        let b = parse_timestamp("03/04/2024 10:00:00", &eu_first).unwrap();
        assert_eq!(a, Utc.with_ymd_and_hms(2024, 3, 4, 10, 0, 0).unwrap());
        assert_eq!(b, Utc.with_ymd_and_hms(2024, 4, 3, 10, 0, 0).unwrap());
    }

    #[test]
    fn test_keywords() {
        let ts = parse_timestamp("1704099600", &["unix"]).unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap());
        let ms = parse_timestamp("1704099600000", &["unix"]).unwrap();
        assert_eq!(ms, ts);
        let rfc = parse_timestamp("Mon, 01 Jan 2024 09:00:00 +0000", &["rfc2822"]).unwrap();
        assert_eq!(rfc, ts);
    }

    #[test]
    fn test_date_only_is_midnight() {
        let ts = parse_timestamp("2024-02-29", &["%Y-%m-%d"]).unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 2, 29, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_unparsable_is_none() {
        assert!(parse_timestamp("", &defaults()).is_none());
        assert!(parse_timestamp("   ", &defaults()).is_none());
        assert!(parse_timestamp("last Tuesday", &defaults()).is_none());
        assert!(parse_timestamp("2024-13-45 99:99", &defaults()).is_none());
    }
}
