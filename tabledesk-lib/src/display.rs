//! Date display for calendar-day columns.
//!
//! Date columns are stored as a bare calendar day (`2024-01-15`) or as
//! midnight UTC (`2024-01-15T00:00:00Z`). Shifting such a value into a viewer
//! west of UTC lands on the previous evening, and adding the viewer's offset
//! back cancels that shift exactly. So the day shown is the stored UTC day
//! for every viewer, and no viewer offset is involved.

use chrono::DateTime;
use chrono::NaiveDate;
use chrono::NaiveDateTime;
use chrono::Utc;

use crate::model::Value;

/// Display format: short weekday, then month/day/year without padding.
pub const DATE_FORMAT: &str = "%a, %-m/%-d/%Y";

/// Calendar-day format used for input text and exports.
pub const ISO_DAY_FORMAT: &str = "%Y-%m-%d";

/// Parses a stored date string.
///
/// Accepts RFC 3339 timestamps, naive `YYYY-MM-DDTHH:MM:SS` timestamps
/// (taken as UTC), and bare `YYYY-MM-DD` days (midnight UTC).
pub fn parse_stored_date(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(s, ISO_DAY_FORMAT)
        .ok()
        .and_then(|day| day.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Parses a date column value, if it holds one.
pub fn date_value(value: &Value) -> Option<DateTime<Utc>> {
    value.as_str().and_then(parse_stored_date)
}

/// Formats a stored date, e.g. `Mon, 1/15/2024`.
pub fn format_date(stored: DateTime<Utc>) -> String {
    stored.naive_utc().format(DATE_FORMAT).to_string()
}

/// Formats a stored date as its calendar day, `YYYY-MM-DD`.
pub fn format_day(stored: DateTime<Utc>) -> String {
    stored.naive_utc().format(ISO_DAY_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    #[test]
    fn test_midnight_utc_keeps_day() {
        let stored = parse_stored_date("2024-01-15T00:00:00Z").unwrap();
        assert_eq!(format_date(stored), "Mon, 1/15/2024");
    }

    #[test]
    fn test_shift_and_add_back_is_identity() {
        // a viewer at -300 sees the previous evening; adding the offset back
        // returns to the stored day
        let stored = parse_stored_date("2024-01-15T00:00:00Z").unwrap();
        for minutes in [-720, -300, 0, 330, 540, 840] {
            let offset = FixedOffset::east_opt(minutes * 60).unwrap();
            let shifted = stored.with_timezone(&offset).naive_local();
            let restored = shifted - chrono::TimeDelta::seconds(offset.local_minus_utc() as i64);
            assert_eq!(restored.format(DATE_FORMAT).to_string(), format_date(stored));
        }
    }

    #[test]
    fn test_bare_day() {
        let stored = parse_stored_date("2024-03-01").unwrap();
        assert_eq!(format_date(stored), "Fri, 3/1/2024");
        assert_eq!(format_day(stored), "2024-03-01");
    }

    #[test]
    fn test_offset_timestamp_normalized_to_utc() {
        let stored = parse_stored_date("2024-12-31T00:00:00+00:00").unwrap();
        assert_eq!(format_date(stored), "Tue, 12/31/2024");
        let stored = parse_stored_date("2024-06-02 00:00:00").unwrap();
        assert_eq!(format_day(stored), "2024-06-02");
    }

    #[test]
    fn test_unparseable() {
        assert!(parse_stored_date("next tuesday").is_none());
        assert!(date_value(&Value::Int(3)).is_none());
    }
}
