//! Local calendar-date helpers.
//!
//! Every date in the tracker is a wall-clock calendar date with no time zone
//! attached. `"2024-03-01"` always means March 1 on the user's calendar, so
//! parsing goes straight to [`NaiveDate`] and never through a UTC instant.

use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};

/// Storage format for calendar dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a stored date string as a local calendar date.
///
/// Accepts `YYYY-MM-DD` (zero padding optional) and tolerates a trailing
/// time component (`2024-03-01T09:30:00Z`), of which only the calendar part
/// is kept. Returns `None` for anything else.
pub fn parse_local_date(raw: &str) -> Option<NaiveDate> {
    let day_part = raw.trim().split(['T', ' ']).next()?;
    NaiveDate::parse_from_str(day_part, DATE_FORMAT).ok()
}

/// Format a calendar date for storage.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Local midnight at the start of `date`.
pub fn start_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

/// Fractional hours from `from` to `to` (negative when `to` is earlier).
pub fn hours_between(from: NaiveDateTime, to: NaiveDateTime) -> f64 {
    (to - from).num_milliseconds() as f64 / 3_600_000.0
}

/// Whole calendar days from `from` to `to`.
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

/// Current local wall-clock time.
pub fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Today's local calendar date.
pub fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_iso_date_is_calendar_date() {
        let date = parse_local_date("2024-03-01").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
    }

    #[test]
    fn test_parse_ignores_time_component() {
        // A late-evening UTC timestamp must not roll over into another day
        let date = parse_local_date("2024-03-01T23:30:00-08:00").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());

        let date = parse_local_date("2024-03-01T00:00:00.000Z").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
    }

    #[test]
    fn test_parse_unpadded() {
        let date = parse_local_date("2024-3-1").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse_local_date(""), None);
        assert_eq!(parse_local_date("not a date"), None);
        assert_eq!(parse_local_date("2024-02-30"), None);
        assert_eq!(parse_local_date("2024-13-01"), None);
        assert_eq!(parse_local_date("2024-03"), None);
        assert_eq!(parse_local_date("2024-03-01-05"), None);
    }

    #[test]
    fn test_format_round_trip() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 8).unwrap();
        assert_eq!(format_date(date), "2024-01-08");
        assert_eq!(parse_local_date(&format_date(date)), Some(date));
    }

    #[test]
    fn test_hours_and_days_between() {
        let a = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let b = NaiveDate::from_ymd_opt(2024, 1, 3).unwrap();
        assert_eq!(days_between(a, b), 2);
        assert_eq!(days_between(b, a), -2);
        assert!((hours_between(start_of_day(a), start_of_day(b)) - 48.0).abs() < 1e-9);
        assert!((hours_between(start_of_day(b), start_of_day(a)) + 48.0).abs() < 1e-9);
    }
}
