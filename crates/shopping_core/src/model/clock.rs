//! Time conversions between storage (epoch ms, ISO dates) and chrono types.

use chrono::{DateTime, NaiveDate, Utc};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Current UTC time in epoch milliseconds.
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Current UTC calendar date.
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Converts stored epoch milliseconds back into a UTC timestamp.
///
/// Out-of-range values collapse to the unix epoch instead of panicking.
pub fn ms_to_datetime(ms: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(ms).unwrap_or_default()
}

/// Epoch milliseconds at 00:00 UTC of `date`.
pub fn day_start_ms(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .map_or(i64::MIN, |start| start.and_utc().timestamp_millis())
}

/// Epoch milliseconds at 00:00 UTC of the day after `date`.
pub fn next_day_start_ms(date: NaiveDate) -> i64 {
    date.succ_opt().map_or(i64::MAX, day_start_ms)
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).ok()
}
