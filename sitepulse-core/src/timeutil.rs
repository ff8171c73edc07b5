//! Epoch-millisecond calendar helpers
//!
//! All day boundaries are computed in UTC. The epoch itself falls on a UTC
//! midnight, so flooring to a day boundary is plain modular arithmetic and a
//! 7-day step in milliseconds always lands on another day boundary — there
//! is no DST transition to correct for.

use chrono::{DateTime, NaiveDate, Utc};

/// One hour in milliseconds.
pub const HOUR_MS: i64 = 60 * 60 * 1000;

/// One day in milliseconds.
pub const DAY_MS: i64 = 24 * HOUR_MS;

/// One week in milliseconds.
pub const WEEK_MS: i64 = 7 * DAY_MS;

/// Floor an epoch-ms timestamp to the start of its UTC calendar day.
///
/// Saturates at `i64::MIN` instead of overflowing when the floor would fall
/// below the representable range.
pub fn start_of_day_ms(ms: i64) -> i64 {
    ms.checked_sub(ms.rem_euclid(DAY_MS)).unwrap_or(i64::MIN)
}

/// Render an epoch-ms timestamp as a `YYYY-MM-DD` UTC date string.
pub fn format_date(ms: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(ms)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// The UTC calendar date an epoch-ms timestamp falls on.
pub fn date_of(ms: i64) -> Option<NaiveDate> {
    DateTime::<Utc>::from_timestamp_millis(ms).map(|dt| dt.date_naive())
}

/// Epoch-ms bounds `[start, end)` of one hour of a UTC calendar day.
pub fn day_hour_window(day: NaiveDate, hour: u32) -> (i64, i64) {
    let day_start = day
        .and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp_millis())
        .unwrap_or(0);
    let start = day_start + i64::from(hour) * HOUR_MS;
    (start, start + HOUR_MS)
}
