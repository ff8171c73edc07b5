//! Day and hour distinct-session aggregators
//!
//! Both aggregators count distinct `session_id` values rather than raw
//! events, and both take an explicit `as_of` instant instead of reading the
//! clock, keeping them deterministic for testing.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::error::Result;
use crate::store::EventStore;
use crate::timeutil::{format_date, start_of_day_ms, DAY_MS};
use crate::types::{DaySessionCount, HourSessionCount};

/// Distinct sessions per UTC calendar day for a trailing 7-day window.
///
/// `offset` is the number of days back from `as_of`: the window covers the
/// 7 calendar days ending at `start_of_day(as_of - (offset - 1) days)`
/// (exclusive). Day boundaries are midnight-to-midnight UTC, not rolling
/// 24-hour periods.
///
/// Output is ordered chronologically ascending and sparse: a day with no
/// events contributes no entry, so callers treat missing days as zero.
pub fn sessions_by_day(
    store: &dyn EventStore,
    offset: i64,
    as_of: DateTime<Utc>,
) -> Result<Vec<DaySessionCount>> {
    // Saturating arithmetic: an absurd offset yields an empty window at the
    // edge of the representable range rather than an overflow panic.
    let back = offset.saturating_sub(1).saturating_mul(DAY_MS);
    let window_end = start_of_day_ms(as_of.timestamp_millis().saturating_sub(back));
    let window_start = window_end.saturating_sub(7 * DAY_MS);

    let events = store.fetch_all_events()?;

    // BTreeMap keyed by YYYY-MM-DD gives chronological order for free
    let mut sessions_per_day: BTreeMap<String, HashSet<String>> = BTreeMap::new();
    for event in events {
        if event.date >= window_start && event.date < window_end {
            sessions_per_day
                .entry(format_date(event.date))
                .or_default()
                .insert(event.session_id);
        }
    }

    Ok(sessions_per_day
        .into_iter()
        .map(|(date, sessions)| DaySessionCount {
            date,
            count: sessions.len(),
        })
        .collect())
}

/// Distinct sessions for each of the 24 hours of a single day.
///
/// `offset` is the number of days back from `as_of` (0 = the `as_of` day).
/// Unlike the day aggregator the output is dense: always exactly 24 entries
/// labeled `"00:00"` through `"23:00"` in order, zero counts included. The
/// per-hour session lists come from the store and may contain duplicates;
/// deduplication happens here.
pub fn sessions_by_hour(
    store: &dyn EventStore,
    offset: i64,
    as_of: DateTime<Utc>,
) -> Result<Vec<HourSessionCount>> {
    // An offset too large for the calendar clamps to the range edge, where
    // no events can exist, instead of panicking inside chrono.
    let day = Duration::try_days(offset)
        .and_then(|back| as_of.checked_sub_signed(back))
        .map(|dt| dt.date_naive())
        .unwrap_or(if offset > 0 {
            NaiveDate::MIN
        } else {
            NaiveDate::MAX
        });

    let mut buckets = Vec::with_capacity(24);
    for hour in 0..24 {
        let ids = store.session_ids_for_hour(day, hour)?;
        let distinct: HashSet<String> = ids.into_iter().collect();
        buckets.push(HourSessionCount {
            hour: format!("{:02}:00", hour),
            count: distinct.len(),
        });
    }
    Ok(buckets)
}
