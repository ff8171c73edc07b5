//! Weekly retention cohort engine
//!
//! Partitions signup events into 7-day cohorts starting at a caller-chosen
//! "day zero" and, for every elapsed week since each cohort signed up,
//! computes the percentage of that cohort still producing events. A
//! cross-cohort summary row aggregates the per-week percentages weighted by
//! cohort size.
//!
//! All week boundaries are UTC day boundaries stepped in exact 7-day
//! increments, so no daylight-saving correction ever applies.

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::numeric::{round2, safe_div};
use crate::store::EventStore;
use crate::timeutil::{format_date, start_of_day_ms, DAY_MS, WEEK_MS};
use crate::types::{CohortWeek, Event, EventKind, RetentionSummary};

/// Compute weekly signup cohorts from `day_zero_ms` through `as_of`.
///
/// `day_zero_ms` may be any instant; it is normalized to the start of its
/// UTC calendar day. The iteration's exclusive upper bound is the start of
/// the day after `as_of`, so a cohort's signup window only closes once it is
/// fully in the past and a cohort formed during the `as_of` week reports a
/// single retention entry of `100`.
///
/// A `day_zero_ms` after `as_of` yields an empty list, not an error. An
/// empty event collection yields cohorts with `new_users = 0` and zeroed
/// percentages.
pub fn retention_cohorts(
    store: &dyn EventStore,
    day_zero_ms: i64,
    as_of: DateTime<Utc>,
) -> Result<Vec<CohortWeek>> {
    let events = store.fetch_all_events()?;
    let current = start_of_day_ms(as_of.timestamp_millis()) + DAY_MS;

    let mut cohorts = Vec::new();
    let mut cohort_start = start_of_day_ms(day_zero_ms);
    let mut week_number: u32 = 1;

    while cohort_start < current {
        cohorts.push(build_cohort(
            store,
            &events,
            cohort_start,
            current,
            week_number,
        )?);
        cohort_start += WEEK_MS;
        week_number += 1;
    }

    tracing::debug!(
        cohorts = cohorts.len(),
        day_zero = %format_date(day_zero_ms),
        "Computed retention cohorts"
    );

    Ok(cohorts)
}

/// Build one cohort: the users who signed up in `[cohort_start,
/// cohort_start + 7d)` and their week-by-week return percentages.
fn build_cohort(
    store: &dyn EventStore,
    events: &[Event],
    cohort_start: i64,
    current: i64,
    week_number: u32,
) -> Result<CohortWeek> {
    let cohort_end = cohort_start + WEEK_MS;

    let cohort_ids: HashSet<String> = events
        .iter()
        .filter(|e| {
            e.name == EventKind::Signup && e.date >= cohort_start && e.date < cohort_end
        })
        .map(|e| e.distinct_user_id.clone())
        .collect();

    // Index 0 is the cohort's own week
    let mut weekly_retention = vec![100.0];

    let mut week_start = cohort_end;
    while week_start < current {
        let week_end = week_start + WEEK_MS;
        let pct = store.returning_user_percentage(week_start, week_end, &cohort_ids)?;
        weekly_retention.push(pct);
        week_start = week_end;
    }

    Ok(CohortWeek {
        registration_week: week_number,
        new_users: cohort_ids.len(),
        weekly_retention,
        start: format_date(cohort_start),
        end: format_date(cohort_end),
    })
}

/// Cross-cohort summary: for each retention index, the new-user-weighted
/// average percentage across all cohorts that have data at that index.
///
/// Later cohorts have shorter retention vectors; indexes they lack are
/// simply skipped. A zero total of new users yields zeros, never `NaN`.
/// Percentages are rounded to two decimals.
pub fn retention_summary(cohorts: &[CohortWeek]) -> RetentionSummary {
    let all_users: usize = cohorts.iter().map(|c| c.new_users).sum();
    let width = cohorts
        .iter()
        .map(|c| c.weekly_retention.len())
        .max()
        .unwrap_or(0);

    // Absolute user counts returned per week, summed across cohorts
    let mut returned_users = vec![0.0f64; width];
    for cohort in cohorts {
        for (week, pct) in cohort.weekly_retention.iter().enumerate() {
            let users = pct * cohort.new_users as f64 / 100.0;
            if users.is_finite() {
                returned_users[week] += users;
            }
        }
    }

    let percentage_array = returned_users
        .iter()
        .map(|&users| round2(safe_div(users, all_users as f64) * 100.0))
        .collect();

    RetentionSummary {
        all_users,
        percentage_array,
    }
}
