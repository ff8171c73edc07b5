//! Integration tests for the sitepulse event store and analytics engine
//!
//! These tests run the full pipeline against a SQLite database in a
//! temporary directory: append events, then exercise all four analytics
//! components against the stored collection.

use chrono::{DateTime, Utc};
use sitepulse_core::analytics::{
    filter_events, retention_cohorts, retention_summary, sessions_by_day, sessions_by_hour,
};
use sitepulse_core::timeutil::{DAY_MS, HOUR_MS};
use sitepulse_core::{
    Event, EventFilter, EventKind, EventStore, GeoLocation, LatLng, SortOrder, SqliteStore,
};
use tempfile::TempDir;

// 2025-01-06T00:00:00Z (a Monday)
const DAY0: i64 = 1_736_121_600_000;

fn event(kind: EventKind, date: i64, user: &str, session: &str, browser: &str) -> Event {
    Event {
        name: kind,
        date,
        distinct_user_id: user.to_string(),
        session_id: session.to_string(),
        browser: browser.to_string(),
        os: "linux".to_string(),
        url: "http://localhost:3000/".to_string(),
        geolocation: Some(GeoLocation {
            location: LatLng {
                lat: 51.5,
                lng: -0.12,
            },
        }),
    }
}

fn as_of(ms: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp_millis(ms).unwrap()
}

/// Open a file-backed store seeded with a two-week activity history.
///
/// Week 1: u1 and u2 sign up; both are active. Week 2: only u1 returns.
fn seeded_store(dir: &TempDir) -> SqliteStore {
    let store = SqliteStore::open(&dir.path().join("events.db")).expect("open store");
    store.migrate().expect("migrate");

    let events = vec![
        event(EventKind::Signup, DAY0 + HOUR_MS, "u1", "s1", "chrome"),
        event(EventKind::PageView, DAY0 + 2 * HOUR_MS, "u1", "s1", "chrome"),
        event(EventKind::Signup, DAY0 + DAY_MS, "u2", "s2", "firefox"),
        event(
            EventKind::Login,
            DAY0 + 2 * DAY_MS + 9 * HOUR_MS,
            "u2",
            "s3",
            "firefox",
        ),
        // Week 2: u1 returns, u2 does not
        event(
            EventKind::Login,
            DAY0 + 8 * DAY_MS + 9 * HOUR_MS,
            "u1",
            "s4",
            "chrome",
        ),
        event(
            EventKind::PageView,
            DAY0 + 8 * DAY_MS + 9 * HOUR_MS + 1000,
            "u1",
            "s4",
            "chrome",
        ),
        event(EventKind::Admin, DAY0 + 9 * DAY_MS, "admin", "s5", "safari"),
    ];
    for e in &events {
        store.append_event(e).expect("append");
    }
    store
}

#[test]
fn test_query_engine_over_stored_events() {
    let dir = TempDir::new().unwrap();
    let store = seeded_store(&dir);
    let snapshot = store.fetch_all_events().unwrap();
    assert_eq!(snapshot.len(), 7);

    // Geolocation survives the round trip
    assert!(snapshot.iter().all(|e| e.geolocation.is_some()));

    let page = filter_events(
        &snapshot,
        &EventFilter {
            search: Some("CHROME".to_string()),
            sorting: SortOrder::Ascending,
            offset: Some(3),
            ..Default::default()
        },
    );
    assert_eq!(page.events.len(), 3);
    assert!(page.more); // 4 chrome events matched
    assert!(page.events.windows(2).all(|w| w[0].date <= w[1].date));

    let page = filter_events(
        &snapshot,
        &EventFilter {
            kind: Some(EventKind::Signup),
            ..Default::default()
        },
    );
    assert_eq!(page.events.len(), 2);
    assert!(!page.more);
}

#[test]
fn test_day_and_hour_aggregation_over_stored_events() {
    let dir = TempDir::new().unwrap();
    let store = seeded_store(&dir);

    // Window [day 0, day 7) seen from day 7
    let days = sessions_by_day(&store, 1, as_of(DAY0 + 7 * DAY_MS)).unwrap();
    assert_eq!(days.len(), 3);
    assert_eq!(days[0].date, "2025-01-06");
    assert_eq!(days[0].count, 1); // s1 twice, one session
    assert_eq!(days[1].date, "2025-01-07");
    assert_eq!(days[1].count, 1);
    assert_eq!(days[2].date, "2025-01-08");
    assert_eq!(days[2].count, 1);

    // Hour buckets for day 8 (offset 1 from day 9)
    let hours = sessions_by_hour(&store, 1, as_of(DAY0 + 9 * DAY_MS + HOUR_MS)).unwrap();
    assert_eq!(hours.len(), 24);
    assert_eq!(hours[9].hour, "09:00");
    assert_eq!(hours[9].count, 1); // s4 appears twice, counted once
    assert_eq!(hours.iter().map(|h| h.count).sum::<usize>(), 1);
}

#[test]
fn test_retention_over_stored_events() {
    let dir = TempDir::new().unwrap();
    let store = seeded_store(&dir);

    let cohorts = retention_cohorts(&store, DAY0, as_of(DAY0 + 13 * DAY_MS)).unwrap();
    assert_eq!(cohorts.len(), 2);

    // Week 1 cohort: u1 and u2 signed up, only u1 returned in week 2
    assert_eq!(cohorts[0].new_users, 2);
    assert_eq!(cohorts[0].weekly_retention, vec![100.0, 50.0]);

    // Week 2 cohort: nobody signed up
    assert_eq!(cohorts[1].new_users, 0);
    assert_eq!(cohorts[1].weekly_retention, vec![100.0]);

    let summary = retention_summary(&cohorts);
    assert_eq!(summary.all_users, 2);
    assert_eq!(summary.percentage_array, vec![100.0, 50.0]);
}

#[test]
fn test_store_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("events.db");
    {
        let store = SqliteStore::open(&path).unwrap();
        store.migrate().unwrap();
        store
            .append_event(&event(EventKind::Login, DAY0, "u1", "s1", "chrome"))
            .unwrap();
    }

    let store = SqliteStore::open(&path).unwrap();
    store.migrate().unwrap();
    let events = store.fetch_all_events().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].distinct_user_id, "u1");
}
