//! SQLite-backed event store
//!
//! A thin repository over a single `events` table. The connection is held
//! behind a mutex; every query sees a consistent snapshot because SQLite
//! statements are atomic and the collection is append-only.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Mutex;

use chrono::NaiveDate;
use rusqlite::{params, Connection, Row};

use crate::error::{Error, Result};
use crate::numeric::safe_div;
use crate::store::EventStore;
use crate::timeutil::day_hour_window;
use crate::types::{Event, EventKind, GeoLocation, LatLng};

/// Database handle (single connection behind a mutex)
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create a database at the given path
    pub fn open(path: &PathBuf) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        // WAL mode for better concurrency with append-only writers
        conn.execute_batch(
            "
            PRAGMA foreign_keys = ON;
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            ",
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute("PRAGMA foreign_keys = ON", [])?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Run migrations on this database
    pub fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        super::schema::run_migrations(&conn)
    }

    /// Total number of stored events
    pub fn count_events(&self) -> Result<i64> {
        let conn = self.conn.lock().unwrap();
        conn.query_row("SELECT COUNT(*) FROM events", [], |row| row.get(0))
            .map_err(Error::from)
    }

    fn row_to_event(row: &Row) -> rusqlite::Result<Event> {
        let name_str: String = row.get("name")?;
        let name: EventKind = name_str.parse().map_err(|e: String| {
            rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, e.into())
        })?;

        let geo_lat: Option<f64> = row.get("geo_lat")?;
        let geo_lng: Option<f64> = row.get("geo_lng")?;
        let geolocation = match (geo_lat, geo_lng) {
            (Some(lat), Some(lng)) => Some(GeoLocation {
                location: LatLng { lat, lng },
            }),
            _ => None,
        };

        Ok(Event {
            name,
            date: row.get("date")?,
            distinct_user_id: row.get("distinct_user_id")?,
            session_id: row.get("session_id")?,
            browser: row.get("browser")?,
            os: row.get("os")?,
            url: row.get("url")?,
            geolocation,
        })
    }
}

impl EventStore for SqliteStore {
    fn fetch_all_events(&self) -> Result<Vec<Event>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT name, date, distinct_user_id, session_id, browser, os, url, geo_lat, geo_lng
             FROM events",
        )?;
        let events = stmt
            .query_map([], Self::row_to_event)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(events)
    }

    fn session_ids_for_hour(&self, day: NaiveDate, hour: u32) -> Result<Vec<String>> {
        let (start, end) = day_hour_window(day, hour);
        let conn = self.conn.lock().unwrap();
        let mut stmt =
            conn.prepare("SELECT session_id FROM events WHERE date >= ?1 AND date < ?2")?;
        let ids = stmt
            .query_map(params![start, end], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(ids)
    }

    fn returning_user_percentage(
        &self,
        window_start_ms: i64,
        window_end_ms: i64,
        user_ids: &HashSet<String>,
    ) -> Result<f64> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT DISTINCT distinct_user_id FROM events WHERE date >= ?1 AND date < ?2",
        )?;
        let active = stmt
            .query_map(params![window_start_ms, window_end_ms], |row| row.get(0))?
            .collect::<rusqlite::Result<HashSet<String>>>()?;

        let returned = user_ids.intersection(&active).count();
        Ok(safe_div(returned as f64, user_ids.len() as f64) * 100.0)
    }

    fn append_event(&self, event: &Event) -> Result<()> {
        event.validate()?;

        let conn = self.conn.lock().unwrap();
        conn.execute(
            r#"
            INSERT INTO events
                (name, date, distinct_user_id, session_id, browser, os, url, geo_lat, geo_lng)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                event.name.as_str(),
                event.date,
                event.distinct_user_id,
                event.session_id,
                event.browser,
                event.os,
                event.url,
                event.geolocation.map(|g| g.location.lat),
                event.geolocation.map(|g| g.location.lng),
            ],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeutil::{DAY_MS, HOUR_MS};

    fn event(kind: EventKind, date: i64, user: &str, session: &str) -> Event {
        Event {
            name: kind,
            date,
            distinct_user_id: user.to_string(),
            session_id: session.to_string(),
            browser: "chrome".to_string(),
            os: "linux".to_string(),
            url: "http://localhost:3000/".to_string(),
            geolocation: None,
        }
    }

    fn open_store() -> SqliteStore {
        let store = SqliteStore::open_in_memory().unwrap();
        store.migrate().unwrap();
        store
    }

    // 2025-01-06T00:00:00Z
    const DAY0: i64 = 1_736_121_600_000;

    #[test]
    fn test_append_and_fetch_roundtrip() {
        let store = open_store();
        let mut original = event(EventKind::Signup, DAY0 + HOUR_MS, "u1", "s1");
        original.geolocation = Some(GeoLocation {
            location: LatLng {
                lat: 32.08,
                lng: 34.78,
            },
        });
        store.append_event(&original).unwrap();

        let events = store.fetch_all_events().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0], original);
        assert_eq!(store.count_events().unwrap(), 1);
    }

    #[test]
    fn test_append_rejects_invalid_event() {
        let store = open_store();
        let mut bad = event(EventKind::Login, DAY0, "", "s1");
        bad.distinct_user_id.clear();

        let err = store.append_event(&bad).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        // Store is unchanged
        assert_eq!(store.count_events().unwrap(), 0);
    }

    #[test]
    fn test_session_ids_for_hour_respects_bounds() {
        let store = open_store();
        // Two events in hour 10, one duplicate session, one in hour 11
        store
            .append_event(&event(EventKind::PageView, DAY0 + 10 * HOUR_MS, "u1", "s1"))
            .unwrap();
        store
            .append_event(&event(
                EventKind::Login,
                DAY0 + 10 * HOUR_MS + 1000,
                "u1",
                "s1",
            ))
            .unwrap();
        store
            .append_event(&event(EventKind::PageView, DAY0 + 11 * HOUR_MS, "u2", "s2"))
            .unwrap();

        let day = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap();
        let hour10 = store.session_ids_for_hour(day, 10).unwrap();
        // Duplicates are preserved; deduplication is the aggregator's job
        assert_eq!(hour10, vec!["s1".to_string(), "s1".to_string()]);

        let hour11 = store.session_ids_for_hour(day, 11).unwrap();
        assert_eq!(hour11, vec!["s2".to_string()]);

        assert!(store.session_ids_for_hour(day, 12).unwrap().is_empty());
    }

    #[test]
    fn test_returning_user_percentage() {
        let store = open_store();
        store
            .append_event(&event(EventKind::Login, DAY0 + DAY_MS, "u1", "s1"))
            .unwrap();
        store
            .append_event(&event(EventKind::PageView, DAY0 + DAY_MS, "u2", "s2"))
            .unwrap();

        let cohort: HashSet<String> =
            ["u1", "u2", "u3", "u4"].iter().map(|s| s.to_string()).collect();
        let pct = store
            .returning_user_percentage(DAY0, DAY0 + 7 * DAY_MS, &cohort)
            .unwrap();
        assert_eq!(pct, 50.0);

        // Window with no events
        let pct = store
            .returning_user_percentage(DAY0 + 7 * DAY_MS, DAY0 + 14 * DAY_MS, &cohort)
            .unwrap();
        assert_eq!(pct, 0.0);

        // Empty cohort normalizes to 0, not NaN
        let pct = store
            .returning_user_percentage(DAY0, DAY0 + 7 * DAY_MS, &HashSet::new())
            .unwrap();
        assert_eq!(pct, 0.0);
    }
}
