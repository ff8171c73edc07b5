//! In-memory event store
//!
//! A `Vec`-backed fake implementing the same contract as the SQLite store.
//! Used by tests and by embedders that want the analytics components
//! without touching disk.

use std::collections::HashSet;
use std::sync::Mutex;

use chrono::NaiveDate;

use crate::error::Result;
use crate::numeric::safe_div;
use crate::store::EventStore;
use crate::timeutil::day_hour_window;
use crate::types::Event;

/// Append-only in-memory event collection.
#[derive(Default)]
pub struct MemoryStore {
    events: Mutex<Vec<Event>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-seeded with events. Events are validated; invalid
    /// ones are rejected the same way `append_event` rejects them.
    pub fn with_events(events: Vec<Event>) -> Result<Self> {
        let store = Self::new();
        for event in &events {
            store.append_event(event)?;
        }
        Ok(store)
    }
}

impl EventStore for MemoryStore {
    fn fetch_all_events(&self) -> Result<Vec<Event>> {
        Ok(self.events.lock().unwrap().clone())
    }

    fn session_ids_for_hour(&self, day: NaiveDate, hour: u32) -> Result<Vec<String>> {
        let (start, end) = day_hour_window(day, hour);
        let events = self.events.lock().unwrap();
        Ok(events
            .iter()
            .filter(|e| e.date >= start && e.date < end)
            .map(|e| e.session_id.clone())
            .collect())
    }

    fn returning_user_percentage(
        &self,
        window_start_ms: i64,
        window_end_ms: i64,
        user_ids: &HashSet<String>,
    ) -> Result<f64> {
        let events = self.events.lock().unwrap();
        let active: HashSet<&str> = events
            .iter()
            .filter(|e| e.date >= window_start_ms && e.date < window_end_ms)
            .map(|e| e.distinct_user_id.as_str())
            .collect();

        let returned = user_ids
            .iter()
            .filter(|id| active.contains(id.as_str()))
            .count();
        Ok(safe_div(returned as f64, user_ids.len() as f64) * 100.0)
    }

    fn append_event(&self, event: &Event) -> Result<()> {
        event.validate()?;
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }
}
