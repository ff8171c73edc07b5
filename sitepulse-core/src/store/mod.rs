//! Event storage layer for sitepulse
//!
//! The analytics components talk to storage exclusively through the
//! [`EventStore`] trait: an append-only event collection queried through a
//! handful of narrow primitives. Two implementations are provided:
//!
//! - [`SqliteStore`] — the production store, SQLite with embedded migrations
//! - [`MemoryStore`] — an in-memory fake for tests and embedding

pub mod memory;
pub mod schema;
pub mod sqlite;

use std::collections::HashSet;

use chrono::NaiveDate;

use crate::error::Result;
use crate::types::Event;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Narrow data-access abstraction over the append-only event collection.
///
/// A single `fetch_all_events` call returns a consistent snapshot; no
/// linearizability with concurrent appends is required. All methods are
/// synchronous and complete within a single request lifecycle.
pub trait EventStore: Send + Sync {
    /// Fetch a snapshot of the full event collection.
    fn fetch_all_events(&self) -> Result<Vec<Event>>;

    /// Session ids of events falling in the given hour of a UTC calendar
    /// day. The result MAY contain duplicates; deduplication is the
    /// caller's job.
    fn session_ids_for_hour(&self, day: NaiveDate, hour: u32) -> Result<Vec<String>>;

    /// Percentage (0-100) of the given users who produced at least one
    /// event with `date` in `[window_start_ms, window_end_ms)`.
    ///
    /// An empty user set yields `0`, never `NaN`.
    fn returning_user_percentage(
        &self,
        window_start_ms: i64,
        window_end_ms: i64,
        user_ids: &HashSet<String>,
    ) -> Result<f64>;

    /// Validate and append one event. Fails with
    /// [`crate::Error::Validation`] when required fields are missing or
    /// malformed; a failed append leaves the store unchanged.
    fn append_event(&self, event: &Event) -> Result<()>;
}
