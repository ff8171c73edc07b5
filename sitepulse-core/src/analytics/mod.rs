//! Analytics aggregation engine for sitepulse
//!
//! Four stateless components over a snapshot of the event collection:
//!
//! - [`query`] — filtered, sorted, paginated event search
//! - [`sessions`] — distinct-session counts bucketed by day and by hour
//! - [`retention`] — weekly signup cohorts and their return percentages
//!
//! Every component takes the event store (or a snapshot of it) and an
//! explicit as-of instant; none reads the clock or keeps state across
//! requests, so concurrent requests need no coordination beyond the store's
//! own locking.

pub mod query;
pub mod retention;
pub mod sessions;

pub use query::filter_events;
pub use retention::{retention_cohorts, retention_summary};
pub use sessions::{sessions_by_day, sessions_by_hour};
