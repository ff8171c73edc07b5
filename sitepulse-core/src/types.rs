//! Core domain types for sitepulse
//!
//! These types represent the canonical data model: the user-interaction
//! events the store ingests, the filter specification for event queries,
//! and the computed structures the analytics components return.
//!
//! Computed structures are transient: they are produced fresh per request
//! from a snapshot of the event collection and never cached.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

// ============================================
// Events
// ============================================

/// Kind of user-interaction event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventKind {
    PageView,
    Login,
    Signup,
    Admin,
}

impl EventKind {
    /// Returns the identifier used on the wire and in database storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::PageView => "pageView",
            EventKind::Login => "login",
            EventKind::Signup => "signup",
            EventKind::Admin => "admin",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for EventKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "pageView" | "pageview" => Ok(EventKind::PageView),
            "login" => Ok(EventKind::Login),
            "signup" => Ok(EventKind::Signup),
            "admin" => Ok(EventKind::Admin),
            _ => Err(format!("unknown event kind: {}", s)),
        }
    }
}

/// Latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

/// Optional geolocation attached to an event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    pub location: LatLng,
}

/// A single user-interaction event (immutable once created).
///
/// `date` is monotonic with wall-clock creation order but the stored
/// collection is not guaranteed pre-sorted; all sorting is per-query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Kind of event
    pub name: EventKind,
    /// Occurrence time, milliseconds since epoch (UTC)
    pub date: i64,
    /// Stable per-user identifier
    pub distinct_user_id: String,
    /// Session identifier; multiple events can share one session
    pub session_id: String,
    /// Browser the event was produced from
    pub browser: String,
    /// Operating system
    pub os: String,
    /// Page URL
    pub url: String,
    /// Optional geolocation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geolocation: Option<GeoLocation>,
}

impl Event {
    /// Validate the required fields before the event is appended to a store.
    ///
    /// Returns [`Error::Validation`] with a message naming the offending
    /// field; a failed append never corrupts the store.
    pub fn validate(&self) -> Result<()> {
        if self.date <= 0 {
            return Err(Error::Validation(
                "event date must be a positive epoch-ms timestamp".to_string(),
            ));
        }
        if self.distinct_user_id.is_empty() {
            return Err(Error::Validation(
                "event distinct_user_id must not be empty".to_string(),
            ));
        }
        if self.session_id.is_empty() {
            return Err(Error::Validation(
                "event session_id must not be empty".to_string(),
            ));
        }
        if self.url.is_empty() {
            return Err(Error::Validation("event url must not be empty".to_string()));
        }
        Ok(())
    }
}

// ============================================
// Query filter
// ============================================

/// Sort order for event queries, keyed on the event `date`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Ascending,
    #[default]
    Descending,
}

impl SortOrder {
    /// Parse a caller-supplied sort token.
    ///
    /// Canonical mapping: `"+date"` is ascending, `"-date"` is descending,
    /// and anything else (including absence) degrades to descending rather
    /// than failing the request.
    pub fn from_token(token: Option<&str>) -> Self {
        match token {
            Some("+date") => SortOrder::Ascending,
            _ => SortOrder::Descending,
        }
    }
}

/// Filter specification for the event query engine.
///
/// All filters are optional and compose conjunctively.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Case-insensitive literal substring matched against any scalar field
    pub search: Option<String>,
    /// Exact match on the event kind
    pub kind: Option<EventKind>,
    /// Exact match on the browser field
    pub browser: Option<String>,
    /// Sort order applied after filtering
    pub sorting: SortOrder,
    /// Page size; `None` disables pagination and returns the full set
    pub offset: Option<usize>,
}

// ============================================
// Computed outputs
// ============================================

/// One page of query results.
///
/// `more` is true iff pagination was requested and strictly more results
/// exist beyond the returned page.
#[derive(Debug, Clone, Serialize)]
pub struct QueryPage {
    pub events: Vec<Event>,
    pub more: bool,
}

/// Distinct-session count for one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DaySessionCount {
    /// Day in `YYYY-MM-DD`
    pub date: String,
    /// Number of distinct sessions active that day
    pub count: usize,
}

/// Distinct-session count for one hour of a day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HourSessionCount {
    /// Hour label, always zero-padded `HH:00`
    pub hour: String,
    /// Number of distinct sessions active in that hour
    pub count: usize,
}

/// Retention data for one weekly signup cohort.
///
/// `weekly_retention[0]` is always `100` (the cohort's own week); index `k`
/// is the percentage of the cohort's signups who produced any event in week
/// `k` after signup. The vector grows by one for every elapsed week between
/// the cohort's signup week and the as-of day; a cohort formed this week has
/// length 1.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CohortWeek {
    /// 1-based sequential index of the cohort's signup week
    pub registration_week: u32,
    /// Distinct signups whose date falls in `[start, end)`
    pub new_users: usize,
    /// Percentages per elapsed week, index 0 = 100
    pub weekly_retention: Vec<f64>,
    /// Signup window start, `YYYY-MM-DD`
    pub start: String,
    /// Signup window end (exclusive), `YYYY-MM-DD`
    pub end: String,
}

/// Cross-cohort aggregate row: new-user-weighted average retention per week.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RetentionSummary {
    /// Total new users across all cohorts
    pub all_users: usize,
    /// Weighted average percentage per retention index, 2-decimal rounded
    pub percentage_array: Vec<f64>,
}
