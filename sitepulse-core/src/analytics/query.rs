//! Event query engine
//!
//! Filters, sorts, and paginates a snapshot of the event collection. This
//! is a pure function of its inputs: no side effects, deterministic for the
//! same snapshot.

use crate::types::{Event, EventFilter, QueryPage, SortOrder};

/// Apply a filter specification to a snapshot of the event collection.
///
/// Filters compose conjunctively; sorting is applied after filtering and
/// pagination after sorting.
///
/// The `search` term is matched as a **literal** case-insensitive substring
/// against the string-or-number rendering of each scalar field (`name`,
/// `date`, `distinct_user_id`, `session_id`, `browser`, `os`, `url`).
/// It is never interpreted as a regex, so metacharacters need no escaping.
/// `geolocation` is not searched.
///
/// With `offset: Some(n)` the first `n` results are returned and `more` is
/// true iff strictly more results matched; with `offset: None` the full
/// filtered set is returned and `more` is false.
pub fn filter_events(events: &[Event], filter: &EventFilter) -> QueryPage {
    let mut filtered: Vec<Event> = events
        .iter()
        .filter(|event| {
            filter
                .search
                .as_deref()
                .map_or(true, |term| matches_search(event, term))
        })
        .filter(|event| filter.kind.map_or(true, |kind| event.name == kind))
        .filter(|event| {
            filter
                .browser
                .as_deref()
                .map_or(true, |browser| event.browser == browser)
        })
        .cloned()
        .collect();

    // Stable ascending sort; descending is its exact reverse so that
    // reversing a "-date" result reproduces the "+date" order, ties
    // included.
    filtered.sort_by_key(|event| event.date);
    if filter.sorting == SortOrder::Descending {
        filtered.reverse();
    }

    let total = filtered.len();
    match filter.offset {
        None => QueryPage {
            events: filtered,
            more: false,
        },
        Some(offset) => {
            filtered.truncate(offset);
            QueryPage {
                events: filtered,
                more: offset < total,
            }
        }
    }
}

/// Case-insensitive literal substring match against every scalar field.
fn matches_search(event: &Event, term: &str) -> bool {
    let needle = term.to_lowercase();
    let haystacks = [
        event.name.as_str().to_string(),
        event.date.to_string(),
        event.distinct_user_id.clone(),
        event.session_id.clone(),
        event.browser.clone(),
        event.os.clone(),
        event.url.clone(),
    ];
    haystacks
        .iter()
        .any(|field| field.to_lowercase().contains(&needle))
}
