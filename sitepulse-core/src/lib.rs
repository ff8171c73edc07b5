//! # sitepulse-core
//!
//! Core library for sitepulse - a user-interaction analytics engine.
//!
//! This library provides:
//! - Domain types for events, filters, and computed aggregates
//! - An append-only event store (SQLite or in-memory) behind a narrow trait
//! - The analytics aggregation engine: event search, day/hour
//!   distinct-session counts, and weekly retention cohorts
//! - Configuration management and logging infrastructure
//!
//! ## Architecture
//!
//! Every analytics component is a stateless function over a snapshot of the
//! event collection plus an explicit as-of instant. The store is the only
//! shared resource; components never cache across requests.
//!
//! ## Example
//!
//! ```rust,no_run
//! use sitepulse_core::{Config, SqliteStore};
//! use sitepulse_core::analytics::retention_cohorts;
//! use chrono::Utc;
//!
//! let config = Config::load().expect("failed to load config");
//! let store = SqliteStore::open(&config.database_path()).expect("failed to open store");
//! store.migrate().expect("failed to run migrations");
//!
//! let day_zero = 1_736_121_600_000; // 2025-01-06T00:00:00Z
//! let cohorts = retention_cohorts(&store, day_zero, Utc::now()).expect("retention");
//! ```

// Re-export commonly used items at the crate root
pub use config::Config;
pub use error::{Error, Result};
pub use store::{EventStore, MemoryStore, SqliteStore};
pub use types::*;

// Public modules
pub mod analytics;
pub mod config;
pub mod error;
pub mod logging;
pub mod numeric;
pub mod store;
pub mod timeutil;
pub mod types;
