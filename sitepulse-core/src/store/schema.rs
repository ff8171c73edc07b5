//! Database schema and migrations
//!
//! Uses SQLite with embedded migrations managed via PRAGMA user_version.

use rusqlite::Connection;

/// Current schema version
pub const SCHEMA_VERSION: i32 = 1;

/// SQL migrations, indexed by version number
const MIGRATIONS: &[&str] = &[
    // Version 1: append-only events table
    r#"
    CREATE TABLE IF NOT EXISTS events (
        id               INTEGER PRIMARY KEY AUTOINCREMENT,
        name             TEXT NOT NULL,
        date             INTEGER NOT NULL,   -- epoch milliseconds, UTC
        distinct_user_id TEXT NOT NULL,
        session_id       TEXT NOT NULL,
        browser          TEXT NOT NULL,
        os               TEXT NOT NULL,
        url              TEXT NOT NULL,
        geo_lat          REAL,
        geo_lng          REAL
    );

    CREATE INDEX IF NOT EXISTS idx_events_date ON events(date);
    CREATE INDEX IF NOT EXISTS idx_events_name ON events(name);
    CREATE INDEX IF NOT EXISTS idx_events_session ON events(session_id);
    CREATE INDEX IF NOT EXISTS idx_events_user ON events(distinct_user_id);
    "#,
];

/// Run any pending migrations, bringing the database to `SCHEMA_VERSION`.
pub fn run_migrations(conn: &Connection) -> crate::error::Result<()> {
    let current: i32 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;

    for (idx, migration) in MIGRATIONS.iter().enumerate() {
        let version = idx as i32 + 1;
        if version > current {
            tracing::info!(version, "Applying schema migration");
            conn.execute_batch(migration)?;
            conn.pragma_update(None, "user_version", version)?;
        }
    }

    Ok(())
}
