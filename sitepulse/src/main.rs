//! sitepulse - user-interaction analytics CLI
//!
//! Ingests events from JSONL files into the local SQLite store and runs the
//! analytics components against it, printing JSON to stdout.

use std::io::BufRead;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use sitepulse_core::analytics::{
    filter_events, retention_cohorts, retention_summary, sessions_by_day, sessions_by_hour,
};
use sitepulse_core::{
    Config, Event, EventFilter, EventKind, EventStore, SortOrder, SqliteStore,
};

#[derive(Parser, Debug)]
#[command(name = "sitepulse")]
#[command(about = "User-interaction analytics over a local event store")]
#[command(version)]
struct Cli {
    /// Override the database path from the config file
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Append events from a JSONL file (one event object per line)
    Ingest {
        /// Path to the JSONL file
        file: PathBuf,
    },
    /// Search, filter, sort, and paginate stored events
    Query {
        /// Case-insensitive literal substring matched against any field
        #[arg(long)]
        search: Option<String>,

        /// Exact event kind (pageView, login, signup, admin)
        #[arg(long = "type", value_parser = parse_kind)]
        kind: Option<EventKind>,

        /// Exact browser name
        #[arg(long)]
        browser: Option<String>,

        /// Sort token: "+date" ascending, "-date" descending (default)
        #[arg(long)]
        sorting: Option<String>,

        /// Page size; non-numeric values disable pagination
        #[arg(long)]
        offset: Option<String>,
    },
    /// Distinct sessions per day for a trailing 7-day window
    ByDays {
        /// Days back from today
        #[arg(default_value_t = 0)]
        offset: i64,
    },
    /// Distinct sessions per hour for one day (24 buckets)
    ByHours {
        /// Days back from today (0 = today)
        #[arg(default_value_t = 0)]
        offset: i64,
    },
    /// Weekly retention cohorts from a day-zero date
    Retention {
        /// Cohort day zero, YYYY-MM-DD
        day_zero: String,

        /// Also print the cross-cohort summary row
        #[arg(long)]
        summary: bool,
    },
}

fn parse_kind(s: &str) -> std::result::Result<EventKind, String> {
    s.parse()
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    Config::ensure_xdg_env();
    let config = Config::load().context("failed to load configuration")?;
    let _log_guard = sitepulse_core::logging::init(&config.logging).ok();

    let db_path = cli.db.unwrap_or_else(|| config.database_path());
    let store = SqliteStore::open(&db_path)
        .with_context(|| format!("failed to open event store at {}", db_path.display()))?;
    store.migrate().context("failed to run migrations")?;

    match cli.command {
        Command::Ingest { file } => ingest(&store, &file),
        Command::Query {
            search,
            kind,
            browser,
            sorting,
            offset,
        } => {
            let filter = EventFilter {
                search,
                kind,
                browser,
                sorting: SortOrder::from_token(sorting.as_deref()),
                offset: parse_offset(offset.as_deref()),
            };
            let events = store.fetch_all_events().context("failed to fetch events")?;
            print_json(&filter_events(&events, &filter))
        }
        Command::ByDays { offset } => {
            let result =
                sessions_by_day(&store, offset, Utc::now()).context("day aggregation failed")?;
            print_json(&result)
        }
        Command::ByHours { offset } => {
            let result =
                sessions_by_hour(&store, offset, Utc::now()).context("hour aggregation failed")?;
            print_json(&result)
        }
        Command::Retention { day_zero, summary } => {
            let day_zero_ms = parse_day_zero(&day_zero)?;
            let cohorts = retention_cohorts(&store, day_zero_ms, Utc::now())
                .context("retention computation failed")?;
            if summary {
                print_json(&serde_json::json!({
                    "cohorts": cohorts,
                    "summary": retention_summary(&cohorts),
                }))
            } else {
                print_json(&cohorts)
            }
        }
    }
}

/// Parse a caller-supplied page size. Non-numeric input degrades to "no
/// pagination" instead of failing the request.
fn parse_offset(offset: Option<&str>) -> Option<usize> {
    offset.and_then(|s| s.parse().ok())
}

/// Parse a YYYY-MM-DD date into UTC-midnight epoch milliseconds.
fn parse_day_zero(input: &str) -> Result<i64> {
    let date = NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .with_context(|| format!("invalid day-zero date {:?}, expected YYYY-MM-DD", input))?;
    let midnight = date
        .and_hms_opt(0, 0, 0)
        .context("invalid day-zero midnight")?;
    Ok(midnight.and_utc().timestamp_millis())
}

/// Append each JSONL line as an event, skipping lines that fail to parse or
/// validate. Reports counts; malformed input never aborts the run.
fn ingest(store: &SqliteStore, file: &PathBuf) -> Result<()> {
    let reader = std::io::BufReader::new(
        std::fs::File::open(file)
            .with_context(|| format!("failed to open {}", file.display()))?,
    );

    let mut appended = 0usize;
    let mut skipped = 0usize;

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let event: Event = match serde_json::from_str(&line) {
            Ok(event) => event,
            Err(e) => {
                tracing::warn!(line = line_no + 1, error = %e, "Skipping unparseable event");
                skipped += 1;
                continue;
            }
        };

        match store.append_event(&event) {
            Ok(()) => appended += 1,
            Err(e) => {
                tracing::warn!(line = line_no + 1, error = %e, "Skipping invalid event");
                skipped += 1;
            }
        }
    }

    println!("Appended {} events ({} skipped)", appended, skipped);
    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    println!("{}", json);
    Ok(())
}
