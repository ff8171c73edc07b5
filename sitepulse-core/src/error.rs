//! Error types for sitepulse-core

use thiserror::Error;

/// Main error type for the sitepulse-core library
#[derive(Error, Debug)]
pub enum Error {
    /// Database error
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Event failed validation before append
    #[error("invalid event: {0}")]
    Validation(String),
}

/// Result type alias for sitepulse-core
pub type Result<T> = std::result::Result<T, Error>;
