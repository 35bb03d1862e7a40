//! Error types for newsgate.

use thiserror::Error;

/// Common error type for newsgate.
#[derive(Error, Debug)]
pub enum NewsError {
    /// A single poll cycle failed (network, HTTP status, size limit or parse).
    ///
    /// Recovered locally by the poller on its next cycle.
    #[error("fetch error: {0}")]
    Fetch(String),

    /// Writing an ingested batch failed.
    #[error("persistence error: {0}")]
    Persistence(String),

    /// A caller supplied an argument outside the accepted range.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Database error.
    ///
    /// Database errors from sqlx are automatically converted.
    #[error("database error: {0}")]
    Database(String),

    /// Database connection error.
    #[error("database connection error: {0}")]
    DatabaseConnection(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),

    /// Validation error for user input.
    #[error("validation error: {0}")]
    Validation(String),

    /// The content filter could not be consulted.
    #[error("content filter error: {0}")]
    Filter(String),

    /// The content filter refused the text.
    #[error("content rejected: {0}")]
    Rejected(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl NewsError {
    /// Shorthand for an [`NewsError::InvalidArgument`].
    pub fn invalid(msg: impl Into<String>) -> Self {
        NewsError::InvalidArgument(msg.into())
    }
}

// Conversion from sqlx errors
impl From<sqlx::Error> for NewsError {
    fn from(e: sqlx::Error) -> Self {
        NewsError::Database(e.to_string())
    }
}

/// Result type alias for newsgate operations.
pub type Result<T> = std::result::Result<T, NewsError>;
