//! Error types for STASH.

use thiserror::Error;

/// Common error type for STASH operations.
///
/// Every failure in the hosting core is recoverable at the coordinator
/// boundary and surfaced as one of these variants; none are fatal to the
/// process.
#[derive(Error, Debug)]
pub enum StashError {
    /// Database error.
    #[error("database error: {0}")]
    Database(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Resource not found. Also returned by owner-scoped mutations when the
    /// file exists but belongs to someone else, so that filenames of other
    /// users' private files are not leaked.
    #[error("{0} not found")]
    NotFound(String),

    /// Access policy denied the operation.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Missing or invalid identity where one is required.
    #[error("unauthenticated: {0}")]
    Unauthenticated(String),

    /// Duplicate create (username or filename already taken).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Malformed search filter.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// Share target does not exist in the identity directory.
    #[error("unknown user: {0}")]
    UnknownUser(String),

    /// Metadata and blob storage disagree: a record exists without its blob
    /// or vice versa. Distinct from `NotFound` so it can be alerted on.
    #[error("storage corruption: {0}")]
    Corrupt(String),

    /// Validation error for user input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<sqlx::Error> for StashError {
    fn from(e: sqlx::Error) -> Self {
        StashError::Database(e.to_string())
    }
}

/// Result type alias for STASH operations.
pub type Result<T> = std::result::Result<T, StashError>;
