//! Error types for the cache module.

use thiserror::Error;

/// Errors that can occur during set cache operations.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Database error from SQLite.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A lock guarding cache state was poisoned by a panicking writer.
    #[error("cache lock poisoned")]
    LockPoisoned,

    /// The blocking task running a database call failed to complete.
    #[error("blocking task failed: {0}")]
    Task(String),

    /// Migration error.
    #[error("migration error: {0}")]
    Migration(String),

    /// A TTL too large to turn into an expiry time.
    #[error("ttl out of range: {0:?}")]
    TtlOutOfRange(std::time::Duration),

    /// The backend could not be reached.
    #[error("cache unavailable: {0}")]
    Unavailable(String),
}

/// Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;
