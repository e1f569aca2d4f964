//! Error types for collaborator lookups.

use thiserror::Error;

/// Errors a collaborator can return instead of an answer.
///
/// None of these mean "no": absence of membership or ownership is an empty
/// set or `false`, never an error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    /// The remote service could not be reached or failed internally.
    #[error("service unavailable: {0}")]
    Unavailable(String),

    /// The call ran past its deadline.
    #[error("timeout: {0}")]
    Timeout(String),

    /// The caller cancelled the request.
    #[error("lookup cancelled")]
    Cancelled,

    /// The remote service rejected the request as malformed.
    #[error("request rejected: {0}")]
    Rejected(String),
}

/// Result type for lookups.
pub type Result<T> = std::result::Result<T, LookupError>;
