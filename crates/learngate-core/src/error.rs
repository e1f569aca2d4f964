//! Error types for learngate core.

use thiserror::Error;

/// Structural validation failures on the inputs of a permission check.
///
/// These are raised before any remote call is made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("user id must not be empty")]
    EmptyUserId,

    #[error("channel id must not be zero")]
    ZeroChannelId,

    #[error("lesson attempt id must not be zero")]
    ZeroAttemptId,

    #[error("group id must not be empty")]
    EmptyGroupId,
}

/// Result type for validation.
pub type Result<T> = std::result::Result<T, ValidationError>;
