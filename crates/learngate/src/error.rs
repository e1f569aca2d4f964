//! Error types for the authorization engine.

use std::fmt;

use learngate_cache::CacheError;
use learngate_core::{DenyReason, Role, ValidationError};
use learngate_lookup::LookupError;
use thiserror::Error;

/// The remote call a lookup error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupStep {
    ChannelCreator,
    UserGroups(Role),
    ChannelSharedGroups,
    PlanShare,
    AttemptOwner,
    GroupAdmin,
}

impl fmt::Display for LookupStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupStep::ChannelCreator => f.write_str("channel creator lookup"),
            LookupStep::UserGroups(role) => write!(f, "{role} group lookup"),
            LookupStep::ChannelSharedGroups => f.write_str("channel shared group lookup"),
            LookupStep::PlanShare => f.write_str("plan share lookup"),
            LookupStep::AttemptOwner => f.write_str("lesson attempt owner lookup"),
            LookupStep::GroupAdmin => f.write_str("group admin lookup"),
        }
    }
}

/// Errors that can occur during authorization.
#[derive(Debug, Error)]
pub enum AuthzError {
    /// The request failed structural validation. No remote call was made.
    #[error("invalid input: {0}")]
    InvalidInput(#[from] ValidationError),

    /// A denial surfaced as an error by a caller gating with `?`.
    #[error("permission denied: {0}")]
    PermissionDenied(DenyReason),

    /// A collaborator failed at a step that must not be guessed past.
    #[error("{step} failed: {source}")]
    Lookup {
        step: LookupStep,
        #[source]
        source: LookupError,
    },

    /// The scratch cache failed to compute an intersection.
    #[error("cache error: {0}")]
    Cache(#[from] CacheError),

    /// The engine was configured inconsistently.
    #[error("configuration error: {0}")]
    Config(String),
}

impl AuthzError {
    pub(crate) fn lookup(step: LookupStep, source: LookupError) -> Self {
        AuthzError::Lookup { step, source }
    }

    /// Classify for the calling layer.
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthzError::InvalidInput(_) => ErrorKind::InvalidInput,
            AuthzError::PermissionDenied(_) => ErrorKind::PermissionDenied,
            AuthzError::Lookup { .. } | AuthzError::Cache(_) | AuthzError::Config(_) => {
                ErrorKind::Internal
            }
        }
    }

    /// Whether the failure came from the caller cancelling the request.
    pub fn is_cancelled(&self) -> bool {
        matches!(
            self,
            AuthzError::Lookup {
                source: LookupError::Cancelled,
                ..
            }
        )
    }
}

impl From<DenyReason> for AuthzError {
    fn from(reason: DenyReason) -> Self {
        AuthzError::PermissionDenied(reason)
    }
}

/// Coarse error classes, as the REST layer renders them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidInput,
    PermissionDenied,
    Internal,
}

impl ErrorKind {
    /// Client errors are the caller's fault (4xx); the rest are ours (5xx).
    pub fn is_client_error(&self) -> bool {
        !matches!(self, ErrorKind::Internal)
    }
}

/// Result type for authorization operations.
pub type Result<T> = std::result::Result<T, AuthzError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(
            AuthzError::from(ValidationError::EmptyUserId).kind(),
            ErrorKind::InvalidInput
        );
        assert_eq!(
            AuthzError::from(DenyReason::NoSharedGroup).kind(),
            ErrorKind::PermissionDenied
        );
        let internal = AuthzError::lookup(
            LookupStep::PlanShare,
            LookupError::Unavailable("content".into()),
        );
        assert_eq!(internal.kind(), ErrorKind::Internal);
        assert!(!internal.kind().is_client_error());
        assert!(ErrorKind::PermissionDenied.is_client_error());
    }

    #[test]
    fn test_display_names_step() {
        let err = AuthzError::lookup(
            LookupStep::UserGroups(Role::Learner),
            LookupError::Timeout("5s".into()),
        );
        assert_eq!(err.to_string(), "learner group lookup failed: timeout: 5s");
    }

    #[test]
    fn test_cancelled() {
        let err = AuthzError::lookup(LookupStep::ChannelCreator, LookupError::Cancelled);
        assert!(err.is_cancelled());
        assert_eq!(err.kind(), ErrorKind::Internal);
    }
}
