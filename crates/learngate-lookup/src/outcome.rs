//! Three-valued group lookups.
//!
//! A failed membership lookup is not the same as "member of nothing". The
//! engine receives [`GroupLookup::Unknown`] and decides what to do with it
//! by policy instead of having the failure coerced into an empty set.

use std::collections::HashSet;

use learngate_core::GroupId;

use crate::error::LookupError;

/// Result of fetching a group set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupLookup {
    /// The service answered. The set may be empty.
    Known(HashSet<GroupId>),
    /// The service could not answer.
    Unknown(LookupError),
}

impl GroupLookup {
    /// The set, if known.
    pub fn known(&self) -> Option<&HashSet<GroupId>> {
        match self {
            GroupLookup::Known(set) => Some(set),
            GroupLookup::Unknown(_) => None,
        }
    }

    /// The error, if unknown.
    pub fn error(&self) -> Option<&LookupError> {
        match self {
            GroupLookup::Known(_) => None,
            GroupLookup::Unknown(e) => Some(e),
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, GroupLookup::Known(_))
    }

    /// Convert back into a `Result`, for callers that treat unknown as a hard error.
    pub fn into_result(self) -> Result<HashSet<GroupId>, LookupError> {
        match self {
            GroupLookup::Known(set) => Ok(set),
            GroupLookup::Unknown(e) => Err(e),
        }
    }
}

impl From<Result<Vec<GroupId>, LookupError>> for GroupLookup {
    fn from(result: Result<Vec<GroupId>, LookupError>) -> Self {
        match result {
            Ok(groups) => GroupLookup::Known(groups.into_iter().collect()),
            Err(e) => GroupLookup::Unknown(e),
        }
    }
}
