//! Authorization decisions.
//!
//! A denial is a decision, not an error. Errors are reserved for invalid
//! input and failed remote calls; see the `learngate` crate.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Why access was granted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantReason {
    /// The user created the channel. Ownership always wins.
    ChannelCreator,
    /// The user's groups overlap the channel's shared groups.
    SharedGroup,
    /// Group overlap plus an explicit share of the requested plan.
    SharedGroupAndPlan,
    /// The user owns the lesson attempt.
    AttemptOwner,
    /// The user administers the group.
    GroupAdmin,
}

/// Why access was denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DenyReason {
    /// The user's groups and the channel's shared groups are disjoint.
    NoSharedGroup,
    /// Groups overlap but the plan is not shared with the user.
    PlanNotShared,
    /// A group lookup failed and the engine refused to guess.
    GroupsUnavailable,
    /// The lesson attempt belongs to someone else.
    NotAttemptOwner,
    /// The user does not administer the group.
    NotGroupAdmin,
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DenyReason::NoSharedGroup => "no group shared with the channel",
            DenyReason::PlanNotShared => "plan is not shared with the user",
            DenyReason::GroupsUnavailable => "group membership could not be determined",
            DenyReason::NotAttemptOwner => "lesson attempt belongs to another user",
            DenyReason::NotGroupAdmin => "user is not an admin of the group",
        };
        f.write_str(s)
    }
}

/// Outcome of a permission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "decision", content = "reason")]
pub enum Decision {
    Granted(GrantReason),
    Denied(DenyReason),
}

impl Decision {
    pub fn is_granted(&self) -> bool {
        matches!(self, Decision::Granted(_))
    }

    pub fn is_denied(&self) -> bool {
        !self.is_granted()
    }

    /// Map a boolean answer from a collaborator onto a decision.
    pub fn from_bool(granted: bool, grant: GrantReason, deny: DenyReason) -> Self {
        if granted {
            Decision::Granted(grant)
        } else {
            Decision::Denied(deny)
        }
    }

    /// Turn the decision into a `Result` for `?`-style gating.
    pub fn into_result(self) -> Result<GrantReason, DenyReason> {
        match self {
            Decision::Granted(reason) => Ok(reason),
            Decision::Denied(reason) => Err(reason),
        }
    }
}
