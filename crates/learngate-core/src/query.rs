//! Permission queries and the role they are evaluated under.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::{ChannelId, PlanId, UserId};

/// The question "may this user act on this channel (and optionally plan)?".
///
/// Built by the service layer from an authenticated request. A query is
/// only meaningful after [`crate::validate_query`] has accepted it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionQuery {
    /// The principal whose access is evaluated.
    pub user_id: UserId,
    /// The channel being accessed.
    pub channel_id: ChannelId,
    /// Optional plan-level gate. `None` means channel-level only.
    pub plan_id: Option<PlanId>,
}

impl PermissionQuery {
    /// Build a query from raw wire values.
    ///
    /// A `plan` of `0` is the "no plan" sentinel and becomes `None`.
    pub fn new(user: impl Into<UserId>, channel: u64, plan: u64) -> Self {
        Self {
            user_id: user.into(),
            channel_id: ChannelId::new(channel),
            plan_id: PlanId::from_raw(plan),
        }
    }

    /// Channel-level query with no plan gate.
    pub fn channel(user: impl Into<UserId>, channel: ChannelId) -> Self {
        Self {
            user_id: user.into(),
            channel_id: channel,
            plan_id: None,
        }
    }

    /// Add a plan-level gate.
    pub fn with_plan(mut self, plan: PlanId) -> Self {
        self.plan_id = Some(plan);
        self
    }
}

/// Which of the user's group memberships a share check consults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Groups the user administers. Gates mutating operations.
    Admin,
    /// Groups the user learns in. Gates read/participate operations.
    Learner,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Admin => f.write_str("admin"),
            Role::Learner => f.write_str("learner"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_folds_plan_sentinel() {
        let query = PermissionQuery::new("u", 4, 0);
        assert_eq!(query.plan_id, None);

        let query = PermissionQuery::new("u", 4, 11);
        assert_eq!(query.plan_id, Some(PlanId::new(11)));
    }

    #[test]
    fn test_builder() {
        let query = PermissionQuery::channel("u", ChannelId::new(2)).with_plan(PlanId::new(3));
        assert_eq!(query, PermissionQuery::new("u", 2, 3));
    }
}
