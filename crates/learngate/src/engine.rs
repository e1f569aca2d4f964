//! The authorization engine.
//!
//! Decides whether a principal may mutate or read a channel (and optionally
//! a plan under it), whether they own a lesson attempt, and whether they
//! administer a group.
//!
//! The two share checks run the same pipeline:
//!
//! ```text
//! validate -> is_channel_creator? --yes--> Granted(ChannelCreator)
//!                  | no
//!                  v
//!     join(role groups, channel shared groups)
//!                  |
//!            any unknown? --yes--> policy: Denied(GroupsUnavailable) | Internal
//!                  | no
//!                  v
//!             intersect --empty--> Denied(NoSharedGroup)
//!                  | non-empty
//!                  v
//!            plan given? --no--> Granted(SharedGroup)
//!                  | yes
//!                  v
//!     is_user_shared_with_plan --> Granted(SharedGroupAndPlan) | Denied(PlanNotShared)
//! ```
//!
//! The plan share is an extra condition on top of group overlap. A plan
//! shared with a user does not let them past a channel they share no group
//! with.

use std::sync::Arc;

use learngate_cache::SetCache;
use learngate_core::{
    validate_attempt, validate_group, validate_query, validate_user, Decision, DenyReason,
    GrantReason, GroupId, LessonAttemptId, PermissionQuery, Role, UserId,
};
use learngate_lookup::{
    AttemptOwnership, ContentSharingLookup, GroupLookup, IdentityGroupLookup, LookupError,
};

use crate::config::{EngineConfig, Intersection, UnknownGroupsPolicy};
use crate::error::{AuthzError, LookupStep, Result};
use crate::intersect::Intersector;

/// The authorization engine.
///
/// Stateless between calls: every check derives its group sets fresh and
/// drops them when it returns. Share one engine (behind an `Arc`) across
/// request handlers.
pub struct AuthorizationEngine<I, C, A> {
    identity: I,
    sharing: C,
    attempts: A,
    config: EngineConfig,
    intersector: Intersector,
}

impl<I, C, A> AuthorizationEngine<I, C, A>
where
    I: IdentityGroupLookup,
    C: ContentSharingLookup,
    A: AttemptOwnership,
{
    /// Create an engine that intersects group sets in process.
    ///
    /// `config.intersection` is ignored here; use [`Self::with_set_cache`]
    /// or [`Self::from_config`] to intersect through a shared cache. The
    /// config is not validated; an out-of-range scratch TTL is clamped.
    pub fn new(identity: I, sharing: C, attempts: A, config: EngineConfig) -> Self {
        Self {
            identity,
            sharing,
            attempts,
            config: EngineConfig {
                intersection: Intersection::Local,
                ..config
            },
            intersector: Intersector::Local,
        }
    }

    /// Create an engine honouring `config.intersection`.
    ///
    /// Fails if the shared cache strategy is selected without a cache, or if
    /// the configuration is otherwise invalid.
    pub fn from_config(
        identity: I,
        sharing: C,
        attempts: A,
        config: EngineConfig,
        cache: Option<Arc<dyn SetCache>>,
    ) -> Result<Self> {
        config.validate()?;

        let engine = Self::new(identity, sharing, attempts, config.clone());
        match (config.intersection, cache) {
            (Intersection::Local, _) => Ok(engine),
            (Intersection::SharedCache, Some(cache)) => Ok(engine.with_set_cache(cache)),
            (Intersection::SharedCache, None) => Err(AuthzError::Config(
                "shared_cache intersection requires a set cache".into(),
            )),
        }
    }

    /// Intersect group sets through `cache` using per-check scratch keys.
    pub fn with_set_cache(mut self, cache: Arc<dyn SetCache>) -> Self {
        self.config.intersection = Intersection::SharedCache;
        self.intersector = Intersector::Cache(cache);
        self
    }

    /// The effective configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Share Checks
    // ─────────────────────────────────────────────────────────────────────────

    /// May the user mutate the channel (and plan)?
    ///
    /// Granted to the channel creator, or to an admin of a group the channel
    /// is shared with (and, if a plan is given, with whom the plan is shared).
    pub async fn check_creator_or_admin_and_share(
        &self,
        query: &PermissionQuery,
    ) -> Result<Decision> {
        self.check_share(Role::Admin, query).await
    }

    /// May the user read or take part in the channel (and plan)?
    ///
    /// Same as [`Self::check_creator_or_admin_and_share`] with learner
    /// membership in place of admin membership.
    pub async fn check_creator_or_learner_and_share(
        &self,
        query: &PermissionQuery,
    ) -> Result<Decision> {
        self.check_share(Role::Learner, query).await
    }

    /// Run the share pipeline for `role`.
    #[tracing::instrument(
        name = "check_share",
        skip_all,
        fields(role = %role, user = %query.user_id, channel = %query.channel_id, plan = ?query.plan_id),
    )]
    pub async fn check_share(&self, role: Role, query: &PermissionQuery) -> Result<Decision> {
        validate_query(query)?;
        let user = &query.user_id;
        let channel = query.channel_id;

        let is_creator = self
            .sharing
            .is_channel_creator(user, channel)
            .await
            .map_err(|e| AuthzError::lookup(LookupStep::ChannelCreator, e))?;

        if is_creator {
            return Ok(decided(Decision::Granted(GrantReason::ChannelCreator)));
        }

        let (user_groups, channel_groups) = tokio::join!(
            self.identity.groups_for_role(user, role),
            self.sharing.groups_channel_is_shared_with(channel),
        );

        let (user_groups, channel_groups) =
            match (GroupLookup::from(user_groups), GroupLookup::from(channel_groups)) {
                (GroupLookup::Known(u), GroupLookup::Known(c)) => (u, c),
                (u, c) => return self.unknown_groups(role, u, c),
            };

        let common = self
            .intersector
            .intersect(query, &user_groups, &channel_groups, self.config.scratch_ttl())
            .await?;

        if common.is_empty() {
            return Ok(decided(Decision::Denied(DenyReason::NoSharedGroup)));
        }

        let Some(plan) = query.plan_id else {
            return Ok(decided(Decision::Granted(GrantReason::SharedGroup)));
        };

        let plan_shared = self
            .sharing
            .is_user_shared_with_plan(user, plan)
            .await
            .map_err(|e| AuthzError::lookup(LookupStep::PlanShare, e))?;

        Ok(decided(Decision::from_bool(
            plan_shared,
            GrantReason::SharedGroupAndPlan,
            DenyReason::PlanNotShared,
        )))
    }

    /// Apply the unknown-groups policy once at least one lookup failed.
    fn unknown_groups(
        &self,
        role: Role,
        user_groups: GroupLookup,
        channel_groups: GroupLookup,
    ) -> Result<Decision> {
        let failures: Vec<(LookupStep, LookupError)> = [
            (LookupStep::UserGroups(role), user_groups),
            (LookupStep::ChannelSharedGroups, channel_groups),
        ]
        .into_iter()
        .filter_map(|(step, lookup)| lookup.into_result().err().map(|e| (step, e)))
        .collect();

        for (step, error) in &failures {
            tracing::warn!(%step, %error, "group lookup failed");
        }

        match (self.config.unknown_groups, failures.into_iter().next()) {
            (UnknownGroupsPolicy::Fail, Some((step, source))) => {
                Err(AuthzError::lookup(step, source))
            }
            _ => Ok(decided(Decision::Denied(DenyReason::GroupsUnavailable))),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Single-Call Checks
    // ─────────────────────────────────────────────────────────────────────────

    /// Does the lesson attempt belong to the user?
    #[tracing::instrument(skip_all, fields(user = %user_id, attempt = %attempt_id))]
    pub async fn check_lesson_attempt(
        &self,
        user_id: &UserId,
        attempt_id: LessonAttemptId,
    ) -> Result<Decision> {
        validate_user(user_id)?;
        validate_attempt(attempt_id)?;

        let owner = self
            .attempts
            .is_attempt_owner(user_id, attempt_id)
            .await
            .map_err(|e| AuthzError::lookup(LookupStep::AttemptOwner, e))?;

        Ok(decided(Decision::from_bool(
            owner,
            GrantReason::AttemptOwner,
            DenyReason::NotAttemptOwner,
        )))
    }

    /// Does the user administer the group?
    ///
    /// Used when creating a channel under a group: the creator must be one
    /// of the group's admins.
    #[tracing::instrument(skip_all, fields(user = %user_id, group = %group_id))]
    pub async fn is_group_admin(&self, user_id: &UserId, group_id: &GroupId) -> Result<Decision> {
        validate_user(user_id)?;
        validate_group(group_id)?;

        let admin = self
            .identity
            .is_group_admin(user_id, group_id)
            .await
            .map_err(|e| AuthzError::lookup(LookupStep::GroupAdmin, e))?;

        Ok(decided(Decision::from_bool(
            admin,
            GrantReason::GroupAdmin,
            DenyReason::NotGroupAdmin,
        )))
    }
}

/// Log a decision inside the current span and pass it through.
fn decided(decision: Decision) -> Decision {
    tracing::debug!(?decision, "authorization decided");
    decision
}
