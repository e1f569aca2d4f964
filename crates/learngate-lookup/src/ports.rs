//! Ports: the narrow interfaces the engine needs from the identity and
//! content services.
//!
//! Implementations wrap gRPC clients in the gateway and in-memory fakes in
//! tests. Every method is a remote call and a suspension point.

use std::sync::Arc;

use async_trait::async_trait;

use learngate_core::{ChannelId, GroupId, LessonAttemptId, PlanId, Role, UserId};

use crate::error::Result;

/// Group membership as seen by the identity service.
#[async_trait]
pub trait IdentityGroupLookup: Send + Sync {
    /// Groups the user administers.
    async fn groups_where_user_is_admin(&self, user_id: &UserId) -> Result<Vec<GroupId>>;

    /// Groups the user is a learner in.
    async fn groups_where_user_is_learner(&self, user_id: &UserId) -> Result<Vec<GroupId>>;

    /// Whether the user administers a specific group.
    async fn is_group_admin(&self, user_id: &UserId, group_id: &GroupId) -> Result<bool>;

    /// Groups the user holds in `role`.
    async fn groups_for_role(&self, user_id: &UserId, role: Role) -> Result<Vec<GroupId>> {
        match role {
            Role::Admin => self.groups_where_user_is_admin(user_id).await,
            Role::Learner => self.groups_where_user_is_learner(user_id).await,
        }
    }
}

/// Ownership and sharing facts held by the content service.
#[async_trait]
pub trait ContentSharingLookup: Send + Sync {
    /// Whether the user is the recorded creator of the channel.
    async fn is_channel_creator(&self, user_id: &UserId, channel_id: ChannelId) -> Result<bool>;

    /// Groups the channel has been shared with.
    async fn groups_channel_is_shared_with(&self, channel_id: ChannelId) -> Result<Vec<GroupId>>;

    /// Whether the plan has been explicitly shared with the user.
    async fn is_user_shared_with_plan(&self, user_id: &UserId, plan_id: PlanId) -> Result<bool>;
}

/// Lesson attempt ownership.
#[async_trait]
pub trait AttemptOwnership: Send + Sync {
    /// Whether the attempt belongs to the user.
    async fn is_attempt_owner(&self, user_id: &UserId, attempt_id: LessonAttemptId)
        -> Result<bool>;
}

// Shared clients are handed around as `Arc`s; let the Arc stand in for the port.

#[async_trait]
impl<T: IdentityGroupLookup + ?Sized> IdentityGroupLookup for Arc<T> {
    async fn groups_where_user_is_admin(&self, user_id: &UserId) -> Result<Vec<GroupId>> {
        (**self).groups_where_user_is_admin(user_id).await
    }

    async fn groups_where_user_is_learner(&self, user_id: &UserId) -> Result<Vec<GroupId>> {
        (**self).groups_where_user_is_learner(user_id).await
    }

    async fn is_group_admin(&self, user_id: &UserId, group_id: &GroupId) -> Result<bool> {
        (**self).is_group_admin(user_id, group_id).await
    }

    async fn groups_for_role(&self, user_id: &UserId, role: Role) -> Result<Vec<GroupId>> {
        (**self).groups_for_role(user_id, role).await
    }
}

#[async_trait]
impl<T: ContentSharingLookup + ?Sized> ContentSharingLookup for Arc<T> {
    async fn is_channel_creator(&self, user_id: &UserId, channel_id: ChannelId) -> Result<bool> {
        (**self).is_channel_creator(user_id, channel_id).await
    }

    async fn groups_channel_is_shared_with(&self, channel_id: ChannelId) -> Result<Vec<GroupId>> {
        (**self).groups_channel_is_shared_with(channel_id).await
    }

    async fn is_user_shared_with_plan(&self, user_id: &UserId, plan_id: PlanId) -> Result<bool> {
        (**self).is_user_shared_with_plan(user_id, plan_id).await
    }
}

#[async_trait]
impl<T: AttemptOwnership + ?Sized> AttemptOwnership for Arc<T> {
    async fn is_attempt_owner(
        &self,
        user_id: &UserId,
        attempt_id: LessonAttemptId,
    ) -> Result<bool> {
        (**self).is_attempt_owner(user_id, attempt_id).await
    }
}
