//! In-memory stand-ins for the identity and content services, and a
//! fault-injecting set cache.
//!
//! Every fake records the calls it receives so tests can assert on what the
//! engine did, not only on what it returned.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;

use learngate_cache::{CacheError, SetCache};
use learngate_core::{ChannelId, GroupId, LessonAttemptId, PlanId, UserId};
use learngate_lookup::{
    AttemptOwnership, ContentSharingLookup, IdentityGroupLookup, LookupError,
    Result as LookupResult,
};

/// A remote call received by [`FakeDirectory`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    GroupsWhereUserIsAdmin(UserId),
    GroupsWhereUserIsLearner(UserId),
    IsGroupAdmin(UserId, GroupId),
    IsChannelCreator(UserId, ChannelId),
    GroupsChannelIsSharedWith(ChannelId),
    IsUserSharedWithPlan(UserId, PlanId),
    IsAttemptOwner(UserId, LessonAttemptId),
}

/// The kind of a [`Call`], for counting and for scripting failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallKind {
    GroupsWhereUserIsAdmin,
    GroupsWhereUserIsLearner,
    IsGroupAdmin,
    IsChannelCreator,
    GroupsChannelIsSharedWith,
    IsUserSharedWithPlan,
    IsAttemptOwner,
}

impl Call {
    pub fn kind(&self) -> CallKind {
        match self {
            Call::GroupsWhereUserIsAdmin(_) => CallKind::GroupsWhereUserIsAdmin,
            Call::GroupsWhereUserIsLearner(_) => CallKind::GroupsWhereUserIsLearner,
            Call::IsGroupAdmin(..) => CallKind::IsGroupAdmin,
            Call::IsChannelCreator(..) => CallKind::IsChannelCreator,
            Call::GroupsChannelIsSharedWith(_) => CallKind::GroupsChannelIsSharedWith,
            Call::IsUserSharedWithPlan(..) => CallKind::IsUserSharedWithPlan,
            Call::IsAttemptOwner(..) => CallKind::IsAttemptOwner,
        }
    }
}

#[derive(Default)]
struct DirectoryState {
    admin_of: HashMap<UserId, Vec<GroupId>>,
    learner_in: HashMap<UserId, Vec<GroupId>>,
    creators: HashSet<(UserId, ChannelId)>,
    channel_shares: HashMap<ChannelId, Vec<GroupId>>,
    plan_shares: HashSet<(UserId, PlanId)>,
    attempt_owners: HashMap<LessonAttemptId, UserId>,
    failures: HashMap<CallKind, LookupError>,
    calls: Vec<Call>,
}

/// Fake identity and content services in one directory.
///
/// Implements all three collaborator ports. Clones share state, so a test
/// can keep a handle for assertions after moving one into an engine.
#[derive(Clone, Default)]
pub struct FakeDirectory {
    state: Arc<Mutex<DirectoryState>>,
}

impl FakeDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, DirectoryState> {
        // A panicking test thread poisons the lock; the data is still usable
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Make `user` an admin of `groups`.
    pub fn with_admin(self, user: &str, groups: &[&str]) -> Self {
        self.state()
            .admin_of
            .entry(UserId::from(user))
            .or_default()
            .extend(groups.iter().map(|g| GroupId::from(*g)));
        self
    }

    /// Make `user` a learner in `groups`.
    pub fn with_learner(self, user: &str, groups: &[&str]) -> Self {
        self.state()
            .learner_in
            .entry(UserId::from(user))
            .or_default()
            .extend(groups.iter().map(|g| GroupId::from(*g)));
        self
    }

    /// Record `user` as the creator of `channel`.
    pub fn with_creator(self, user: &str, channel: u64) -> Self {
        self.state()
            .creators
            .insert((UserId::from(user), ChannelId::new(channel)));
        self
    }

    /// Share `channel` with `groups`.
    pub fn with_channel_share(self, channel: u64, groups: &[&str]) -> Self {
        self.state()
            .channel_shares
            .entry(ChannelId::new(channel))
            .or_default()
            .extend(groups.iter().map(|g| GroupId::from(*g)));
        self
    }

    /// Share `plan` explicitly with `user`.
    pub fn with_plan_share(self, plan: u64, user: &str) -> Self {
        self.state()
            .plan_shares
            .insert((UserId::from(user), PlanId::new(plan)));
        self
    }

    /// Record `user` as the owner of `attempt`.
    pub fn with_attempt(self, attempt: u64, user: &str) -> Self {
        self.state()
            .attempt_owners
            .insert(LessonAttemptId::new(attempt), UserId::from(user));
        self
    }

    /// Make every call of `kind` fail with `error`.
    pub fn failing(self, kind: CallKind, error: LookupError) -> Self {
        self.state().failures.insert(kind, error);
        self
    }

    /// All calls received so far, in order.
    pub fn calls(&self) -> Vec<Call> {
        self.state().calls.clone()
    }

    /// Number of calls of `kind` received so far.
    pub fn count(&self, kind: CallKind) -> usize {
        self.state().calls.iter().filter(|c| c.kind() == kind).count()
    }

    /// Forget recorded calls.
    pub fn clear_calls(&self) {
        self.state().calls.clear();
    }

    /// Record `call`, then answer with `f` unless a failure is scripted.
    fn answer<T>(&self, call: Call, f: impl FnOnce(&DirectoryState) -> T) -> LookupResult<T> {
        let mut state = self.state();
        let kind = call.kind();
        state.calls.push(call);
        if let Some(error) = state.failures.get(&kind) {
            return Err(error.clone());
        }
        Ok(f(&state))
    }
}

#[async_trait]
impl IdentityGroupLookup for FakeDirectory {
    async fn groups_where_user_is_admin(&self, user_id: &UserId) -> LookupResult<Vec<GroupId>> {
        self.answer(Call::GroupsWhereUserIsAdmin(user_id.clone()), |s| {
            s.admin_of.get(user_id).cloned().unwrap_or_default()
        })
    }

    async fn groups_where_user_is_learner(&self, user_id: &UserId) -> LookupResult<Vec<GroupId>> {
        self.answer(Call::GroupsWhereUserIsLearner(user_id.clone()), |s| {
            s.learner_in.get(user_id).cloned().unwrap_or_default()
        })
    }

    async fn is_group_admin(&self, user_id: &UserId, group_id: &GroupId) -> LookupResult<bool> {
        self.answer(Call::IsGroupAdmin(user_id.clone(), group_id.clone()), |s| {
            s.admin_of
                .get(user_id)
                .is_some_and(|groups| groups.contains(group_id))
        })
    }
}

#[async_trait]
impl ContentSharingLookup for FakeDirectory {
    async fn is_channel_creator(
        &self,
        user_id: &UserId,
        channel_id: ChannelId,
    ) -> LookupResult<bool> {
        self.answer(Call::IsChannelCreator(user_id.clone(), channel_id), |s| {
            s.creators.contains(&(user_id.clone(), channel_id))
        })
    }

    async fn groups_channel_is_shared_with(
        &self,
        channel_id: ChannelId,
    ) -> LookupResult<Vec<GroupId>> {
        self.answer(Call::GroupsChannelIsSharedWith(channel_id), |s| {
            s.channel_shares.get(&channel_id).cloned().unwrap_or_default()
        })
    }

    async fn is_user_shared_with_plan(
        &self,
        user_id: &UserId,
        plan_id: PlanId,
    ) -> LookupResult<bool> {
        self.answer(Call::IsUserSharedWithPlan(user_id.clone(), plan_id), |s| {
            s.plan_shares.contains(&(user_id.clone(), plan_id))
        })
    }
}

#[async_trait]
impl AttemptOwnership for FakeDirectory {
    async fn is_attempt_owner(
        &self,
        user_id: &UserId,
        attempt_id: LessonAttemptId,
    ) -> LookupResult<bool> {
        self.answer(Call::IsAttemptOwner(user_id.clone(), attempt_id), |s| {
            s.attempt_owners.get(&attempt_id) == Some(user_id)
        })
    }
}

/// A cache operation seen by [`FlakyCache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheOp {
    Save,
    Intersect,
    Delete,
    Exists,
}

/// Wraps a [`SetCache`] and fails selected operations.
///
/// Failed operations are still counted but never reach the inner cache.
pub struct FlakyCache<C> {
    inner: C,
    failing: Mutex<HashSet<CacheOp>>,
    ops: Mutex<Vec<CacheOp>>,
}

impl<C: SetCache> FlakyCache<C> {
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            failing: Mutex::new(HashSet::new()),
            ops: Mutex::new(Vec::new()),
        }
    }

    /// Fail every future `op`.
    pub fn fail(self, op: CacheOp) -> Self {
        self.failing
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(op);
        self
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }

    /// Number of `op` calls received so far, failed or not.
    pub fn count(&self, op: CacheOp) -> usize {
        self.ops
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|o| **o == op)
            .count()
    }

    fn enter(&self, op: CacheOp) -> learngate_cache::Result<()> {
        self.ops.lock().unwrap_or_else(|e| e.into_inner()).push(op);
        if self
            .failing
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(&op)
        {
            return Err(CacheError::Unavailable(format!("{op:?} failed")));
        }
        Ok(())
    }
}

#[async_trait]
impl<C: SetCache> SetCache for FlakyCache<C> {
    async fn save_set(
        &self,
        key: &str,
        members: &[String],
        ttl: Duration,
    ) -> learngate_cache::Result<()> {
        self.enter(CacheOp::Save)?;
        self.inner.save_set(key, members, ttl).await
    }

    async fn intersect(&self, key_a: &str, key_b: &str) -> learngate_cache::Result<Vec<String>> {
        self.enter(CacheOp::Intersect)?;
        self.inner.intersect(key_a, key_b).await
    }

    async fn delete_keys(&self, keys: &[&str]) -> learngate_cache::Result<()> {
        self.enter(CacheOp::Delete)?;
        self.inner.delete_keys(keys).await
    }

    async fn exists(&self, key: &str) -> learngate_cache::Result<bool> {
        self.enter(CacheOp::Exists)?;
        self.inner.exists(key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use learngate_cache::MemorySetCache;

    #[tokio::test]
    async fn test_directory_answers_and_records() {
        let dir = FakeDirectory::new()
            .with_admin("u", &["a"])
            .with_creator("u", 1)
            .with_attempt(9, "u");

        let user = UserId::from("u");
        assert!(dir.is_channel_creator(&user, ChannelId::new(1)).await.unwrap());
        assert!(!dir.is_channel_creator(&user, ChannelId::new(2)).await.unwrap());
        assert!(dir.is_group_admin(&user, &GroupId::from("a")).await.unwrap());
        assert!(dir
            .is_attempt_owner(&user, LessonAttemptId::new(9))
            .await
            .unwrap());

        assert_eq!(dir.count(CallKind::IsChannelCreator), 2);
        assert_eq!(
            dir.calls()[0],
            Call::IsChannelCreator(user.clone(), ChannelId::new(1))
        );
    }

    #[tokio::test]
    async fn test_directory_scripted_failure() {
        let dir = FakeDirectory::new().failing(
            CallKind::GroupsChannelIsSharedWith,
            LookupError::Unavailable("content".into()),
        );

        let result = dir.groups_channel_is_shared_with(ChannelId::new(1)).await;
        assert_eq!(result, Err(LookupError::Unavailable("content".into())));
        assert_eq!(dir.count(CallKind::GroupsChannelIsSharedWith), 1);
    }

    #[tokio::test]
    async fn test_flaky_cache() {
        let cache = FlakyCache::new(MemorySetCache::new()).fail(CacheOp::Save);

        assert!(cache
            .save_set("k", &["m".to_string()], Duration::from_secs(1))
            .await
            .is_err());
        assert!(!cache.exists("k").await.unwrap());
        assert_eq!(cache.count(CacheOp::Save), 1);
        assert_eq!(cache.count(CacheOp::Exists), 1);
    }
}
