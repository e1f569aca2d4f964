//! SetCache trait: the abstract interface for ephemeral set storage.
//!
//! The cache is scratch space, not a cache in the read-through sense. Sets
//! are written, intersected once and deleted. Implementations include an
//! in-memory map and SQLite; any store with server-side set operations
//! (set-add, set-intersect, expire, delete) can back it.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;
use crate::scratch::ScratchKeys;

/// The SetCache trait: async interface for keyed string sets with expiry.
///
/// # Design Notes
///
/// - **Idempotent adds**: `save_set` is a union-add; saving a member twice is a no-op.
/// - **TTL refresh**: every `save_set` call resets the key's expiry.
/// - **Missing is empty**: a missing or expired key behaves as the empty set.
/// - **Backend-side intersection**: `intersect` transfers only the result.
#[async_trait]
pub trait SetCache: Send + Sync {
    /// Union-add `members` into the set at `key` and set its TTL.
    ///
    /// With no members the call only refreshes the TTL of an existing key.
    async fn save_set(&self, key: &str, members: &[String], ttl: Duration) -> Result<()>;

    /// Members present in both sets, sorted.
    async fn intersect(&self, key_a: &str, key_b: &str) -> Result<Vec<String>>;

    /// Remove keys. Missing keys are not an error.
    ///
    /// Also reclaims every expired key. Scratch keys are never reused, so a
    /// key left by a cancelled check is only freed here.
    async fn delete_keys(&self, keys: &[&str]) -> Result<()>;

    /// Whether a live (unexpired) key exists.
    async fn exists(&self, key: &str) -> Result<bool>;
}

#[async_trait]
impl<T: SetCache + ?Sized> SetCache for Arc<T> {
    async fn save_set(&self, key: &str, members: &[String], ttl: Duration) -> Result<()> {
        (**self).save_set(key, members, ttl).await
    }

    async fn intersect(&self, key_a: &str, key_b: &str) -> Result<Vec<String>> {
        (**self).intersect(key_a, key_b).await
    }

    async fn delete_keys(&self, keys: &[&str]) -> Result<()> {
        (**self).delete_keys(keys).await
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        (**self).exists(key).await
    }
}

/// Extension trait for the write, intersect, delete discipline.
pub trait SetCacheExt: SetCache {
    /// Intersect two member lists through the cache using scratch keys.
    ///
    /// Writes are best-effort: a failed `save_set` is logged and the check
    /// carries on (the intersection then sees an empty set). The keys are
    /// deleted whatever `intersect` returns; a failed delete is logged and
    /// left to the TTL. Only an `intersect` failure is returned.
    fn intersect_scratch(
        &self,
        keys: &ScratchKeys,
        user_groups: &[String],
        channel_groups: &[String],
        ttl: Duration,
    ) -> impl Future<Output = Result<Vec<String>>> + Send;
}

impl<C: SetCache + ?Sized> SetCacheExt for C {
    async fn intersect_scratch(
        &self,
        keys: &ScratchKeys,
        user_groups: &[String],
        channel_groups: &[String],
        ttl: Duration,
    ) -> Result<Vec<String>> {
        if let Err(e) = self.save_set(keys.user_key(), user_groups, ttl).await {
            tracing::warn!(key = keys.user_key(), error = %e, "failed to save scratch set");
        }
        if let Err(e) = self.save_set(keys.channel_key(), channel_groups, ttl).await {
            tracing::warn!(key = keys.channel_key(), error = %e, "failed to save scratch set");
        }

        let result = self.intersect(keys.user_key(), keys.channel_key()).await;

        if let Err(e) = self.delete_keys(&keys.both()).await {
            tracing::warn!(keys = ?keys, error = %e, "failed to delete scratch keys");
        }

        result
    }
}
