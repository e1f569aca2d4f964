//! In-memory implementation of the SetCache trait.
//!
//! Same semantics as the SQLite backend, with no persistence and no sharing
//! across processes. Expiry is checked lazily on access, and expired keys
//! are swept whenever keys are deleted.

use std::collections::{BTreeSet, HashMap};
use std::sync::RwLock;
use std::time::{Duration, Instant};

use async_trait::async_trait;

use crate::error::{CacheError, Result};
use crate::traits::SetCache;

/// In-memory set cache.
///
/// All data is lost when the cache is dropped. Thread-safe via RwLock.
pub struct MemorySetCache {
    inner: RwLock<HashMap<String, Entry>>,
}

struct Entry {
    members: BTreeSet<String>,
    expires_at: Instant,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at > now
    }
}

impl MemorySetCache {
    /// Create a new empty cache.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
        }
    }

    /// Number of live keys.
    pub fn key_count(&self) -> Result<usize> {
        let inner = self.inner.read().map_err(|_| CacheError::LockPoisoned)?;
        let now = Instant::now();
        Ok(inner.values().filter(|e| e.is_live(now)).count())
    }

    /// Members of a live key, sorted. Empty if missing or expired.
    pub fn members(&self, key: &str) -> Result<Vec<String>> {
        let inner = self.inner.read().map_err(|_| CacheError::LockPoisoned)?;
        Ok(live_members(&inner, key, Instant::now())
            .map(|m| m.iter().cloned().collect())
            .unwrap_or_default())
    }

    /// Drop every expired key. Returns how many were removed.
    pub fn purge_expired(&self) -> Result<usize> {
        let mut inner = self.inner.write().map_err(|_| CacheError::LockPoisoned)?;
        Ok(sweep(&mut inner, Instant::now()))
    }
}

/// Remove expired entries, returning how many went.
fn sweep(inner: &mut HashMap<String, Entry>, now: Instant) -> usize {
    let before = inner.len();
    inner.retain(|_, e| e.is_live(now));
    before - inner.len()
}

impl Default for MemorySetCache {
    fn default() -> Self {
        Self::new()
    }
}

fn live_members<'a>(
    inner: &'a HashMap<String, Entry>,
    key: &str,
    now: Instant,
) -> Option<&'a BTreeSet<String>> {
    inner
        .get(key)
        .filter(|e| e.is_live(now))
        .map(|e| &e.members)
}

#[async_trait]
impl SetCache for MemorySetCache {
    async fn save_set(&self, key: &str, members: &[String], ttl: Duration) -> Result<()> {
        let now = Instant::now();
        let expires_at = now.checked_add(ttl).ok_or(CacheError::TtlOutOfRange(ttl))?;
        let mut inner = self.inner.write().map_err(|_| CacheError::LockPoisoned)?;

        // An expired key is gone; never union into its stale members
        if inner.get(key).is_some_and(|e| !e.is_live(now)) {
            inner.remove(key);
        }

        if members.is_empty() {
            if let Some(entry) = inner.get_mut(key) {
                entry.expires_at = expires_at;
            }
            return Ok(());
        }

        let entry = inner.entry(key.to_owned()).or_insert_with(|| Entry {
            members: BTreeSet::new(),
            expires_at,
        });
        entry.members.extend(members.iter().cloned());
        entry.expires_at = expires_at;

        Ok(())
    }

    async fn intersect(&self, key_a: &str, key_b: &str) -> Result<Vec<String>> {
        let inner = self.inner.read().map_err(|_| CacheError::LockPoisoned)?;
        let now = Instant::now();

        let (Some(a), Some(b)) = (
            live_members(&inner, key_a, now),
            live_members(&inner, key_b, now),
        ) else {
            return Ok(Vec::new());
        };

        Ok(a.intersection(b).cloned().collect())
    }

    async fn delete_keys(&self, keys: &[&str]) -> Result<()> {
        let mut inner = self.inner.write().map_err(|_| CacheError::LockPoisoned)?;
        for key in keys {
            inner.remove(*key);
        }
        // Keys left by cancelled checks are never written again
        let swept = sweep(&mut inner, Instant::now());
        if swept > 0 {
            tracing::debug!(swept, "swept expired scratch keys");
        }
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let inner = self.inner.read().map_err(|_| CacheError::LockPoisoned)?;
        Ok(live_members(&inner, key, Instant::now()).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scratch::ScratchKeys;
    use crate::traits::SetCacheExt;
    use learngate_core::{ChannelId, UserId};

    const TTL: Duration = Duration::from_secs(60);

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_memory_cache_basic() {
        let cache = MemorySetCache::new();

        cache.save_set("a", &strings(&["x", "y", "z"]), TTL).await.unwrap();
        cache.save_set("b", &strings(&["y", "z", "w"]), TTL).await.unwrap();

        let common = cache.intersect("a", "b").await.unwrap();
        assert_eq!(common, strings(&["y", "z"]));
    }

    #[tokio::test]
    async fn test_save_is_union_add() {
        let cache = MemorySetCache::new();

        cache.save_set("a", &strings(&["x"]), TTL).await.unwrap();
        cache.save_set("a", &strings(&["x", "y"]), TTL).await.unwrap();

        assert_eq!(cache.members("a").unwrap(), strings(&["x", "y"]));
    }

    #[tokio::test]
    async fn test_missing_key_intersects_as_empty() {
        let cache = MemorySetCache::new();
        cache.save_set("a", &strings(&["x"]), TTL).await.unwrap();

        assert!(cache.intersect("a", "missing").await.unwrap().is_empty());
        assert!(cache.intersect("missing", "a").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_save_does_not_create_key() {
        let cache = MemorySetCache::new();
        cache.save_set("a", &[], TTL).await.unwrap();
        assert!(!cache.exists("a").await.unwrap());
    }

    #[tokio::test]
    async fn test_expired_key_is_gone() {
        let cache = MemorySetCache::new();
        cache.save_set("a", &strings(&["x"]), Duration::ZERO).await.unwrap();
        cache.save_set("b", &strings(&["x"]), TTL).await.unwrap();

        assert!(!cache.exists("a").await.unwrap());
        assert!(cache.intersect("a", "b").await.unwrap().is_empty());
        assert_eq!(cache.purge_expired().unwrap(), 1);
        assert_eq!(cache.key_count().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_expired_members_are_not_resurrected() {
        let cache = MemorySetCache::new();
        cache.save_set("a", &strings(&["old"]), Duration::ZERO).await.unwrap();
        cache.save_set("a", &strings(&["new"]), TTL).await.unwrap();

        assert_eq!(cache.members("a").unwrap(), strings(&["new"]));
    }

    #[tokio::test]
    async fn test_delete_keys() {
        let cache = MemorySetCache::new();
        cache.save_set("a", &strings(&["x"]), TTL).await.unwrap();

        cache.delete_keys(&["a", "never-existed"]).await.unwrap();
        assert!(!cache.exists("a").await.unwrap());
    }

    #[tokio::test]
    async fn test_intersect_scratch_cleans_up() {
        let cache = MemorySetCache::new();
        let keys = ScratchKeys::generate(&UserId::from("u"), ChannelId::new(1));

        let common = cache
            .intersect_scratch(&keys, &strings(&["a", "b"]), &strings(&["b", "c"]), TTL)
            .await
            .unwrap();

        assert_eq!(common, strings(&["b"]));
        assert_eq!(cache.key_count().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_ttl_out_of_range_leaves_cache_usable() {
        let cache = MemorySetCache::new();
        let huge = Duration::from_secs(u64::MAX);

        let err = cache.save_set("a", &strings(&["x"]), huge).await.unwrap_err();
        assert!(matches!(err, CacheError::TtlOutOfRange(ttl) if ttl == huge));

        // No panic under the lock, so nothing is poisoned
        cache.save_set("a", &strings(&["x"]), TTL).await.unwrap();
        cache.save_set("b", &strings(&["x"]), TTL).await.unwrap();
        assert_eq!(cache.intersect("a", "b").await.unwrap(), strings(&["x"]));
    }

    #[tokio::test]
    async fn test_delete_sweeps_expired() {
        let cache = MemorySetCache::new();
        cache.save_set("leaked", &strings(&["x", "y"]), Duration::ZERO).await.unwrap();
        cache.save_set("live", &strings(&["x"]), TTL).await.unwrap();

        cache.delete_keys(&["other"]).await.unwrap();

        assert_eq!(cache.purge_expired().unwrap(), 0);
        assert_eq!(cache.members("live").unwrap(), strings(&["x"]));
    }

    mod props {
        use super::*;
        use proptest::prelude::*;
        use std::collections::BTreeSet;

        fn member_set() -> impl Strategy<Value = BTreeSet<String>> {
            prop::collection::btree_set("[a-e][0-9]", 0..12)
        }

        proptest! {
            #[test]
            fn test_scratch_intersection_matches_sets(a in member_set(), b in member_set()) {
                let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
                let cache = MemorySetCache::new();
                let keys = ScratchKeys::generate(&UserId::from("u"), ChannelId::new(1));

                let a_list: Vec<String> = a.iter().cloned().collect();
                let b_list: Vec<String> = b.iter().cloned().collect();
                let common = rt
                    .block_on(cache.intersect_scratch(&keys, &a_list, &b_list, TTL))
                    .unwrap();

                let expected: Vec<String> = a.intersection(&b).cloned().collect();
                prop_assert_eq!(common, expected);
                prop_assert_eq!(cache.key_count().unwrap(), 0);
            }
        }
    }
}
