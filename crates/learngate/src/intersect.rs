//! Group set intersection strategies.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use learngate_cache::{CacheError, ScratchKeys, SetCache, SetCacheExt};
use learngate_core::{GroupId, PermissionQuery};

/// Computes the intersection of a user's groups and a channel's shared groups.
#[derive(Clone)]
pub(crate) enum Intersector {
    Local,
    Cache(Arc<dyn SetCache>),
}

impl Intersector {
    /// Intersect the two sets.
    ///
    /// If either side is empty the answer is known without touching the
    /// cache, so no scratch keys are written.
    pub(crate) async fn intersect(
        &self,
        query: &PermissionQuery,
        user_groups: &HashSet<GroupId>,
        channel_groups: &HashSet<GroupId>,
        ttl: Duration,
    ) -> Result<HashSet<GroupId>, CacheError> {
        if user_groups.is_empty() || channel_groups.is_empty() {
            return Ok(HashSet::new());
        }

        match self {
            Intersector::Local => Ok(intersect_local(user_groups, channel_groups)),
            Intersector::Cache(cache) => {
                let keys = ScratchKeys::generate(&query.user_id, query.channel_id);
                let common = cache
                    .intersect_scratch(
                        &keys,
                        &as_members(user_groups),
                        &as_members(channel_groups),
                        ttl,
                    )
                    .await?;
                Ok(common.into_iter().map(GroupId::from).collect())
            }
        }
    }
}

/// In-process intersection, iterating the smaller set.
pub fn intersect_local(a: &HashSet<GroupId>, b: &HashSet<GroupId>) -> HashSet<GroupId> {
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    small
        .iter()
        .filter(|g| large.contains(*g))
        .cloned()
        .collect()
}

fn as_members(groups: &HashSet<GroupId>) -> Vec<String> {
    groups.iter().map(|g| g.as_str().to_owned()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use learngate_cache::MemorySetCache;

    fn set(items: &[&str]) -> HashSet<GroupId> {
        items.iter().map(|s| GroupId::from(*s)).collect()
    }

    #[test]
    fn test_intersect_local() {
        assert_eq!(intersect_local(&set(&["a", "b"]), &set(&["b", "c"])), set(&["b"]));
        assert!(intersect_local(&set(&["x"]), &set(&["b", "c"])).is_empty());
        assert!(intersect_local(&set(&[]), &set(&["b"])).is_empty());
    }

    #[tokio::test]
    async fn test_strategies_agree() {
        let query = PermissionQuery::new("u", 1, 0);
        let cache = Arc::new(MemorySetCache::new());
        let strategies = [Intersector::Local, Intersector::Cache(cache.clone())];

        for strategy in &strategies {
            let common = strategy
                .intersect(
                    &query,
                    &set(&["a", "b", "c"]),
                    &set(&["c", "a", "z"]),
                    Duration::from_secs(60),
                )
                .await
                .unwrap();
            assert_eq!(common, set(&["a", "c"]));
        }

        assert_eq!(cache.key_count().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_empty_side_skips_cache() {
        let query = PermissionQuery::new("u", 1, 0);
        let cache = Arc::new(MemorySetCache::new());
        let strategy = Intersector::Cache(cache.clone());

        let common = strategy
            .intersect(&query, &set(&[]), &set(&["a"]), Duration::from_secs(60))
            .await
            .unwrap();
        assert!(common.is_empty());
    }
}
