//! Test fixtures and helpers.
//!
//! Common setup code for engine tests.

use std::sync::Arc;

use learngate::{AuthorizationEngine, EngineConfig};
use learngate_cache::{MemorySetCache, SetCache};

use crate::fakes::FakeDirectory;

/// An engine wired to fake collaborators.
pub type TestEngine = AuthorizationEngine<FakeDirectory, FakeDirectory, FakeDirectory>;

/// A fake directory plus a memory cache, ready to build engines from.
pub struct TestFixture {
    pub directory: FakeDirectory,
    pub cache: Arc<MemorySetCache>,
    pub config: EngineConfig,
}

impl TestFixture {
    /// Create a fixture with an empty directory.
    pub fn new() -> Self {
        Self::with_directory(FakeDirectory::new())
    }

    /// Create a fixture around a prepared directory.
    pub fn with_directory(directory: FakeDirectory) -> Self {
        Self {
            directory,
            cache: Arc::new(MemorySetCache::new()),
            config: EngineConfig::default(),
        }
    }

    /// Replace the engine configuration.
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Engine intersecting in process.
    pub fn local_engine(&self) -> TestEngine {
        AuthorizationEngine::new(
            self.directory.clone(),
            self.directory.clone(),
            self.directory.clone(),
            self.config.clone(),
        )
    }

    /// Engine intersecting through the fixture's memory cache.
    pub fn cached_engine(&self) -> TestEngine {
        self.engine_with_cache(self.cache.clone())
    }

    /// Engine intersecting through an arbitrary cache.
    pub fn engine_with_cache(&self, cache: Arc<dyn SetCache>) -> TestEngine {
        self.local_engine().with_set_cache(cache)
    }

    /// One engine per intersection strategy.
    pub fn engines(&self) -> [TestEngine; 2] {
        [self.local_engine(), self.cached_engine()]
    }

    /// Live scratch keys left in the fixture's cache.
    pub fn leftover_keys(&self) -> usize {
        self.cache.key_count().unwrap_or(usize::MAX)
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Install a test-friendly tracing subscriber. Safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing_subscriber::filter::LevelFilter::DEBUG)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use learngate::{Decision, GrantReason, Intersection, PermissionQuery};

    #[tokio::test]
    async fn test_fixture_engines() {
        let fixture = TestFixture::with_directory(FakeDirectory::new().with_creator("u", 1));
        let [local, cached] = fixture.engines();

        assert_eq!(local.config().intersection, Intersection::Local);
        assert_eq!(cached.config().intersection, Intersection::SharedCache);

        for engine in [local, cached] {
            let decision = engine
                .check_creator_or_admin_and_share(&PermissionQuery::new("u", 1, 0))
                .await
                .unwrap();
            assert_eq!(decision, Decision::Granted(GrantReason::ChannelCreator));
        }
        assert_eq!(fixture.leftover_keys(), 0);
    }
}
