//! # learngate cache
//!
//! Ephemeral set storage for the learngate authorization engine.
//!
//! ## Overview
//!
//! The cache module abstracts keyed string sets behind the [`SetCache`]
//! trait. It is scratch space: a check writes two sets, intersects them and
//! deletes them. Nothing is meant to outlive the check; the TTL only reclaims
//! keys left behind by a crashed or cancelled check.
//!
//! ## Key Types
//!
//! - [`SetCache`] - The async trait: save, intersect, delete, exists
//! - [`SetCacheExt`] - The write, intersect, delete discipline in one call
//! - [`MemorySetCache`] - In-memory backend, private to one process
//! - [`SqliteSetCache`] - SQLite backend, shareable between processes on one host
//! - [`ScratchKeys`] - Per-check key names
//!
//! ## Usage
//!
//! ```rust,no_run
//! use learngate_cache::{MemorySetCache, ScratchKeys, SetCacheExt, DEFAULT_SCRATCH_TTL};
//! use learngate_core::{ChannelId, UserId};
//!
//! async fn example() {
//!     let cache = MemorySetCache::new();
//!     let keys = ScratchKeys::generate(&UserId::from("alice"), ChannelId::new(42));
//!
//!     let user_groups = vec!["a".to_string(), "b".to_string()];
//!     let channel_groups = vec!["b".to_string(), "c".to_string()];
//!
//!     let common = cache
//!         .intersect_scratch(&keys, &user_groups, &channel_groups, DEFAULT_SCRATCH_TTL)
//!         .await
//!         .unwrap();
//!     assert_eq!(common, vec!["b".to_string()]);
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **Per-check keys**: [`ScratchKeys`] embed a random check ID, so concurrent
//!   checks for the same (user, channel) pair never touch each other's sets.
//! - **Best-effort writes and deletes**: only the intersection itself can fail
//!   a check; see [`SetCacheExt::intersect_scratch`].

pub mod error;
pub mod memory;
pub mod migration;
pub mod scratch;
pub mod sqlite;
pub mod traits;

pub use error::{CacheError, Result};
pub use memory::MemorySetCache;
pub use scratch::{
    new_check_id, ScratchKeys, CHANNEL_SHARED_GROUPS_PREFIX, DEFAULT_SCRATCH_TTL, MAX_SCRATCH_TTL,
    USER_GROUPS_PREFIX,
};
pub use sqlite::SqliteSetCache;
pub use traits::{SetCache, SetCacheExt};
