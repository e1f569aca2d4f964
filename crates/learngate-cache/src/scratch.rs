//! Scratch key naming for one-shot set intersections.
//!
//! Keys are namespaced by kind, by identifier and by a per-check nonce. The
//! nonce keeps two concurrent checks for the same (user, channel) pair from
//! writing into, or deleting, each other's sets.

use std::fmt;
use std::time::Duration;

use learngate_core::{ChannelId, UserId};

/// Prefix for the set of groups a user holds in the consulted role.
pub const USER_GROUPS_PREFIX: &str = "user_groups";

/// Prefix for the set of groups a channel is shared with.
pub const CHANNEL_SHARED_GROUPS_PREFIX: &str = "channel_shared_groups";

/// Default lifetime of a scratch key. Only a backstop for crashed checks;
/// a completed check deletes its keys explicitly.
pub const DEFAULT_SCRATCH_TTL: Duration = Duration::from_secs(60);

/// Longest lifetime a scratch key may be given.
pub const MAX_SCRATCH_TTL: Duration = Duration::from_secs(86_400);

/// The pair of keys one check writes, intersects and deletes.
#[derive(Clone, PartialEq, Eq)]
pub struct ScratchKeys {
    user_key: String,
    channel_key: String,
}

impl ScratchKeys {
    /// Build keys for a check with an explicit check ID.
    pub fn new(user_id: &UserId, channel_id: ChannelId, check_id: &str) -> Self {
        Self {
            user_key: format!("{USER_GROUPS_PREFIX}:{user_id}:{check_id}"),
            channel_key: format!("{CHANNEL_SHARED_GROUPS_PREFIX}:{channel_id}:{check_id}"),
        }
    }

    /// Build keys for a check with a fresh random check ID.
    pub fn generate(user_id: &UserId, channel_id: ChannelId) -> Self {
        Self::new(user_id, channel_id, &new_check_id())
    }

    pub fn user_key(&self) -> &str {
        &self.user_key
    }

    pub fn channel_key(&self) -> &str {
        &self.channel_key
    }

    /// Both keys, in the order they are written.
    pub fn both(&self) -> [&str; 2] {
        [&self.user_key, &self.channel_key]
    }
}

impl fmt::Debug for ScratchKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ScratchKeys")
            .field(&self.user_key)
            .field(&self.channel_key)
            .finish()
    }
}

/// Random 64-bit check ID, hex encoded.
pub fn new_check_id() -> String {
    hex::encode(rand::random::<[u8; 8]>())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_format() {
        let keys = ScratchKeys::new(&UserId::from("alice"), ChannelId::new(42), "abcd");
        assert_eq!(keys.user_key(), "user_groups:alice:abcd");
        assert_eq!(keys.channel_key(), "channel_shared_groups:42:abcd");
        assert_eq!(keys.both(), ["user_groups:alice:abcd", "channel_shared_groups:42:abcd"]);
    }

    #[test]
    fn test_generated_keys_are_unique_per_check() {
        let user = UserId::from("alice");
        let a = ScratchKeys::generate(&user, ChannelId::new(1));
        let b = ScratchKeys::generate(&user, ChannelId::new(1));
        assert_ne!(a, b);
        assert!(a.user_key().starts_with("user_groups:alice:"));
    }

    #[test]
    fn test_check_id_shape() {
        let id = new_check_id();
        assert_eq!(id.len(), 16);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
