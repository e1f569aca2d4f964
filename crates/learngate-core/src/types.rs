//! Strong type definitions for the authorization engine.
//!
//! All identifiers are newtypes to prevent mixing a channel ID with a plan ID
//! (or a user ID with a group ID) at compile time.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of an authenticated principal, as issued by the identity service.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Create a new UserId. Emptiness is checked by validation, not here.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the identifier is empty (never valid in a query).
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UserId({})", self.0)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for UserId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Opaque identifier of an administrative or learning group.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(String);

impl GroupId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GroupId({})", self.0)
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for GroupId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for GroupId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            /// Wrap a raw identifier.
            pub const fn new(id: u64) -> Self {
                Self(id)
            }

            /// Get the raw identifier.
            pub const fn get(&self) -> u64 {
                self.0
            }

            /// Whether this is the zero identifier.
            pub const fn is_zero(&self) -> bool {
                self.0 == 0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self(id)
            }
        }
    };
}

numeric_id!(
    /// Identifier of a channel in the content service. Zero is never valid.
    ChannelId
);

numeric_id!(
    /// Identifier of a lesson attempt. Zero is never valid.
    LessonAttemptId
);

numeric_id!(
    /// Identifier of a plan under a channel.
    ///
    /// On the wire `0` means "no plan". Use [`PlanId::from_raw`] to turn the
    /// sentinel into `None` rather than carrying a zero plan around.
    PlanId
);

impl PlanId {
    /// Convert a raw wire value, mapping the `0` sentinel to `None`.
    pub const fn from_raw(raw: u64) -> Option<Self> {
        if raw == 0 {
            None
        } else {
            Some(Self(raw))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_sentinel() {
        assert_eq!(PlanId::from_raw(0), None);
        assert_eq!(PlanId::from_raw(7), Some(PlanId::new(7)));
    }

    #[test]
    fn test_display_is_raw_value() {
        assert_eq!(ChannelId::new(42).to_string(), "42");
        assert_eq!(UserId::from("u-1").to_string(), "u-1");
        assert_eq!(GroupId::from("g-1").to_string(), "g-1");
    }

    #[test]
    fn test_debug_names_the_type() {
        assert_eq!(format!("{:?}", ChannelId::new(3)), "ChannelId(3)");
        assert_eq!(format!("{:?}", UserId::from("alice")), "UserId(alice)");
    }

    #[test]
    fn test_serde_transparent() {
        let json = serde_json::to_string(&ChannelId::new(9)).unwrap();
        assert_eq!(json, "9");
        let user: UserId = serde_json::from_str("\"bob\"").unwrap();
        assert_eq!(user.as_str(), "bob");
    }
}
