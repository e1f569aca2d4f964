//! Engine configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use learngate_cache::{DEFAULT_SCRATCH_TTL, MAX_SCRATCH_TTL};

use crate::error::{AuthzError, Result};

/// Where group set intersections are computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intersection {
    /// In process, in a per-call hash set. No shared state.
    #[default]
    Local,
    /// Through a [`learngate_cache::SetCache`], using per-check scratch keys.
    SharedCache,
}

/// What a share check does when a group lookup could not be answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownGroupsPolicy {
    /// Deny with [`learngate_core::DenyReason::GroupsUnavailable`].
    #[default]
    Deny,
    /// Fail the check with an internal error.
    Fail,
}

/// Configuration for the authorization engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Intersection strategy.
    pub intersection: Intersection,
    /// Policy for failed group lookups.
    pub unknown_groups: UnknownGroupsPolicy,
    /// TTL of scratch keys in the shared cache, in seconds. Between 1 and
    /// one day.
    pub scratch_ttl_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            intersection: Intersection::Local,
            unknown_groups: UnknownGroupsPolicy::Deny,
            scratch_ttl_secs: DEFAULT_SCRATCH_TTL.as_secs(),
        }
    }
}

impl EngineConfig {
    /// Parse from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| AuthzError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check internal consistency.
    pub fn validate(&self) -> Result<()> {
        if self.scratch_ttl_secs == 0 {
            return Err(AuthzError::Config(
                "scratch_ttl_secs must be at least 1".into(),
            ));
        }
        if self.scratch_ttl_secs > MAX_SCRATCH_TTL.as_secs() {
            return Err(AuthzError::Config(format!(
                "scratch_ttl_secs must be at most {}",
                MAX_SCRATCH_TTL.as_secs()
            )));
        }
        Ok(())
    }

    /// The scratch TTL, clamped into the range [`Self::validate`] accepts.
    ///
    /// Engines built with `new` skip validation, so an out-of-range value
    /// must still never reach the cache.
    pub fn scratch_ttl(&self) -> Duration {
        Duration::from_secs(self.scratch_ttl_secs.clamp(1, MAX_SCRATCH_TTL.as_secs()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.intersection, Intersection::Local);
        assert_eq!(config.unknown_groups, UnknownGroupsPolicy::Deny);
        assert_eq!(config.scratch_ttl(), Duration::from_secs(60));
    }

    #[test]
    fn test_from_json_partial() {
        let config = EngineConfig::from_json(r#"{ "intersection": "shared_cache" }"#).unwrap();
        assert_eq!(config.intersection, Intersection::SharedCache);
        assert_eq!(config.unknown_groups, UnknownGroupsPolicy::Deny);
        assert_eq!(config.scratch_ttl_secs, 60);
    }

    #[test]
    fn test_from_json_full() {
        let config = EngineConfig::from_json(
            r#"{ "intersection": "local", "unknown_groups": "fail", "scratch_ttl_secs": 30 }"#,
        )
        .unwrap();
        assert_eq!(config.unknown_groups, UnknownGroupsPolicy::Fail);
        assert_eq!(config.scratch_ttl(), Duration::from_secs(30));
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(matches!(
            EngineConfig::from_json(r#"{ "intersection": "redis" }"#),
            Err(AuthzError::Config(_))
        ));
        assert!(matches!(
            EngineConfig::from_json(r#"{ "scratch_ttl_secs": 0 }"#),
            Err(AuthzError::Config(_))
        ));
    }

    #[test]
    fn test_ttl_upper_bound() {
        assert!(EngineConfig::from_json(r#"{ "scratch_ttl_secs": 86400 }"#).is_ok());
        assert!(matches!(
            EngineConfig::from_json(r#"{ "scratch_ttl_secs": 86401 }"#),
            Err(AuthzError::Config(_))
        ));
        assert!(matches!(
            EngineConfig::from_json(
                r#"{ "intersection": "shared_cache", "scratch_ttl_secs": 18446744073709551615 }"#
            ),
            Err(AuthzError::Config(_))
        ));
    }

    #[test]
    fn test_scratch_ttl_is_clamped() {
        let config = |secs| EngineConfig {
            scratch_ttl_secs: secs,
            ..EngineConfig::default()
        };
        assert_eq!(config(0).scratch_ttl(), Duration::from_secs(1));
        assert_eq!(config(u64::MAX).scratch_ttl(), MAX_SCRATCH_TTL);
        assert_eq!(config(30).scratch_ttl(), Duration::from_secs(30));
    }
}
