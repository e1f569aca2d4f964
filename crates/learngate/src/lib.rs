//! # learngate
//!
//! Authorization engine for the learning-platform API gateway.
//!
//! ## Overview
//!
//! The gateway fronts an identity service and a content service. Before it
//! lets a request mutate or read a channel, a plan or a lesson attempt, it
//! asks the [`AuthorizationEngine`]:
//!
//! - **Creator fast path**: the channel creator is always allowed.
//! - **Group share**: otherwise the user's admin (or learner) groups must
//!   overlap the groups the channel is shared with.
//! - **Plan gate**: if a plan is named, it must also be shared with the user.
//!
//! Lesson attempt ownership and group admin checks are single delegated calls.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use learngate::{AuthorizationEngine, EngineConfig, PermissionQuery};
//!
//! async fn example(identity: Identity, sharing: Sharing, attempts: Attempts) {
//!     let engine = AuthorizationEngine::new(identity, sharing, attempts, EngineConfig::default());
//!
//!     // Gate an update of channel 42, plan 7
//!     let query = PermissionQuery::new("user-1", 42, 7);
//!     let decision = engine.check_creator_or_admin_and_share(&query).await?;
//!
//!     // Or turn a denial straight into an error
//!     decision.into_result()?;
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `learngate::core` - identifiers, queries, decisions
//! - `learngate::cache` - the scratch set cache
//! - `learngate::lookup` - collaborator ports

pub mod config;
pub mod engine;
pub mod error;
pub mod intersect;

// Re-export component crates
pub use learngate_cache as cache;
pub use learngate_core as core;
pub use learngate_lookup as lookup;

// Re-export main types for convenience
pub use config::{EngineConfig, Intersection, UnknownGroupsPolicy};
pub use engine::AuthorizationEngine;
pub use error::{AuthzError, ErrorKind, LookupStep, Result};
pub use intersect::intersect_local;

// Re-export commonly used component types
pub use learngate_cache::{MemorySetCache, SetCache, SqliteSetCache};
pub use learngate_core::{
    ChannelId, Decision, DenyReason, GrantReason, GroupId, LessonAttemptId, PermissionQuery,
    PlanId, Role, UserId,
};
pub use learngate_lookup::{
    AttemptOwnership, ContentSharingLookup, GroupLookup, IdentityGroupLookup, LookupError,
};
