//! # learngate core
//!
//! Pure types for the learngate authorization engine: identifiers, permission
//! queries, validation and decisions.
//!
//! This crate contains no I/O and no async code. Everything here is created
//! and dropped within a single permission check.
//!
//! ## Key Types
//!
//! - [`PermissionQuery`] - `{ user_id, channel_id, plan_id }` handed to the engine
//! - [`Role`] - which group membership (admin or learner) a share check consults
//! - [`Decision`] - `Granted(reason)` or `Denied(reason)`
//! - [`UserId`], [`GroupId`], [`ChannelId`], [`PlanId`], [`LessonAttemptId`] - identifiers
//!
//! ## Plan sentinel
//!
//! Upstream requests encode "no plan" as plan `0`. [`PermissionQuery::new`]
//! folds that into `plan_id: None`, so a zero plan never reaches the engine.

pub mod decision;
pub mod error;
pub mod query;
pub mod types;
pub mod validation;

pub use decision::{Decision, DenyReason, GrantReason};
pub use error::{Result, ValidationError};
pub use query::{PermissionQuery, Role};
pub use types::{ChannelId, GroupId, LessonAttemptId, PlanId, UserId};
pub use validation::{
    validate_attempt, validate_channel, validate_group, validate_query, validate_user,
};
