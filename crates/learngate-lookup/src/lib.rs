//! # learngate lookup
//!
//! Collaborator ports for the learngate authorization engine.
//!
//! ## Overview
//!
//! The engine never talks to the identity or content service directly. It
//! consumes three narrow capability traits, so the gateway can plug in its
//! gRPC clients and tests can plug in in-memory fakes:
//!
//! - [`IdentityGroupLookup`] - admin/learner group membership, single-group admin check
//! - [`ContentSharingLookup`] - channel creator, channel shared groups, plan shares
//! - [`AttemptOwnership`] - lesson attempt ownership
//!
//! All ports are implemented for `Arc<T>`, so one client can serve many engines.
//!
//! ## Failures
//!
//! Ports return [`LookupError`] when they cannot answer. Group set fetches are
//! folded into [`GroupLookup`], which keeps "unknown" distinct from "empty".

pub mod error;
pub mod outcome;
pub mod ports;

pub use error::{LookupError, Result};
pub use outcome::GroupLookup;
pub use ports::{AttemptOwnership, ContentSharingLookup, IdentityGroupLookup};
