//! # learngate testkit
//!
//! Testing utilities for learngate.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Fakes**: In-memory identity and content services that record every call
//! - **Fixtures**: Engines wired to the fakes, one per intersection strategy
//! - **Generators**: Proptest strategies for share-check scenarios, with an oracle
//!
//! ## Fakes
//!
//! ```rust
//! use learngate_testkit::fakes::FakeDirectory;
//!
//! let directory = FakeDirectory::new()
//!     .with_admin("alice", &["g1"])
//!     .with_channel_share(42, &["g1", "g2"])
//!     .with_plan_share(7, "alice");
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use learngate_testkit::generators::{expected_decision, ShareParams};
//!
//! proptest! {
//!     #[test]
//!     fn engine_agrees(params: ShareParams) {
//!         let expected = expected_decision(&params);
//!         // build an engine over params.directory() and compare
//!     }
//! }
//! ```

pub mod fakes;
pub mod fixtures;
pub mod generators;

pub use fakes::{CacheOp, Call, CallKind, FakeDirectory, FlakyCache};
pub use fixtures::{init_tracing, TestEngine, TestFixture};
pub use generators::{expected_decision, ShareParams};
