//! Domain models for the methodology assistant.
//!
//! # Core Concepts
//!
//! ## Catalog Entries
//!
//! - [`Stage`]: One of six lifecycle phases. Its canonical goal, activities
//!   and example tasks live in [`crate::catalog::stages`].
//!
//! Adaptive rules and guiding principles are static data and live in
//! [`crate::catalog::rules`].
//!
//! ## Per-request Artifacts
//!
//! - [`GenerationRequest`]: A checked `(goal, stage)` pair.
//! - [`TaskCandidate`]: Model output that passed the output schema.
//! - [`GeneratedTask`]: A candidate that also passed the domain rules.
//!
//! ## Persisted Records
//!
//! - [`RuleExplanation`]: Cached explanation, keyed by rule title.
//! - [`GeneratedTaskRecord`]: History entry for every task handed out.

mod rule;
mod stage;
mod task;

pub use rule::*;
pub use stage::*;
pub use task::*;
