//! Static methodology catalogs.
//!
//! Both catalogs are compiled-in tables indexed by their key, so lookups
//! never allocate and never fail for a valid [`crate::models::Stage`].

pub mod rules;
pub mod stages;

pub use rules::{Principle, Rule, PRINCIPLES, RULES, SPLIT_RULE_TITLE};
pub use stages::{StageInfo, STAGES};
