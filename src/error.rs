//! Error taxonomy shared by both request flows.
//!
//! Every failure a caller can see is one of four kinds, plus storage errors
//! that only surface from the persistence layer:
//!
//! | kind                 | meaning                                       |
//! |----------------------|-----------------------------------------------|
//! | `validation_error`   | caller input rejected before any model call   |
//! | `generation_failure` | provider call failed (timeout, HTTP, empty)   |
//! | `schema_violation`   | model output is malformed or mis-shaped       |
//! | `rule_violation`     | well-formed output that breaks a domain rule  |

use thiserror::Error;

pub use crate::gateway::GenerationFailure;
pub use crate::rules::{RuleViolation, Violation};
pub use crate::schema::SchemaViolation;

#[derive(Debug, Error)]
pub enum Error {
    #[error("validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Generation(#[from] GenerationFailure),

    #[error(transparent)]
    Schema(#[from] SchemaViolation),

    #[error(transparent)]
    Rule(#[from] RuleViolation),

    #[error("storage failure: {0:#}")]
    Store(anyhow::Error),
}

impl Error {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Stable tag for the error kind, used in API responses and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::Generation(_) => "generation_failure",
            Self::Schema(_) => "schema_violation",
            Self::Rule(_) => "rule_violation",
            Self::Store(_) => "store_error",
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Reject empty or whitespace-only input fields.
pub(crate) fn require_text(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::validation(format!("{field} must not be empty")));
    }
    Ok(())
}
