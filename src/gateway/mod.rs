//! Generation gateway: the only place this crate talks to a language model.
//!
//! ```text
//! MethodologyService
//!     |
//!     v
//! GenerationGateway --(timeout, retries)--> &dyn Generator
//!                                               |
//!                                               +-- ProviderClient (HTTP)
//!                                               +-- test doubles
//! ```
//!
//! The [`Generator`] trait is the narrow capability seam: one call, one
//! prompt pair, an optional structured-output constraint, raw text back.
//! [`GenerationGateway`] wraps any generator with the per-call deadline and
//! the retry policy from [`GenerationConfig`]. Nothing is cached here.

pub mod client;
pub mod types;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::GenerationConfig;
use crate::prompt::Prompt;

pub use client::ProviderClient;
pub use types::{ChatMessage, ChatRequest, ChatResponse, ResponseFormat, Role};

/// The provider call failed; no usable output was produced.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GenerationFailure {
    #[error("generation timed out after {after_ms}ms")]
    Timeout { after_ms: u64 },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("provider returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed provider envelope: {0}")]
    MalformedEnvelope(String),

    #[error("no response from model")]
    EmptyResponse,
}

impl GenerationFailure {
    /// Whether another attempt could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout { .. } | Self::Transport(_) => true,
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            Self::MalformedEnvelope(_) | Self::EmptyResponse => false,
        }
    }
}

/// A language model that turns a prompt pair into raw text.
///
/// When `schema` is given, implementations pass it to the provider as a
/// structured-output constraint. Callers must still validate the output:
/// provider-side enforcement is advisory.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(
        &self,
        prompt: &Prompt,
        schema: Option<&ResponseFormat>,
    ) -> Result<String, GenerationFailure>;
}

// Compile-time assertion: Generator must be object-safe.
const _: () = {
    fn _assert_object_safe(_: &dyn Generator) {}
};

/// Applies the per-call deadline and retry policy around a [`Generator`].
#[derive(Clone)]
pub struct GenerationGateway {
    generator: Arc<dyn Generator>,
    config: GenerationConfig,
}

impl GenerationGateway {
    pub fn new(generator: Arc<dyn Generator>, config: GenerationConfig) -> Self {
        Self { generator, config }
    }

    /// Run one generation, retrying retryable failures up to
    /// `max_retries` extra times.
    pub async fn generate(
        &self,
        prompt: &Prompt,
        schema: Option<&ResponseFormat>,
    ) -> Result<String, GenerationFailure> {
        let attempts = self.config.max_retries.saturating_add(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            tracing::debug!(attempt, attempts, structured = schema.is_some(), "generation attempt");

            match self.attempt(prompt, schema).await {
                Ok(text) => return Ok(text),
                Err(e) if e.is_retryable() && attempt < attempts => {
                    tracing::warn!(attempt, attempts, error = %e, "generation failed, retrying");
                    let backoff = self.backoff(attempt);
                    if !backoff.is_zero() {
                        tokio::time::sleep(backoff).await;
                    }
                }
                Err(e) => {
                    tracing::warn!(attempt, error = %e, "generation failed");
                    return Err(e);
                }
            }
        }
    }

    async fn attempt(
        &self,
        prompt: &Prompt,
        schema: Option<&ResponseFormat>,
    ) -> Result<String, GenerationFailure> {
        let call = self.generator.generate(prompt, schema);
        // A zero timeout disables the deadline.
        if self.config.timeout_ms == 0 {
            return call.await;
        }

        let deadline = Duration::from_millis(self.config.timeout_ms);
        match tokio::time::timeout(deadline, call).await {
            Ok(result) => result,
            Err(_) => Err(GenerationFailure::Timeout {
                after_ms: self.config.timeout_ms,
            }),
        }
    }

    /// Exponential backoff: `retry_backoff_ms * 2^(attempt - 1)`.
    fn backoff(&self, attempt: u32) -> Duration {
        let factor = 1u64 << (attempt.saturating_sub(1)).min(16);
        Duration::from_millis(self.config.retry_backoff_ms.saturating_mul(factor))
    }
}
