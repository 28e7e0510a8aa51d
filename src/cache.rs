//! Memoization of rule explanations, keyed by rule title.
//!
//! Storage sits behind [`ExplanationStore`] so the cache does not care
//! whether entries live in SQLite or elsewhere. Within one process, misses
//! for the same title are serialized through a per-key lock: the first
//! caller generates, later callers wait and then read its entry. Misses for
//! different titles never wait on each other.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::error::Result;
use crate::models::RuleExplanation;

/// Persistence for cached explanations.
///
/// `put_explanation` must be visible to a `get_explanation` issued after it
/// returns.
pub trait ExplanationStore: Send + Sync {
    fn get_explanation(&self, rule_title: &str) -> anyhow::Result<Option<RuleExplanation>>;

    fn put_explanation(
        &self,
        rule_title: &str,
        rule_description: &str,
        explanation: &str,
    ) -> anyhow::Result<RuleExplanation>;
}

pub struct ExplanationCache {
    store: Arc<dyn ExplanationStore>,
    in_flight: Mutex<HashMap<String, KeyLock>>,
}

/// Per-title lock plus the number of callers holding or waiting on it.
struct KeyLock {
    lock: Arc<AsyncMutex<()>>,
    users: usize,
}

impl ExplanationCache {
    pub fn new(store: Arc<dyn ExplanationStore>) -> Self {
        Self {
            store,
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    /// Return the stored explanation for `rule_title`, or run `generate`,
    /// store its result and return it.
    ///
    /// Errors from `generate` are returned as-is and nothing is stored. An
    /// empty explanation is returned but not stored either, so the next call
    /// tries again. A failed write is logged; the caller still gets the text.
    pub async fn get_or_create<F, Fut>(
        &self,
        rule_title: &str,
        rule_text: &str,
        generate: F,
    ) -> Result<String>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<String>>,
    {
        if let Some(hit) = self.lookup(rule_title) {
            tracing::debug!(rule_title, "explanation cache hit");
            return Ok(hit.explanation);
        }

        let _in_flight = self.claim(rule_title).await;

        // Another caller may have filled the entry while we waited.
        if let Some(hit) = self.lookup(rule_title) {
            tracing::debug!(rule_title, "explanation cache hit after wait");
            return Ok(hit.explanation);
        }

        tracing::debug!(rule_title, "explanation cache miss");
        let explanation = generate().await?;

        if explanation.trim().is_empty() {
            tracing::debug!(rule_title, "empty explanation not cached");
            return Ok(explanation);
        }

        if let Err(e) = self
            .store
            .put_explanation(rule_title, rule_text, &explanation)
        {
            tracing::warn!(rule_title, error = %e, "failed to store explanation");
        }

        Ok(explanation)
    }

    /// Read an entry without generating. Store errors read as a miss.
    pub fn lookup(&self, rule_title: &str) -> Option<RuleExplanation> {
        match self.store.get_explanation(rule_title) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(rule_title, error = %e, "explanation lookup failed, treating as miss");
                None
            }
        }
    }

    /// Number of titles with a generation in flight or queued.
    pub fn in_flight_len(&self) -> usize {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    async fn claim(&self, rule_title: &str) -> InFlight<'_> {
        let lock = {
            let mut in_flight = self.in_flight.lock().expect("in-flight lock poisoned");
            let entry = in_flight
                .entry(rule_title.to_string())
                .or_insert_with(|| KeyLock {
                    lock: Arc::new(AsyncMutex::new(())),
                    users: 0,
                });
            entry.users += 1;
            entry.lock.clone()
        };

        // Registered before waiting, so a caller dropped mid-wait still
        // releases its count.
        let mut claimed = InFlight {
            cache: self,
            key: rule_title.to_string(),
            guard: None,
        };
        claimed.guard = Some(lock.lock_owned().await);
        claimed
    }
}

/// One caller's claim on a per-key lock. `guard` is `None` while waiting.
/// The last claim for a key removes its map entry.
struct InFlight<'a> {
    cache: &'a ExplanationCache,
    key: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.guard.take();

        let mut in_flight = self
            .cache
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(entry) = in_flight.get_mut(&self.key) {
            entry.users -= 1;
            if entry.users == 0 {
                in_flight.remove(&self.key);
            }
        }
    }
}
