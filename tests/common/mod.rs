#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use methodology_assistant::config::GenerationConfig;
use methodology_assistant::db::Database;
use methodology_assistant::gateway::{GenerationFailure, Generator, ResponseFormat};
use methodology_assistant::models::*;
use methodology_assistant::prompt::Prompt;
use methodology_assistant::schema::encode_task;
use methodology_assistant::service::MethodologyService;

/// Generator that replays a fixed script of results and records what it
/// was asked. Once the script is down to one entry, that entry repeats.
pub struct ScriptedGenerator {
    results: Mutex<VecDeque<Result<String, GenerationFailure>>>,
    calls: AtomicUsize,
    delay: Duration,
    seen: Mutex<Vec<(Prompt, Option<ResponseFormat>)>>,
}

impl ScriptedGenerator {
    pub fn new(results: Vec<Result<String, GenerationFailure>>) -> Arc<Self> {
        Arc::new(Self::build(results, Duration::ZERO))
    }

    pub fn always(text: impl Into<String>) -> Arc<Self> {
        Self::new(vec![Ok(text.into())])
    }

    pub fn failing(failure: GenerationFailure) -> Arc<Self> {
        Self::new(vec![Err(failure)])
    }

    /// Sleep for `delay` before answering each call.
    pub fn slow(text: impl Into<String>, delay: Duration) -> Arc<Self> {
        Arc::new(Self::build(vec![Ok(text.into())], delay))
    }

    fn build(results: Vec<Result<String, GenerationFailure>>, delay: Duration) -> Self {
        assert!(!results.is_empty(), "script needs at least one result");
        Self {
            results: Mutex::new(results.into()),
            calls: AtomicUsize::new(0),
            delay,
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// The prompt and schema of the most recent call.
    pub fn last_call(&self) -> Option<(Prompt, Option<ResponseFormat>)> {
        self.seen.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl Generator for ScriptedGenerator {
    async fn generate(
        &self,
        prompt: &Prompt,
        schema: Option<&ResponseFormat>,
    ) -> Result<String, GenerationFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen
            .lock()
            .unwrap()
            .push((prompt.clone(), schema.cloned()));

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let mut results = self.results.lock().unwrap();
        if results.len() > 1 {
            results.pop_front().unwrap()
        } else {
            results.front().cloned().unwrap()
        }
    }
}

pub fn memory_db() -> Database {
    let db = Database::open_memory().expect("Failed to create in-memory database");
    db.migrate().expect("Failed to run migrations");
    db
}

/// Single attempt, generous deadline.
pub fn single_attempt() -> GenerationConfig {
    GenerationConfig {
        max_retries: 0,
        timeout_ms: 5_000,
        retry_backoff_ms: 0,
    }
}

pub fn service_with(generator: Arc<ScriptedGenerator>) -> MethodologyService {
    MethodologyService::with_generator(generator, single_attempt(), memory_db())
}

pub fn sample_task(estimate: i64) -> GeneratedTask {
    GeneratedTask {
        title: "Add response caching to the catalog endpoint".to_string(),
        description: "Cache stage catalog responses for 5 minutes and add a hit-rate metric."
            .to_string(),
        estimate,
        risk: Risk::Medium,
        priority: Priority::P1,
    }
}

pub fn task_json(estimate: i64) -> String {
    encode_task(&sample_task(estimate))
}
