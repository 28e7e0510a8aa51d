//! Orchestration of the two request flows.
//!
//! Task generation: validate input, build prompts, call the model with the
//! output schema attached, check the output against the schema and then the
//! domain rules, record the task. Every failure is returned to the caller.
//!
//! Rule explanation: validate input, then go through the explanation cache,
//! generating on a miss. Here a model failure is *not* returned: the caller
//! gets an empty explanation instead. The asymmetry is deliberate and must
//! be kept when either flow changes. Input validation errors are still
//! returned on both paths.

use std::sync::Arc;

use crate::cache::ExplanationCache;
use crate::catalog::rules;
use crate::db::Database;
use crate::error::{require_text, Error, Result};
use crate::gateway::{GenerationGateway, Generator};
use crate::models::*;
use crate::prompt::{build_explanation_prompt, build_task_prompt};
use crate::rules::RuleEngine;
use crate::schema;

impl TryFrom<GenerateTaskInput> for GenerationRequest {
    type Error = Error;

    fn try_from(input: GenerateTaskInput) -> Result<Self> {
        require_text("goal", &input.goal)?;
        let stage = Stage::from_str(&input.stage).ok_or_else(|| {
            Error::validation(format!(
                "unknown stage {:?}, expected one of: discover, plan, implement, verify, operate, improve",
                input.stage
            ))
        })?;
        Ok(Self {
            goal: input.goal,
            stage,
        })
    }
}

pub struct MethodologyService {
    gateway: GenerationGateway,
    rule_engine: RuleEngine,
    cache: ExplanationCache,
    db: Database,
}

impl MethodologyService {
    pub fn new(gateway: GenerationGateway, db: Database) -> Self {
        Self {
            gateway,
            rule_engine: RuleEngine::default(),
            cache: ExplanationCache::new(Arc::new(db.clone())),
            db,
        }
    }

    /// Convenience constructor over a bare generator.
    pub fn with_generator(
        generator: Arc<dyn Generator>,
        config: crate::config::GenerationConfig,
        db: Database,
    ) -> Self {
        Self::new(GenerationGateway::new(generator, config), db)
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn cache(&self) -> &ExplanationCache {
        &self.cache
    }

    /// Generate one validated task for `input.goal` in `input.stage`.
    pub async fn generate_task(&self, input: GenerateTaskInput) -> Result<GeneratedTask> {
        let request = GenerationRequest::try_from(input)?;
        let stage = request.stage;

        let prompt = build_task_prompt(&request.goal, stage);
        let contract = schema::task_response_format();

        let raw = self.gateway.generate(&prompt, Some(&contract)).await?;

        let candidate = schema::validate_task_output(&raw).inspect_err(|e| {
            tracing::warn!(stage = %stage, error = %e, "model output failed schema check");
        })?;

        let task = self.rule_engine.validate_task(&candidate).inspect_err(|e| {
            tracing::warn!(stage = %stage, error = %e, "model output broke a domain rule");
        })?;

        if let Err(e) = self.db.record_generated_task(stage, &request.goal, &task) {
            tracing::warn!(error = %e, "failed to record generated task");
        }

        tracing::info!(stage = %stage, title = %task.title, estimate = task.estimate, "task generated");
        Ok(task)
    }

    /// Explain a rule, using the cache. Falls back to an empty explanation
    /// when the model cannot produce one.
    pub async fn explain_rule(&self, input: ExplainRuleInput) -> Result<ExplainRuleResponse> {
        require_text("ruleTitle", &input.rule_title)?;
        require_text("ruleText", &input.rule_text)?;

        let title = input.rule_title.as_str();
        let text = input.rule_text.as_str();

        let generated = self
            .cache
            .get_or_create(title, text, || async move {
                let prompt = build_explanation_prompt(title, text);
                Ok(self.gateway.generate(&prompt, None).await?)
            })
            .await;

        let explanation = match generated {
            Ok(explanation) => explanation,
            Err(e) => {
                tracing::warn!(rule_title = title, error = %e, "explanation unavailable, returning empty text");
                String::new()
            }
        };

        Ok(ExplainRuleResponse { explanation })
    }

    /// Explain a catalog rule looked up by its exact title.
    pub async fn explain_catalog_rule(&self, title: &str) -> Result<ExplainRuleResponse> {
        let rule = rules::find(title)
            .ok_or_else(|| Error::validation(format!("unknown rule {title:?}")))?;
        self.explain_rule(ExplainRuleInput {
            rule_title: rule.title.to_string(),
            rule_text: rule.description.to_string(),
        })
        .await
    }

    pub fn task_history(&self, query: &TaskHistoryQuery) -> Result<Vec<GeneratedTaskRecord>> {
        let stage = match query.stage.as_deref() {
            Some(s) => Some(
                Stage::from_str(s)
                    .ok_or_else(|| Error::validation(format!("unknown stage {s:?}")))?,
            ),
            None => None,
        };
        self.db
            .list_generated_tasks(stage, query.limit)
            .map_err(Error::Store)
    }

    pub fn cached_explanations(&self) -> Result<Vec<RuleExplanation>> {
        self.db.list_rule_explanations().map_err(Error::Store)
    }
}
