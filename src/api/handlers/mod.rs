use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::{json, Value};

use crate::catalog::{Principle, Rule, StageInfo, PRINCIPLES, RULES, STAGES};
use crate::error::{Error, GenerationFailure};
use crate::models::*;
use crate::service::MethodologyService;

type ApiError = (StatusCode, Json<Value>);

// ============================================================
// Error Handling
// ============================================================

/// Map a service error to a status code and a JSON body.
///
/// Storage failures are logged in full but reported to the client with a
/// generic message.
pub(crate) fn error_response(e: Error) -> ApiError {
    let status = match &e {
        Error::Validation(_) => StatusCode::BAD_REQUEST,
        Error::Rule(_) => StatusCode::UNPROCESSABLE_ENTITY,
        Error::Schema(_) => StatusCode::BAD_GATEWAY,
        Error::Generation(GenerationFailure::Timeout { .. }) => StatusCode::GATEWAY_TIMEOUT,
        Error::Generation(_) => StatusCode::BAD_GATEWAY,
        Error::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    let message = match &e {
        Error::Store(inner) => {
            tracing::error!("Internal error: {:#}", inner);
            "Internal server error".to_string()
        }
        other => {
            tracing::warn!(kind = other.kind(), "Request failed: {}", other);
            other.to_string()
        }
    };

    let mut body = json!({ "error": e.kind(), "message": message });
    if let Error::Rule(violation) = &e {
        body["violations"] = json!(violation.violations);
    }

    (status, Json(body))
}

/// Unwrap a JSON body, reporting a malformed one as a validation error.
fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(input)| input)
        .map_err(|rejection| error_response(Error::validation(rejection.body_text())))
}

fn not_found(message: &str) -> ApiError {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "not_found", "message": message })),
    )
}

// ============================================================
// Health
// ============================================================

pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

// ============================================================
// Methodology flows
// ============================================================

pub async fn generate_task(
    State(service): State<Arc<MethodologyService>>,
    payload: Result<Json<GenerateTaskInput>, JsonRejection>,
) -> Result<Json<GeneratedTask>, ApiError> {
    let input = json_body(payload)?;
    service
        .generate_task(input)
        .await
        .map(Json)
        .map_err(error_response)
}

pub async fn explain_rule(
    State(service): State<Arc<MethodologyService>>,
    payload: Result<Json<ExplainRuleInput>, JsonRejection>,
) -> Result<Json<ExplainRuleResponse>, ApiError> {
    let input = json_body(payload)?;
    service
        .explain_rule(input)
        .await
        .map(Json)
        .map_err(error_response)
}

// ============================================================
// Catalogs
// ============================================================

pub async fn list_stages() -> Json<&'static [StageInfo]> {
    Json(&STAGES[..])
}

pub async fn get_stage(Path(stage): Path<String>) -> Result<Json<&'static StageInfo>, ApiError> {
    Stage::from_str(&stage)
        .map(|s| Json(s.info()))
        .ok_or_else(|| not_found("Stage not found"))
}

pub async fn list_rules() -> Json<&'static [Rule]> {
    Json(&RULES[..])
}

pub async fn list_principles() -> Json<&'static [Principle]> {
    Json(&PRINCIPLES[..])
}

// ============================================================
// History
// ============================================================

pub async fn task_history(
    State(service): State<Arc<MethodologyService>>,
    query: Result<Query<TaskHistoryQuery>, QueryRejection>,
) -> Result<Json<Vec<GeneratedTaskRecord>>, ApiError> {
    let Query(query) =
        query.map_err(|rejection| error_response(Error::validation(rejection.body_text())))?;
    service
        .task_history(&query)
        .map(Json)
        .map_err(error_response)
}

pub async fn list_explanations(
    State(service): State<Arc<MethodologyService>>,
) -> Result<Json<Vec<RuleExplanation>>, ApiError> {
    service
        .cached_explanations()
        .map(Json)
        .map_err(error_response)
}
