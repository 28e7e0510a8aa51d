mod handlers;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::service::MethodologyService;

pub fn create_router(service: Arc<MethodologyService>) -> Router {
    let api = Router::new()
        // Methodology flows
        .route("/methodology/tasks", post(handlers::generate_task))
        .route("/methodology/rules/explain", post(handlers::explain_rule))
        // Catalogs
        .route("/stages", get(handlers::list_stages))
        .route("/stages/{stage}", get(handlers::get_stage))
        .route("/rules", get(handlers::list_rules))
        .route("/principles", get(handlers::list_principles))
        // History
        .route("/tasks/history", get(handlers::task_history))
        .route("/rules/explanations", get(handlers::list_explanations))
        // Health
        .route("/health", get(handlers::health));

    Router::new()
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(service)
}
