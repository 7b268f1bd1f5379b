//! API Module
//!
//! HTTP API layer for the server. Each submodule handles endpoints for a
//! specific concern.

pub mod error;
pub mod health;
pub mod job;

use std::sync::Arc;

use axum::{
    Router,
    routing::{delete, get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::Config;
use crate::llm::LlmProvider;
use crate::service::job::JobService;
use crate::store::JobStore;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub jobs: JobService,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config, provider: Arc<dyn LlmProvider>) -> Self {
        let config = Arc::new(config);
        Self { jobs: JobService::new(JobStore::new(), config.clone(), provider), config }
    }
}

/// Create the main API router with all endpoints
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // System
        .route("/health", get(health::health_check))
        .route("/validate", get(health::validate_environment))
        // Job submission
        .route("/generate/ui", post(job::create_ui_job))
        .route("/generate/agent", post(job::create_agent_job))
        // Job polling and retrieval
        .route("/jobs", get(job::list_jobs))
        .route("/job/{id}", get(job::get_job))
        .route("/job/{id}", delete(job::delete_job))
        .route("/job/{id}/bundle", get(job::get_bundle))
        .route("/job/{id}/file/{*path}", get(job::get_file))
        .route("/job/{id}/report", get(job::get_report))
        .route("/job/{id}/logs", get(job::get_job_logs))
        .route("/job/{id}/cancel", post(job::cancel_job))
        // Add state and middleware
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
