//! Health and environment-validation endpoints

use axum::{Json, extract::State};

use weaver_core::dto::validate::ValidationSummary;

use crate::api::AppState;
use crate::config;

/// GET /health
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "weaver-server",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// GET /validate
/// Report every environment check without creating a job.
pub async fn validate_environment(State(state): State<AppState>) -> Json<ValidationSummary> {
    Json(config::validation_summary(&state.config))
}
