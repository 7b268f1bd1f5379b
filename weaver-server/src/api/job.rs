//! Job API Handlers
//!
//! HTTP endpoints for job submission, polling and retrieval.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use uuid::Uuid;

use weaver_core::domain::bundle::FileBundle;
use weaver_core::domain::job::{JobKind, JobStatus};
use weaver_core::domain::log::LogEntry;
use weaver_core::domain::report::VerificationReport;
use weaver_core::dto::job::{CreateAgentJob, CreateUiJob, JobCreated, JobDetails, JobSummary};

use crate::api::AppState;
use crate::api::error::{ApiError, ApiResult};

/// POST /generate/ui
/// Create and launch a UI-bundle generation job.
pub async fn create_ui_job(
    State(state): State<AppState>,
    Json(req): Json<CreateUiJob>,
) -> ApiResult<(StatusCode, Json<JobCreated>)> {
    if req.agent_description.trim().is_empty() {
        return Err(ApiError::BadRequest("agent_description is required".to_string()));
    }
    if req.agent_capabilities.is_empty() {
        return Err(ApiError::BadRequest("agent_capabilities is required".to_string()));
    }

    tracing::info!("Launching UI generation job");
    let created = state.jobs.create_ui(req).await?;
    Ok((StatusCode::ACCEPTED, Json(created)))
}

/// POST /generate/agent
/// Create and launch an agent-bundle generation job.
pub async fn create_agent_job(
    State(state): State<AppState>,
    Json(req): Json<CreateAgentJob>,
) -> ApiResult<(StatusCode, Json<JobCreated>)> {
    if req.idea.trim().is_empty() {
        return Err(ApiError::BadRequest("idea is required".to_string()));
    }

    tracing::info!("Launching agent generation job");
    let created = state.jobs.create_agent(req).await?;
    Ok((StatusCode::ACCEPTED, Json(created)))
}

#[derive(Debug, Deserialize)]
pub struct ListJobsQuery {
    pub kind: Option<String>,
    pub status: Option<String>,
}

/// GET /jobs?kind=&status=
pub async fn list_jobs(
    State(state): State<AppState>,
    Query(query): Query<ListJobsQuery>,
) -> ApiResult<Json<Vec<JobSummary>>> {
    let kind = query
        .kind
        .map(|k| k.parse::<JobKind>())
        .transpose()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let status = query
        .status
        .map(|s| s.parse::<JobStatus>())
        .transpose()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    Ok(Json(state.jobs.list(kind, status).await))
}

/// GET /job/{id}
pub async fn get_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<JobDetails>> {
    tracing::debug!("Getting job: {}", id);
    Ok(Json(state.jobs.get(id).await?))
}

/// GET /job/{id}/bundle
/// Full path -> content mapping; only available once the job is Completed.
pub async fn get_bundle(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<FileBundle>> {
    Ok(Json(state.jobs.bundle(id).await?))
}

/// GET /job/{id}/file/{*path}
/// Raw content of one bundle file; only available once the job is Completed.
pub async fn get_file(
    State(state): State<AppState>,
    Path((id, path)): Path<(Uuid, String)>,
) -> ApiResult<String> {
    Ok(state.jobs.file(id, &path).await?)
}

/// GET /job/{id}/report
pub async fn get_report(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<VerificationReport>> {
    Ok(Json(state.jobs.report(id).await?))
}

#[derive(Debug, Deserialize)]
pub struct LogsQuery {
    /// Number of entries the caller has already seen.
    pub after: Option<usize>,
}

/// GET /job/{id}/logs?after=
/// With `after`, returns only entries past that cursor, so pollers can tail
/// the log without refetching it whole.
pub async fn get_job_logs(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<LogsQuery>,
) -> ApiResult<Json<Vec<LogEntry>>> {
    Ok(Json(state.jobs.logs(id, query.after).await?))
}

/// POST /job/{id}/cancel
/// Honored at the job's next stage boundary.
pub async fn cancel_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.jobs.cancel(id).await?;
    Ok(StatusCode::ACCEPTED)
}

/// DELETE /job/{id}
pub async fn delete_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.jobs.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
