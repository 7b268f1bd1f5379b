//! Job service
//!
//! Owns job lifecycle rules: eager configuration checks before a job may be
//! created, which states may be cancelled, and what a caller may fetch from
//! a job in each status. The only Pending -> Running -> terminal mutation
//! path is the runner task spawned at creation.

use std::sync::Arc;

use uuid::Uuid;

use weaver_core::domain::bundle::FileBundle;
use weaver_core::domain::job::{JobKind, JobStatus};
use weaver_core::domain::log::LogEntry;
use weaver_core::domain::report::VerificationReport;
use weaver_core::dto::job::{CreateAgentJob, CreateUiJob, JobCreated, JobDetails, JobSummary};

use crate::config::Config;
use crate::llm::LlmProvider;
use crate::runner::Runner;
use crate::store::JobStore;

/// Service error type
#[derive(Debug, thiserror::Error)]
pub enum JobError {
    #[error("job {0} not found")]
    NotFound(Uuid),

    #[error("job {id} has no file '{path}'")]
    FileNotFound { id: Uuid, path: String },

    #[error("{0}")]
    InvalidState(String),

    #[error("server is not configured to run jobs: {0}")]
    Configuration(String),
}

#[derive(Clone)]
pub struct JobService {
    store: JobStore,
    config: Arc<Config>,
    provider: Arc<dyn LlmProvider>,
}

impl JobService {
    pub fn new(store: JobStore, config: Arc<Config>, provider: Arc<dyn LlmProvider>) -> Self {
        Self { store, config, provider }
    }

    /// Create and launch a UI-bundle job.
    pub async fn create_ui(&self, req: CreateUiJob) -> Result<JobCreated, JobError> {
        self.create(JobKind::UiBundle, req.into_params()).await
    }

    /// Create and launch an agent-bundle job.
    pub async fn create_agent(&self, req: CreateAgentJob) -> Result<JobCreated, JobError> {
        self.create(JobKind::AgentBundle, req.into_params()).await
    }

    async fn create(
        &self,
        kind: JobKind,
        params: std::collections::HashMap<String, serde_json::Value>,
    ) -> Result<JobCreated, JobError> {
        // Reject before creating anything: a job must never enter Running
        // only to fail on a missing credential after burning model calls.
        self.config.ensure_ready().map_err(JobError::Configuration)?;

        let job = self.store.create(kind, params).await;
        tracing::info!("Job created: {} ({:?})", job.id, kind);

        let runner =
            Runner::new(self.store.clone(), self.provider.clone(), self.config.stage_timeout);
        let job_id = job.id;
        tokio::spawn(async move {
            runner.run(job_id).await;
        });

        Ok(JobCreated { job_id: job.id, status: job.status })
    }

    pub async fn get(&self, id: Uuid) -> Result<JobDetails, JobError> {
        let job = self.store.get(id).await.ok_or(JobError::NotFound(id))?;
        Ok(JobDetails::from(&job))
    }

    pub async fn list(
        &self,
        kind: Option<JobKind>,
        status: Option<JobStatus>,
    ) -> Vec<JobSummary> {
        self.store.list(kind, status).await
    }

    /// Request cancellation; honored at the job's next stage boundary.
    pub async fn cancel(&self, id: Uuid) -> Result<(), JobError> {
        let job = self.store.get(id).await.ok_or(JobError::NotFound(id))?;
        if !self.store.request_cancel(id).await {
            return Err(JobError::InvalidState(format!(
                "job {} cannot be cancelled in state {:?}",
                id, job.status
            )));
        }
        tracing::info!("Job {} cancellation requested", id);
        Ok(())
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), JobError> {
        if !self.store.delete(id).await {
            return Err(JobError::NotFound(id));
        }
        tracing::info!("Job {} deleted", id);
        Ok(())
    }

    /// Full bundle of a Completed job.
    pub async fn bundle(&self, id: Uuid) -> Result<FileBundle, JobError> {
        let job = self.store.get(id).await.ok_or(JobError::NotFound(id))?;
        match job.result {
            Some(result) => Ok(result.bundle),
            None => Err(JobError::InvalidState(format!(
                "job {} has no bundle (status: {:?})",
                id, job.status
            ))),
        }
    }

    /// One file from a Completed job's bundle.
    pub async fn file(&self, id: Uuid, path: &str) -> Result<String, JobError> {
        let job = self.store.get(id).await.ok_or(JobError::NotFound(id))?;
        let result = job.result.ok_or_else(|| {
            JobError::InvalidState(format!("job {} has no bundle (status: {:?})", id, job.status))
        })?;
        result
            .bundle
            .get(path)
            .map(str::to_string)
            .ok_or_else(|| JobError::FileNotFound { id, path: path.to_string() })
    }

    /// Verification report of a Completed job.
    pub async fn report(&self, id: Uuid) -> Result<VerificationReport, JobError> {
        let job = self.store.get(id).await.ok_or(JobError::NotFound(id))?;
        match job.result {
            Some(result) => Ok(result.report),
            None => Err(JobError::InvalidState(format!(
                "job {} has no verification report (status: {:?})",
                id, job.status
            ))),
        }
    }

    /// Job log entries. `after` skips entries the caller has already seen,
    /// so a poll loop can tail the log incrementally.
    pub async fn logs(&self, id: Uuid, after: Option<usize>) -> Result<Vec<LogEntry>, JobError> {
        self.store.get(id).await.ok_or(JobError::NotFound(id))?;
        let logs = self.store.logs(id).await;
        Ok(match after {
            Some(seen) => logs.into_iter().skip(seen).collect(),
            None => logs,
        })
    }
}
