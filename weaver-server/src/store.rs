//! In-memory job store
//!
//! Jobs live for the process lifetime; there is no persistence. The store
//! is the only shared mutable state in the server: the API creates, lists,
//! deletes and flags jobs, and exactly one runner task mutates any given
//! job while it executes. Terminal jobs are never mutated again; the
//! terminal-update helpers are deliberately no-ops once a job is Completed,
//! Failed or Cancelled (or has been deleted out from under a runner).

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;

use weaver_core::domain::job::{Job, JobKind, JobResult, JobStatus};
use weaver_core::domain::log::LogEntry;
use weaver_core::dto::job::JobSummary;

#[derive(Clone, Default)]
pub struct JobStore {
    jobs: Arc<RwLock<HashMap<Uuid, Job>>>,
    logs: Arc<RwLock<HashMap<Uuid, Vec<LogEntry>>>>,
}

impl JobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a new Pending job.
    pub async fn create(
        &self,
        kind: JobKind,
        parameters: HashMap<String, serde_json::Value>,
    ) -> Job {
        let job = Job {
            id: Uuid::new_v4(),
            kind,
            status: JobStatus::Pending,
            created_at: chrono::Utc::now(),
            completed_at: None,
            parameters,
            result: None,
            error: None,
            cancel_requested: false,
        };
        self.jobs.write().await.insert(job.id, job.clone());
        job
    }

    pub async fn get(&self, id: Uuid) -> Option<Job> {
        self.jobs.read().await.get(&id).cloned()
    }

    /// Summaries of all jobs matching the filters, newest first.
    pub async fn list(&self, kind: Option<JobKind>, status: Option<JobStatus>) -> Vec<JobSummary> {
        let jobs = self.jobs.read().await;
        let mut summaries: Vec<JobSummary> = jobs
            .values()
            .filter(|j| kind.is_none_or(|k| j.kind == k))
            .filter(|j| status.is_none_or(|s| j.status == s))
            .map(JobSummary::from)
            .collect();
        summaries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        summaries
    }

    /// Remove a job and its logs. Returns false when the id is unknown.
    /// A running job's runner observes the removal at its next stage
    /// boundary and stops.
    pub async fn delete(&self, id: Uuid) -> bool {
        let removed = self.jobs.write().await.remove(&id).is_some();
        if removed {
            self.logs.write().await.remove(&id);
        }
        removed
    }

    /// Flag a job for cancellation. Returns false for unknown or already
    /// terminal jobs. The runner honors the flag at the next stage boundary.
    pub async fn request_cancel(&self, id: Uuid) -> bool {
        let mut jobs = self.jobs.write().await;
        match jobs.get_mut(&id) {
            Some(job) if !job.is_terminal() => {
                job.cancel_requested = true;
                true
            }
            _ => false,
        }
    }

    /// Whether the runner should stop before its next stage: the job was
    /// deleted or cancellation was requested.
    pub async fn should_abort(&self, id: Uuid) -> bool {
        match self.jobs.read().await.get(&id) {
            Some(job) => job.cancel_requested,
            None => true,
        }
    }

    // =========================================================================
    // Runner-only mutations
    // =========================================================================

    pub async fn mark_running(&self, id: Uuid) {
        let mut jobs = self.jobs.write().await;
        if let Some(job) = jobs.get_mut(&id) {
            if job.status == JobStatus::Pending {
                job.status = JobStatus::Running;
            }
        }
    }

    pub async fn complete(&self, id: Uuid, result: JobResult) {
        self.finish(id, |job| {
            job.status = JobStatus::Completed;
            job.result = Some(result);
        })
        .await;
    }

    pub async fn fail(&self, id: Uuid, error: String) {
        self.finish(id, |job| {
            job.status = JobStatus::Failed;
            job.error = Some(error);
        })
        .await;
    }

    pub async fn mark_cancelled(&self, id: Uuid) {
        self.finish(id, |job| {
            job.status = JobStatus::Cancelled;
        })
        .await;
    }

    async fn finish(&self, id: Uuid, apply: impl FnOnce(&mut Job)) {
        let mut jobs = self.jobs.write().await;
        if let Some(job) = jobs.get_mut(&id) {
            if job.is_terminal() {
                tracing::warn!("Ignoring terminal-state update for finished job {}", id);
                return;
            }
            apply(job);
            job.completed_at = Some(chrono::Utc::now());
        }
    }

    // =========================================================================
    // Job logs
    // =========================================================================

    pub async fn append_log(&self, id: Uuid, entry: LogEntry) {
        self.logs.write().await.entry(id).or_default().push(entry);
    }

    pub async fn logs(&self, id: Uuid) -> Vec<LogEntry> {
        self.logs.read().await.get(&id).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use weaver_core::domain::bundle::FileBundle;
    use weaver_core::domain::report::VerificationReport;

    fn empty_result() -> JobResult {
        JobResult {
            bundle: FileBundle::new(),
            report: VerificationReport::passing(),
            stages: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_lifecycle_pending_running_completed() {
        let store = JobStore::new();
        let job = store.create(JobKind::UiBundle, HashMap::new()).await;
        assert_eq!(job.status, JobStatus::Pending);

        store.mark_running(job.id).await;
        assert_eq!(store.get(job.id).await.unwrap().status, JobStatus::Running);

        store.complete(job.id, empty_result()).await;
        let done = store.get(job.id).await.unwrap();
        assert_eq!(done.status, JobStatus::Completed);
        assert!(done.result.is_some());
        assert!(done.error.is_none());
        assert!(done.completed_at.is_some());
    }

    #[tokio::test]
    async fn test_terminal_jobs_are_immutable() {
        let store = JobStore::new();
        let job = store.create(JobKind::UiBundle, HashMap::new()).await;
        store.fail(job.id, "stage 1 (analyze-agent) extraction failed".to_string()).await;

        // A late completion attempt must not overwrite the failure.
        store.complete(job.id, empty_result()).await;
        let final_job = store.get(job.id).await.unwrap();
        assert_eq!(final_job.status, JobStatus::Failed);
        assert!(final_job.result.is_none());
        assert!(final_job.error.is_some());
    }

    #[tokio::test]
    async fn test_list_filters_by_kind_and_status() {
        let store = JobStore::new();
        let ui = store.create(JobKind::UiBundle, HashMap::new()).await;
        let agent = store.create(JobKind::AgentBundle, HashMap::new()).await;
        store.fail(agent.id, "boom".to_string()).await;

        let all = store.list(None, None).await;
        assert_eq!(all.len(), 2);

        let pending_ui = store.list(Some(JobKind::UiBundle), Some(JobStatus::Pending)).await;
        assert_eq!(pending_ui.len(), 1);
        assert_eq!(pending_ui[0].id, ui.id);

        let failed = store.list(None, Some(JobStatus::Failed)).await;
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].id, agent.id);
    }

    #[tokio::test]
    async fn test_cancel_flag_and_abort() {
        let store = JobStore::new();
        let job = store.create(JobKind::UiBundle, HashMap::new()).await;
        assert!(!store.should_abort(job.id).await);

        assert!(store.request_cancel(job.id).await);
        assert!(store.should_abort(job.id).await);

        store.mark_cancelled(job.id).await;
        assert_eq!(store.get(job.id).await.unwrap().status, JobStatus::Cancelled);
        // Cancelling a terminal job is rejected.
        assert!(!store.request_cancel(job.id).await);
    }

    #[tokio::test]
    async fn test_delete_aborts_and_forgets() {
        let store = JobStore::new();
        let job = store.create(JobKind::AgentBundle, HashMap::new()).await;
        store.append_log(job.id, LogEntry::info("starting")).await;

        assert!(store.delete(job.id).await);
        assert!(store.get(job.id).await.is_none());
        assert!(store.logs(job.id).await.is_empty());
        assert!(store.should_abort(job.id).await);
        assert!(!store.delete(job.id).await);
    }
}
