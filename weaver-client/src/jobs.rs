//! Job endpoint methods

use uuid::Uuid;

use weaver_core::domain::bundle::FileBundle;
use weaver_core::domain::log::LogEntry;
use weaver_core::domain::report::VerificationReport;
use weaver_core::dto::job::{CreateAgentJob, CreateUiJob, JobCreated, JobDetails, JobSummary};
use weaver_core::dto::validate::ValidationSummary;

use crate::{ClientError, Result, WeaverClient};

impl WeaverClient {
    /// GET /validate — environment readiness without creating a job.
    pub async fn validate(&self) -> Result<ValidationSummary> {
        let response =
            self.client.get(format!("{}/validate", self.base_url)).send().await?;
        self.handle_response(response).await
    }

    /// POST /generate/ui — submit a UI-bundle job.
    pub async fn create_ui_job(&self, req: &CreateUiJob) -> Result<JobCreated> {
        let response = self
            .client
            .post(format!("{}/generate/ui", self.base_url))
            .json(req)
            .send()
            .await?;
        self.handle_response(response).await
    }

    /// POST /generate/agent — submit an agent-bundle job.
    pub async fn create_agent_job(&self, req: &CreateAgentJob) -> Result<JobCreated> {
        let response = self
            .client
            .post(format!("{}/generate/agent", self.base_url))
            .json(req)
            .send()
            .await?;
        self.handle_response(response).await
    }

    /// GET /jobs — summaries, optionally filtered by kind and status.
    pub async fn list_jobs(
        &self,
        kind: Option<&str>,
        status: Option<&str>,
    ) -> Result<Vec<JobSummary>> {
        let mut request = self.client.get(format!("{}/jobs", self.base_url));
        if let Some(kind) = kind {
            request = request.query(&[("kind", kind)]);
        }
        if let Some(status) = status {
            request = request.query(&[("status", status)]);
        }
        let response = request.send().await?;
        self.handle_response(response).await
    }

    /// GET /job/{id}
    pub async fn get_job(&self, id: Uuid) -> Result<JobDetails> {
        let response =
            self.client.get(format!("{}/job/{}", self.base_url, id)).send().await?;
        self.handle_response(response).await
    }

    /// GET /job/{id}/bundle — full path -> content map of a Completed job.
    pub async fn get_bundle(&self, id: Uuid) -> Result<FileBundle> {
        let response =
            self.client.get(format!("{}/job/{}/bundle", self.base_url, id)).send().await?;
        self.handle_response(response).await
    }

    /// GET /job/{id}/file/{path} — raw content of one bundle file.
    pub async fn get_file(&self, id: Uuid, path: &str) -> Result<String> {
        let response = self
            .client
            .get(format!("{}/job/{}/file/{}", self.base_url, id, path))
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), body));
        }
        Ok(response.text().await?)
    }

    /// GET /job/{id}/report
    pub async fn get_report(&self, id: Uuid) -> Result<VerificationReport> {
        let response =
            self.client.get(format!("{}/job/{}/report", self.base_url, id)).send().await?;
        self.handle_response(response).await
    }

    /// GET /job/{id}/logs — pass `after` to fetch only entries past a
    /// cursor (incremental tailing).
    pub async fn get_job_logs(&self, id: Uuid, after: Option<usize>) -> Result<Vec<LogEntry>> {
        let mut request = self.client.get(format!("{}/job/{}/logs", self.base_url, id));
        if let Some(after) = after {
            request = request.query(&[("after", after)]);
        }
        let response = request.send().await?;
        self.handle_response(response).await
    }

    /// POST /job/{id}/cancel
    pub async fn cancel_job(&self, id: Uuid) -> Result<()> {
        let response =
            self.client.post(format!("{}/job/{}/cancel", self.base_url, id)).send().await?;
        self.handle_empty_response(response).await
    }

    /// DELETE /job/{id}
    pub async fn delete_job(&self, id: Uuid) -> Result<()> {
        let response =
            self.client.delete(format!("{}/job/{}", self.base_url, id)).send().await?;
        self.handle_empty_response(response).await
    }
}
