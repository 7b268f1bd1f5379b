//! Job DTOs

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::domain::job::{Job, JobKind, JobStatus};
use crate::domain::report::VerificationReport;
use crate::domain::stage::Strategy;

/// Request to create a UI-bundle generation job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUiJob {
    pub agent_description: String,
    pub agent_capabilities: Vec<String>,
    #[serde(default)]
    pub agent_api: Option<String>,
    /// Free-form design preferences, forwarded verbatim to the design stage.
    #[serde(default)]
    pub user_preferences: Option<Value>,
}

impl CreateUiJob {
    /// Flatten into the `{placeholder}` parameters the UI pipeline expects.
    pub fn into_params(self) -> HashMap<String, Value> {
        let mut params = HashMap::new();
        params.insert("agent_description".to_string(), Value::String(self.agent_description));
        params.insert(
            "agent_capabilities".to_string(),
            Value::String(self.agent_capabilities.join(", ")),
        );
        params.insert(
            "agent_api".to_string(),
            Value::String(self.agent_api.unwrap_or_else(|| "none".to_string())),
        );
        params.insert(
            "user_preferences".to_string(),
            self.user_preferences.unwrap_or(Value::String("none".to_string())),
        );
        params
    }
}

/// Request to create an agent-bundle generation job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAgentJob {
    pub idea: String,
    #[serde(default)]
    pub agent_name: Option<String>,
    #[serde(default)]
    pub goals: Vec<String>,
    #[serde(default)]
    pub constraints: Vec<String>,
}

impl CreateAgentJob {
    pub fn into_params(self) -> HashMap<String, Value> {
        let mut params = HashMap::new();
        params.insert("idea".to_string(), Value::String(self.idea));
        params.insert(
            "agent_name".to_string(),
            Value::String(self.agent_name.unwrap_or_else(|| "unnamed".to_string())),
        );
        params.insert("goals".to_string(), Value::String(join_or_none(&self.goals)));
        params.insert("constraints".to_string(), Value::String(join_or_none(&self.constraints)));
        params
    }
}

fn join_or_none(items: &[String]) -> String {
    if items.is_empty() { "none".to_string() } else { items.join("; ") }
}

/// Response to a job submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobCreated {
    pub job_id: Uuid,
    pub status: JobStatus,
}

/// Lightweight job summary for listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobSummary {
    pub id: Uuid,
    pub kind: JobKind,
    pub status: JobStatus,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl From<&Job> for JobSummary {
    fn from(job: &Job) -> Self {
        Self {
            id: job.id,
            kind: job.kind,
            status: job.status,
            created_at: job.created_at,
            completed_at: job.completed_at,
        }
    }
}

/// One stage, without its raw response text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageSummary {
    pub stage_index: usize,
    pub name: String,
    pub strategy: Strategy,
}

/// Full job view for polling: status, error, verification verdict and the
/// produced file list, but not the file contents (those come from the
/// bundle endpoint).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobDetails {
    pub id: Uuid,
    pub kind: JobKind,
    pub status: JobStatus,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
    pub error: Option<String>,
    pub files: Vec<String>,
    pub stages: Vec<StageSummary>,
    pub report: Option<VerificationReport>,
}

impl From<&Job> for JobDetails {
    fn from(job: &Job) -> Self {
        let (files, stages, report) = match &job.result {
            Some(result) => (
                result.bundle.paths().map(str::to_string).collect(),
                result
                    .stages
                    .iter()
                    .map(|s| StageSummary {
                        stage_index: s.stage_index,
                        name: s.name.clone(),
                        strategy: s.strategy,
                    })
                    .collect(),
                Some(result.report.clone()),
            ),
            None => (Vec::new(), Vec::new(), None),
        };
        Self {
            id: job.id,
            kind: job.kind,
            status: job.status,
            created_at: job.created_at,
            completed_at: job.completed_at,
            error: job.error.clone(),
            files,
            stages,
            report,
        }
    }
}
