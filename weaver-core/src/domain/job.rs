//! Job domain types

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::domain::bundle::FileBundle;
use crate::domain::report::VerificationReport;
use crate::domain::stage::StageOutput;

/// Generation job record
///
/// Created by the API on submission, mutated only by the pipeline runner,
/// frozen once it reaches a terminal status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: Uuid,
    pub kind: JobKind,
    pub status: JobStatus,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
    pub parameters: std::collections::HashMap<String, serde_json::Value>,
    /// Present iff status == Completed.
    pub result: Option<JobResult>,
    /// Present iff status == Failed.
    pub error: Option<String>,
    /// Set by the API on cancel/delete; observed by the runner at the next
    /// stage boundary, never mid-stage.
    pub cancel_requested: bool,
}

impl Job {
    /// Whether the job has reached a state that must never be mutated again.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self.status,
            JobStatus::Completed | JobStatus::Failed | JobStatus::Cancelled
        )
    }
}

/// Job lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl FromStr for JobStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pending" => Ok(JobStatus::Pending),
            "running" => Ok(JobStatus::Running),
            "completed" => Ok(JobStatus::Completed),
            "failed" => Ok(JobStatus::Failed),
            "cancelled" => Ok(JobStatus::Cancelled),
            other => Err(ParseEnumError::Status(other.to_string())),
        }
    }
}

/// What kind of bundle a job produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JobKind {
    /// HTML/CSS/JS interface bundle.
    UiBundle,
    /// Python agent source bundle.
    AgentBundle,
}

impl FromStr for JobKind {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ui" | "ui-bundle" => Ok(JobKind::UiBundle),
            "agent" | "agent-bundle" => Ok(JobKind::AgentBundle),
            other => Err(ParseEnumError::Kind(other.to_string())),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ParseEnumError {
    #[error("unknown job status: {0}")]
    Status(String),
    #[error("unknown job kind: {0}")]
    Kind(String),
}

/// Result of a completed job
///
/// The bundle is read-only once attached here; job status and the
/// verification verdict are independent axes (a Completed job may carry a
/// failing report).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobResult {
    pub bundle: FileBundle,
    pub report: VerificationReport,
    pub stages: Vec<StageOutput>,
}
