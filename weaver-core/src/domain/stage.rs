//! Per-stage output records

use serde::{Deserialize, Serialize};

/// Which harvesting strategy recovered a stage's structured value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// The provider returned an already-structured object (schema mode).
    TypedSchema,
    /// The whole response text parsed as a JSON object.
    DirectJson,
    /// A fenced ``` block inside the response parsed as a JSON object.
    FencedJson,
    /// All strategies failed.
    None,
}

/// Recorded outcome of one pipeline stage.
///
/// Invariant: `structured_value` is Some iff `strategy != Strategy::None`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageOutput {
    /// Zero-based position in the pipeline.
    pub stage_index: usize,
    pub name: String,
    pub raw_text: String,
    pub strategy: Strategy,
    pub structured_value: Option<serde_json::Value>,
}
