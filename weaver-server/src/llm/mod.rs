//! LLM provider abstraction
//!
//! The pipeline runner only needs one operation: turn a rendered prompt
//! into a [`ModelOutput`]. Providers are assumed to have unbounded,
//! variable latency and no guarantee of well-formed output; the runner
//! owns the timeout and the harvester owns output recovery.

pub mod gemini;
#[cfg(test)]
pub mod mock;

use async_trait::async_trait;
use weaver_core::harvest::ModelOutput;

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("provider returned an unusable response: {0}")]
    MalformedResponse(String),

    #[error("provider not configured: {0}")]
    Configuration(String),
}

#[async_trait]
pub trait LlmProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Generate a response for `prompt`. With `schema_mode` the provider is
    /// asked for a JSON response and, when it decodes cleanly, the returned
    /// output carries the decoded value alongside the raw text.
    async fn generate(&self, prompt: &str, schema_mode: bool) -> Result<ModelOutput, LlmError>;
}
