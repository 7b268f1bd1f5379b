//! Mock LLM provider for tests
//!
//! Replays a scripted queue of replies and records every prompt it was
//! given, so tests can assert both pipeline behavior and prompt threading.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use weaver_core::harvest::ModelOutput;

use super::{LlmError, LlmProvider};

#[derive(Debug, Clone)]
pub enum ScriptedReply {
    /// Plain text response.
    Text(String),
    /// Schema-mode response: pre-decoded value plus its serialized text.
    Structured(Value),
    /// Never responds; used to drive the runner's stage timeout.
    Hang,
    /// Provider-level failure.
    Error(String),
}

#[derive(Default)]
pub struct MockProvider {
    replies: Mutex<VecDeque<ScriptedReply>>,
    prompts: Mutex<Vec<String>>,
}

impl MockProvider {
    pub fn new(replies: impl IntoIterator<Item = ScriptedReply>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Prompts received so far, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate(&self, prompt: &str, _schema_mode: bool) -> Result<ModelOutput, LlmError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        let reply = self.replies.lock().unwrap().pop_front();
        match reply {
            Some(ScriptedReply::Text(text)) => Ok(ModelOutput::text(text)),
            Some(ScriptedReply::Structured(value)) => Ok(ModelOutput::structured(value)),
            Some(ScriptedReply::Hang) => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(LlmError::MalformedResponse("unreachable".to_string()))
            }
            Some(ScriptedReply::Error(msg)) => Err(LlmError::MalformedResponse(msg)),
            None => Err(LlmError::Configuration("mock reply queue exhausted".to_string())),
        }
    }
}
