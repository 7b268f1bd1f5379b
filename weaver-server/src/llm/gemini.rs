//! Gemini provider
//!
//! Talks to the Google Generative Language REST API
//! (`models/{model}:generateContent`). In schema mode the request asks for
//! `application/json` output; the response text is then pre-decoded so the
//! harvester can use its typed-schema strategy.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use weaver_core::harvest::ModelOutput;

use super::{LlmError, LlmProvider};
use crate::config::Config;

const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

pub struct GeminiProvider {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
}

impl GeminiProvider {
    pub fn from_config(config: &Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: config.gemini_model.clone(),
            api_key: config.gemini_api_key.clone(),
        }
    }

    /// Override the API endpoint (tests point this at a local server).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate(&self, prompt: &str, schema_mode: bool) -> Result<ModelOutput, LlmError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| LlmError::Configuration("GEMINI_API_KEY is not set".to_string()))?;

        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.endpoint, self.model, api_key
        );
        let request = GenerateContentRequest {
            contents: vec![Content { parts: vec![Part { text: prompt.to_string() }] }],
            generation_config: schema_mode.then(|| GenerationConfig {
                response_mime_type: "application/json".to_string(),
            }),
        };

        let response = self.client.post(&url).json(&request).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|_| "<no body>".to_string());
            return Err(LlmError::MalformedResponse(format!("HTTP {status}: {body}")));
        }

        let decoded: GenerateContentResponse = response.json().await?;
        let text = decoded
            .candidates
            .into_iter()
            .next()
            .map(|c| {
                c.content
                    .parts
                    .into_iter()
                    .map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .ok_or_else(|| LlmError::MalformedResponse("response had no candidates".to_string()))?;

        let structured = if schema_mode {
            serde_json::from_str(text.trim()).ok()
        } else {
            None
        };

        Ok(ModelOutput { text, structured })
    }
}

// =============================================================================
// Wire types
// =============================================================================

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    #[serde(rename = "response_mime_type")]
    response_mime_type: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_decoding() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":"{\"a\":1}"}],"role":"model"}}]}"#;
        let decoded: GenerateContentResponse = serde_json::from_str(body).unwrap();
        assert_eq!(decoded.candidates.len(), 1);
        assert_eq!(decoded.candidates[0].content.parts[0].text, "{\"a\":1}");
    }

    #[test]
    fn test_request_omits_generation_config_outside_schema_mode() {
        let request = GenerateContentRequest {
            contents: vec![Content { parts: vec![Part { text: "hi".to_string() }] }],
            generation_config: None,
        };
        let json = serde_json::to_string(&request).unwrap();
        assert!(!json.contains("generationConfig"));
    }

    #[tokio::test]
    async fn test_schema_mode_generate_against_local_endpoint() {
        use axum::{Json, Router, extract::Path, routing::post};

        async fn generate_content(Path(model): Path<String>) -> Json<serde_json::Value> {
            assert_eq!(model, "gemini-2.5-pro:generateContent");
            Json(serde_json::json!({
                "candidates": [{
                    "content": {
                        "parts": [{"text": "{\"filename\":\"app.js\",\"code\":\"1;\"}"}],
                        "role": "model"
                    }
                }]
            }))
        }

        let app = Router::new().route("/models/{model}", post(generate_content));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let config = Config {
            bind_addr: "127.0.0.1:0".to_string(),
            gemini_api_key: Some("AIzaTest".to_string()),
            gemini_model: "gemini-2.5-pro".to_string(),
            stage_timeout: std::time::Duration::from_secs(1),
        };
        let provider = GeminiProvider::from_config(&config).with_endpoint(format!("http://{addr}"));

        let output = provider.generate("make app.js", true).await.unwrap();
        assert_eq!(output.structured.unwrap()["filename"], "app.js");
        assert!(output.text.contains("app.js"));
    }

    #[tokio::test]
    async fn test_missing_key_is_configuration_error() {
        let provider = GeminiProvider {
            client: reqwest::Client::new(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: "gemini-2.5-pro".to_string(),
            api_key: None,
        };
        let err = provider.generate("hello", true).await.unwrap_err();
        assert!(matches!(err, LlmError::Configuration(_)));
    }
}
