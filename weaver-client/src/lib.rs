//! Weaver HTTP Client
//!
//! A simple, type-safe HTTP client for the Weaver server API.
//!
//! # Example
//!
//! ```no_run
//! use weaver_client::WeaverClient;
//! use weaver_core::dto::job::CreateUiJob;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), weaver_client::ClientError> {
//!     let client = WeaverClient::new("http://localhost:5080");
//!
//!     let created = client.create_ui_job(&CreateUiJob {
//!         agent_description: "a travel planning assistant".to_string(),
//!         agent_capabilities: vec!["booking".to_string()],
//!         agent_api: None,
//!         user_preferences: None,
//!     }).await?;
//!
//!     println!("Created job: {}", created.job_id);
//!     Ok(())
//! }
//! ```

pub mod error;
mod jobs;

// Re-export commonly used types
pub use error::{ClientError, Result};

use reqwest::Client;
use serde::de::DeserializeOwned;

/// HTTP client for the Weaver server API
///
/// Provides methods for all server endpoints: job submission, polling,
/// bundle/report retrieval, logs, cancellation and environment validation.
#[derive(Debug, Clone)]
pub struct WeaverClient {
    /// Base URL of the server (e.g., "http://localhost:5080")
    base_url: String,
    /// HTTP client instance
    client: Client,
}

impl WeaverClient {
    /// Create a new client for the given server base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    /// Create a client with a custom reqwest Client (timeouts, proxies, TLS).
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Get the base URL of the server
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Check the status code and deserialize the JSON body.
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }

    /// Check the status code of a response with no interesting body.
    async fn handle_empty_response(&self, response: reqwest::Response) -> Result<()> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        Ok(())
    }
}
