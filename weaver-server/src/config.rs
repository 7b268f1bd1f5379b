//! Server configuration
//!
//! Everything comes from environment variables with sensible defaults. The
//! Gemini API key is validated eagerly: job creation is rejected while the
//! key is missing, so a job can never enter Running only to fail after
//! burning provider calls.

use std::time::Duration;

use weaver_core::dto::validate::{EnvCheck, ValidationSummary};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5080";
const DEFAULT_MODEL: &str = "gemini-2.5-pro";
const DEFAULT_STAGE_TIMEOUT_SECS: u64 = 180;

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    /// Upper bound on a single stage's model call.
    pub stage_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        let stage_timeout_secs = std::env::var("WEAVER_STAGE_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_STAGE_TIMEOUT_SECS);

        Self {
            bind_addr: std::env::var("WEAVER_BIND_ADDR")
                .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string()),
            gemini_api_key: std::env::var("GEMINI_API_KEY").ok().filter(|k| !k.trim().is_empty()),
            gemini_model: std::env::var("WEAVER_GEMINI_MODEL")
                .unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            stage_timeout: Duration::from_secs(stage_timeout_secs),
        }
    }

    /// Run every environment check. Used by the /validate endpoint and
    /// logged at startup.
    pub fn validate(&self) -> Vec<EnvCheck> {
        vec![self.check_api_key(), self.check_model()]
    }

    /// Err with a human-readable reason when the server cannot accept jobs.
    pub fn ensure_ready(&self) -> Result<(), String> {
        match &self.gemini_api_key {
            Some(_) => Ok(()),
            None => Err(
                "GEMINI_API_KEY is not set; get a key at https://aistudio.google.com/app/apikey"
                    .to_string(),
            ),
        }
    }

    fn check_api_key(&self) -> EnvCheck {
        match &self.gemini_api_key {
            None => EnvCheck {
                name: "GEMINI_API_KEY".to_string(),
                ok: false,
                detail: "not set".to_string(),
            },
            Some(key) if !key.starts_with("AIza") => EnvCheck {
                name: "GEMINI_API_KEY".to_string(),
                ok: true,
                detail: format!(
                    "set, but format looks unusual (starts with {:?}, expected \"AIza\")",
                    first_chars(key, 4)
                ),
            },
            Some(key) => EnvCheck {
                name: "GEMINI_API_KEY".to_string(),
                ok: true,
                detail: format!("set ({}...{})", first_chars(key, 7), last_chars(key, 4)),
            },
        }
    }

    fn check_model(&self) -> EnvCheck {
        EnvCheck {
            name: "WEAVER_GEMINI_MODEL".to_string(),
            ok: true,
            detail: self.gemini_model.clone(),
        }
    }
}

// The key comes straight from the environment, so slicing has to respect
// char boundaries even though well-formed keys are ASCII.

fn first_chars(s: &str, n: usize) -> &str {
    match s.char_indices().nth(n) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

fn last_chars(s: &str, n: usize) -> &str {
    match s.char_indices().nth_back(n.saturating_sub(1)) {
        Some((idx, _)) => &s[idx..],
        None => s,
    }
}

/// Build the /validate response for this configuration.
pub fn validation_summary(config: &Config) -> ValidationSummary {
    ValidationSummary { ready: config.ensure_ready().is_ok(), checks: config.validate() }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_key(key: Option<&str>) -> Config {
        Config {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            gemini_api_key: key.map(str::to_string),
            gemini_model: DEFAULT_MODEL.to_string(),
            stage_timeout: Duration::from_secs(1),
        }
    }

    #[test]
    fn test_missing_key_not_ready() {
        let config = config_with_key(None);
        assert!(config.ensure_ready().is_err());
        let summary = validation_summary(&config);
        assert!(!summary.ready);
        assert!(summary.checks.iter().any(|c| c.name == "GEMINI_API_KEY" && !c.ok));
    }

    #[test]
    fn test_unusual_key_shape_is_ready_with_note() {
        let config = config_with_key(Some("sk-whoops"));
        assert!(config.ensure_ready().is_ok());
        let check = config.check_api_key();
        assert!(check.ok);
        assert!(check.detail.contains("unusual"));
    }

    #[test]
    fn test_multibyte_key_does_not_panic() {
        // Keys are arbitrary environment input; masking must not slice
        // inside a multibyte char.
        let check = config_with_key(Some("aключ")).check_api_key();
        assert!(check.ok);
        assert!(check.detail.contains("unusual"));

        let check = config_with_key(Some("AIzaключключ")).check_api_key();
        assert!(check.ok);
        assert!(check.detail.contains("..."));
    }

    #[test]
    fn test_wellformed_key_masked_in_detail() {
        let config = config_with_key(Some("AIzaSyExampleExampleExample1234"));
        let check = config.check_api_key();
        assert!(check.ok);
        assert!(!check.detail.contains("ExampleExampleExample"));
        assert!(check.detail.contains("AIzaSyE"));
    }
}
