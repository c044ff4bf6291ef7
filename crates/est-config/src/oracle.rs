//! Reasoning oracle (OpenAI-compatible chat completions) configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-4o".to_string()
}

/// Per-call timeout in seconds.
const fn default_timeout_secs() -> u64 {
    120
}

/// Retries after the first call; the adapter makes at most `max_retries + 1` calls per run.
const fn default_max_retries() -> u32 {
    2
}

const fn default_retry_backoff_ms() -> u64 {
    500
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OracleConfig {
    /// Base URL of the chat-completions API (without `/chat/completions`).
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Bearer token for the API.
    #[serde(default)]
    pub api_key: String,

    /// Model name sent with each request.
    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base delay between retries; doubles after every failed attempt.
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: String::new(),
            model: default_model(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

impl OracleConfig {
    /// Check if the oracle has the minimum required fields for a remote call.
    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty() && !self.base_url.is_empty() && !self.model.is_empty()
    }

    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub const fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    /// Full URL of the chat-completions endpoint.
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_not_configured() {
        let config = OracleConfig::default();
        assert!(!config.is_configured());
        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.max_retries, 2);
        assert_eq!(config.timeout(), Duration::from_secs(120));
    }

    #[test]
    fn configured_when_key_set() {
        let config = OracleConfig {
            api_key: "sk-test".into(),
            ..Default::default()
        };
        assert!(config.is_configured());
    }

    #[test]
    fn completions_url_trims_trailing_slash() {
        let config = OracleConfig {
            base_url: "http://localhost:11434/v1/".into(),
            ..Default::default()
        };
        assert_eq!(
            config.completions_url(),
            "http://localhost:11434/v1/chat/completions"
        );
    }
}
