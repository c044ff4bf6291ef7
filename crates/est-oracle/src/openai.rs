//! OpenAI-compatible chat-completions backend.
//!
//! Works against any server exposing `POST {base_url}/chat/completions`
//! (OpenAI, Azure-style proxies, Ollama, LM Studio). Requests JSON-object
//! output and tolerates responses wrapped in a markdown code fence.

use std::time::Duration;

use async_trait::async_trait;
use est_config::OracleConfig;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::adapter::Oracle;
use crate::error::OracleError;
use crate::payload::RawPayload;
use crate::prompt::OraclePrompt;

/// Longest slice of an error body kept in an [`OracleError`].
const ERROR_BODY_LIMIT: usize = 300;

pub struct OpenAiOracle {
    client: Client,
    url: String,
    api_key: String,
    model: String,
    timeout: Duration,
}

impl OpenAiOracle {
    /// Build a client from config.
    ///
    /// # Errors
    ///
    /// Returns [`OracleError::Unavailable`] if the HTTP client cannot be built.
    pub fn new(config: &OracleConfig) -> Result<Self, OracleError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| OracleError::Unavailable(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            url: config.completions_url(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            timeout: config.timeout(),
        })
    }

    fn request_body(&self, prompt: &OraclePrompt) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: OraclePrompt::render_system().to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt.render_user(),
                },
            ],
            response_format: ResponseFormat {
                kind: "json_object".to_string(),
            },
            temperature: 0.0,
        }
    }
}

#[async_trait]
impl Oracle for OpenAiOracle {
    async fn complete(&self, prompt: &OraclePrompt) -> Result<RawPayload, OracleError> {
        let body = self.request_body(prompt);

        let mut request = self.client.post(&self.url).json(&body);
        if !self.api_key.is_empty() {
            request = request.bearer_auth(&self.api_key);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                OracleError::Timeout(self.timeout)
            } else {
                OracleError::Unavailable(format!("request to {} failed: {e}", self.url))
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(classify_status(status.as_u16(), &text, self.timeout));
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| OracleError::Malformed(format!("unreadable completion response: {e}")))?;

        let choice = chat
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| OracleError::Malformed("no choices in response".to_string()))?;

        if choice.finish_reason.as_deref() == Some("content_filter") {
            return Err(OracleError::Rejected(
                "completion stopped by content filter".to_string(),
            ));
        }

        let content = choice
            .message
            .content
            .ok_or_else(|| OracleError::Malformed("empty completion content".to_string()))?;
        parse_content(&content)
    }

    fn name(&self) -> &str {
        &self.model
    }
}

/// Map a non-success HTTP status to an [`OracleError`].
pub fn classify_status(status: u16, body: &str, timeout: Duration) -> OracleError {
    let detail = format!("HTTP {status}: {}", truncate(body, ERROR_BODY_LIMIT));
    match status {
        408 => OracleError::Timeout(timeout),
        400 | 401 | 403 | 404 | 422 => OracleError::Rejected(detail),
        _ => OracleError::Unavailable(detail),
    }
}

/// Parse completion text as a JSON payload, unwrapping a code fence if present.
///
/// # Errors
///
/// Returns [`OracleError::Malformed`] when the text is not valid JSON.
pub fn parse_content(content: &str) -> Result<RawPayload, OracleError> {
    let json = strip_code_fence(content);
    serde_json::from_str(json)
        .map(RawPayload::new)
        .map_err(|e| OracleError::Malformed(format!("completion is not JSON: {e}")))
}

fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string (`json`) on the opening fence line.
    let body = rest.split_once('\n').map_or("", |(_, body)| body);
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    response_format: ResponseFormat,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}
