//! Ollama-compatible completion backend
//!
//! Posts single-user-message chat completions to an OpenAI-style
//! `/v1/chat/completions` endpoint. Requests are short relative to image
//! jobs, so calls block with a bounded retry on transport errors.

use crate::backend::CompletionBackend;
use crate::config::ForgeConfig;
use cardforge_core::{ForgeError, Result};
use std::time::Duration;

const REQUEST_TIMEOUT_SECS: u64 = 120;
const MAX_RETRIES: usize = 3;
const RETRY_BASE_DELAY_MS: u64 = 500;

/// Completion client for an Ollama (or compatible) server
pub struct OllamaCompletion {
    base_url: String,
    api_key: Option<String>,
}

impl OllamaCompletion {
    /// Create a client from config
    pub fn from_config(config: &ForgeConfig) -> Self {
        Self {
            base_url: config.api_url("completion").to_string(),
            api_key: config.api_key("completion").map(|k| k.to_string()),
        }
    }

    fn post_json_with_retry(&self, payload: &serde_json::Value) -> Result<serde_json::Value> {
        let url = format!("{}/v1/chat/completions", self.base_url);

        for attempt in 0..MAX_RETRIES {
            let agent = build_agent();
            let mut request = agent
                .post(&url)
                .header("Content-Type", "application/json");
            if let Some(ref key) = self.api_key {
                request = request.header("Authorization", &format!("Bearer {}", key));
            }

            match request.send_json(payload) {
                Ok(mut ok) => {
                    return ok.body_mut().read_json().map_err(|e| {
                        ForgeError::Backend(format!(
                            "Failed to parse completion response: {}",
                            e
                        ))
                    });
                }
                Err(e) => {
                    if attempt + 1 < MAX_RETRIES && is_retryable_error(&e) {
                        sleep_backoff(attempt);
                        continue;
                    }
                    return Err(ForgeError::Backend(format!(
                        "Completion request failed: {}",
                        e
                    )));
                }
            }
        }

        Err(ForgeError::Backend(
            "Completion request failed after retries".to_string(),
        ))
    }
}

impl CompletionBackend for OllamaCompletion {
    fn name(&self) -> &str {
        "ollama"
    }

    fn complete(&self, model: &str, prompt: &str) -> Result<String> {
        let payload = serde_json::json!({
            "model": model,
            "messages": [{"role": "user", "content": prompt}]
        });

        let response = self.post_json_with_retry(&payload)?;
        parse_completion_response(&response)
    }
}

/// Extract the completion text from a chat response
pub fn parse_completion_response(response: &serde_json::Value) -> Result<String> {
    response
        .get("choices")
        .and_then(|c| c.as_array())
        .and_then(|arr| arr.first())
        .and_then(|choice| choice.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|c| c.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| {
            ForgeError::Backend(format!(
                "Unexpected completion response format: {}",
                serde_json::to_string(response).unwrap_or_default()
            ))
        })
}

fn build_agent() -> ureq::Agent {
    let config = ureq::Agent::config_builder()
        .timeout_global(Some(Duration::from_secs(REQUEST_TIMEOUT_SECS)))
        .build();
    config.into()
}

fn is_retryable_error(e: &ureq::Error) -> bool {
    match e {
        ureq::Error::Timeout(_)
        | ureq::Error::Io(_)
        | ureq::Error::ConnectionFailed
        | ureq::Error::HostNotFound => true,
        ureq::Error::StatusCode(code) => matches!(code, 429 | 500 | 502 | 503 | 504),
        _ => false,
    }
}

fn sleep_backoff(attempt: usize) {
    let delay_ms = RETRY_BASE_DELAY_MS.saturating_mul(1u64 << attempt);
    std::thread::sleep(Duration::from_millis(delay_ms));
}
