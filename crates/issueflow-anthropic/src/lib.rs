//! Anthropic Messages API backend for issueflow
//!
//! Sends one user message per request and returns the typed content
//! segments untouched. Interpreting them is the generation stage's job.

use std::time::Duration;

use async_trait::async_trait;
use issueflow_core::{BackendError, Completion, CompletionRequest, PipelineError, TextBackend};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Public Anthropic API root.
pub const DEFAULT_API_URL: &str = "https://api.anthropic.com";

const ANTHROPIC_VERSION: &str = "2023-06-01";
const REQUEST_TIMEOUT_SECS: u64 = 120;
const MAX_ERROR_BODY_LEN: usize = 200;

/// Connection settings for the Messages API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnthropicConfig {
    pub api_url: String,
    #[serde(skip_serializing)]
    pub api_key: String,
    pub timeout_secs: u64,
}

impl AnthropicConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        AnthropicConfig {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: api_key.into(),
            timeout_secs: REQUEST_TIMEOUT_SECS,
        }
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: [Message<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

impl<'a> From<&'a CompletionRequest> for MessagesRequest<'a> {
    fn from(request: &'a CompletionRequest) -> Self {
        MessagesRequest {
            model: &request.model,
            max_tokens: request.max_output_tokens,
            messages: [Message {
                role: "user",
                content: &request.prompt,
            }],
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(rename = "type")]
    kind: String,
    message: String,
}

/// Message from an API error body; falls back to the truncated raw body.
fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => format!("{}: {}", envelope.error.kind, envelope.error.message),
        Err(_) => match body.char_indices().nth(MAX_ERROR_BODY_LEN) {
            Some((idx, _)) => format!("{}... (truncated)", &body[..idx]),
            None => body.to_string(),
        },
    }
}

/// `TextBackend` over `POST {api_url}/v1/messages`.
#[derive(Debug, Clone)]
pub struct AnthropicBackend {
    config: AnthropicConfig,
    http: reqwest::Client,
}

impl AnthropicBackend {
    pub fn new(config: AnthropicConfig) -> Result<Self, PipelineError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PipelineError::Config(format!("failed to create HTTP client: {e}")))?;
        Ok(AnthropicBackend { config, http })
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/messages", self.config.api_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl TextBackend for AnthropicBackend {
    async fn complete(&self, request: CompletionRequest) -> Result<Completion, BackendError> {
        debug!(model = %request.model, max_tokens = request.max_output_tokens, "sending completion request");

        let response = self
            .http
            .post(self.endpoint())
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&MessagesRequest::from(&request))
            .send()
            .await
            .map_err(|e| BackendError::new(None, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::new(Some(status.as_u16()), error_message(&body)));
        }

        let completion: Completion = response
            .json()
            .await
            .map_err(|e| BackendError::new(None, format!("malformed response payload: {e}")))?;
        debug!(segments = completion.content.len(), "received completion");
        Ok(completion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use issueflow_core::ContentSegment;

    #[test]
    fn test_request_serialization() {
        let request = CompletionRequest {
            prompt: "# Issue: x".to_string(),
            model: "claude-sonnet-4-20250514".to_string(),
            max_output_tokens: 4096,
        };
        let json = serde_json::to_value(MessagesRequest::from(&request)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "model": "claude-sonnet-4-20250514",
                "max_tokens": 4096,
                "messages": [{"role": "user", "content": "# Issue: x"}]
            })
        );
    }

    #[test]
    fn test_parse_messages_response() {
        let json = r#"{
            "id": "msg_01",
            "type": "message",
            "role": "assistant",
            "content": [{"type": "text", "text": "```src/a.ts\nx\n```"}],
            "stop_reason": "end_turn",
            "usage": {"input_tokens": 10, "output_tokens": 5}
        }"#;
        let completion: Completion = serde_json::from_str(json).unwrap();
        assert_eq!(
            completion.content,
            vec![ContentSegment::Text {
                text: "```src/a.ts\nx\n```".to_string()
            }]
        );
    }

    #[test]
    fn test_error_message_keeps_credit_balance_text() {
        let body = r#"{"type": "error", "error": {"type": "invalid_request_error",
            "message": "Your credit balance is too low to access the Anthropic API."}}"#;
        let err = BackendError::new(Some(400), error_message(body));
        assert!(err.is_low_balance());
        assert!(err.message.starts_with("invalid_request_error: "));
    }

    #[test]
    fn test_error_message_truncates_raw_body() {
        let body = "<html>".repeat(100);
        let message = error_message(&body);
        assert!(message.ends_with("... (truncated)"));
        assert_eq!(error_message("bad gateway"), "bad gateway");
    }

    #[test]
    fn test_api_key_not_serialized() {
        let json = serde_json::to_string(&AnthropicConfig::new("sk-ant-secret")).unwrap();
        assert!(!json.contains("sk-ant-secret"));
    }

    #[test]
    fn test_endpoint() {
        let backend =
            AnthropicBackend::new(AnthropicConfig::new("k").with_api_url("http://localhost:9/"))
                .unwrap();
        assert_eq!(backend.endpoint(), "http://localhost:9/v1/messages");
    }
}
