//! OpenAI-compatible chat completions client.
//!
//! Used for the research service. The same endpoint serves a single JSON
//! body ([`ChatClient::chat`]) or an SSE stream ([`ChatClient::chat_stream`])
//! depending on the request's `stream` flag.

use crate::api::build_http_client;
use crate::api::streaming::{SseBuffer, StreamEvent, extract_usage, stream_error};
use crate::{Error, Message, Result};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, trace};

const SERVICE: &str = "research";

/// Default base URL of the research service.
pub const PERPLEXITY_URL: &str = "https://api.perplexity.ai";

// ── Request types ──────────────────────────────────────────────────

/// Chat completion request body.
#[derive(Serialize, Debug, Default, Clone, PartialEq)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<Message>,
    #[serde(skip_serializing_if = "is_false")]
    pub stream: bool,
}

fn is_false(v: &bool) -> bool {
    !*v
}

// ── Response types ─────────────────────────────────────────────────

#[derive(Deserialize, Debug)]
struct RawChatResponse {
    choices: Option<Vec<RawChoice>>,
    error: Option<ApiErrorResponse>,
    #[serde(default)]
    usage: Option<UsageInfo>,
}

#[derive(Deserialize, Debug)]
struct RawChoice {
    message: RawResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Deserialize, Debug)]
struct RawResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize, Debug)]
struct ApiErrorResponse {
    message: String,
}

/// Error envelope returned alongside non-success statuses.
#[derive(Deserialize, Debug)]
struct RawErrorBody {
    error: ApiErrorResponse,
}

/// Clean return type from [`ChatClient::chat`].
#[derive(Debug, Clone)]
pub struct ChatCompletion {
    pub content: Option<String>,
    pub finish_reason: Option<String>,
}

/// Token usage statistics.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UsageInfo {
    pub prompt_tokens: Option<u32>,
    pub completion_tokens: Option<u32>,
    pub total_tokens: Option<u32>,
}

// ── Client ─────────────────────────────────────────────────────────

/// Async HTTP client for a chat completions endpoint.
pub struct ChatClient {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
}

impl ChatClient {
    /// Create a client for `{base_url}/chat/completions`.
    pub fn new(api_key: impl Into<String>, base_url: &str) -> Result<Self> {
        Ok(Self {
            client: build_http_client(SERVICE)?,
            api_key: api_key.into(),
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
        })
    }

    /// The full URL requests are posted to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn send(&self, body: &ChatRequest) -> Result<reqwest::Response> {
        debug!(
            "Research request: model={}, messages={}, stream={}",
            body.model,
            body.messages.len(),
            body.stream,
        );
        trace!(
            "Request payload size: {} bytes",
            serde_json::to_string(body).map_or(0, |s| s.len())
        );

        let resp = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| Error::http(SERVICE, format!("request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(api_error(status.as_u16(), &text));
        }
        Ok(resp)
    }

    /// Send a single-shot chat completion request.
    pub async fn chat(&self, body: &ChatRequest) -> Result<ChatCompletion> {
        let start = Instant::now();
        let resp = self.send(body).await?;

        let text = resp
            .text()
            .await
            .map_err(|e| Error::http(SERVICE, format!("failed to read response: {e}")))?;

        debug!(
            "Research response in {:.1}s ({} bytes)",
            start.elapsed().as_secs_f64(),
            text.len()
        );

        let parsed: RawChatResponse =
            serde_json::from_str(&text).map_err(|e| Error::parse(SERVICE, e.to_string()))?;

        if let Some(err) = parsed.error {
            return Err(Error::Api {
                service: SERVICE,
                status: 200,
                message: err.message,
            });
        }

        if let Some(ref usage) = parsed.usage {
            log_usage(usage);
        }

        let choice = parsed.choices.and_then(|c| c.into_iter().next());
        Ok(match choice {
            Some(c) => ChatCompletion {
                content: c.message.content,
                finish_reason: c.finish_reason,
            },
            None => ChatCompletion {
                content: None,
                finish_reason: None,
            },
        })
    }

    /// Send a chat completion request with SSE streaming.
    ///
    /// Reads the body chunk by chunk until `data: [DONE]` or end of body and
    /// returns every parsed event. The caller sees nothing until the stream
    /// has ended. An error event in the stream fails the whole call, even if
    /// some text arrived before it.
    pub async fn chat_stream(&self, body: &ChatRequest) -> Result<Vec<StreamEvent>> {
        let mut stream_body = body.clone();
        stream_body.stream = true;

        let start = Instant::now();
        let mut resp = self.send(&stream_body).await?;

        let mut buffer = SseBuffer::new();
        while let Some(chunk) = resp
            .chunk()
            .await
            .map_err(|e| Error::http(SERVICE, format!("failed to read streaming chunk: {e}")))?
        {
            if buffer.push(&chunk) {
                break;
            }
        }

        let events = buffer.finish();
        debug!(
            "Stream completed with {} events in {:.1}s",
            events.len(),
            start.elapsed().as_secs_f64()
        );
        if let Some(message) = stream_error(&events) {
            return Err(Error::Api {
                service: SERVICE,
                status: 200,
                message: message.to_string(),
            });
        }
        if let Some(usage) = extract_usage(&events) {
            log_usage(&usage);
        }
        Ok(events)
    }
}

fn log_usage(usage: &UsageInfo) {
    debug!(
        "Research token usage: prompt={}, completion={}, total={}",
        usage.prompt_tokens.unwrap_or(0),
        usage.completion_tokens.unwrap_or(0),
        usage.total_tokens.unwrap_or(0),
    );
}

/// Build an [`Error::Api`] from a non-success response, preferring the
/// service's own error message when the body carries one.
fn api_error(status: u16, body: &str) -> Error {
    let message = serde_json::from_str::<RawErrorBody>(body)
        .map(|b| b.error.message)
        .unwrap_or_else(|_| body.trim().to_string());
    Error::Api {
        service: SERVICE,
        status,
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_omits_stream_flag_when_false() {
        let req = ChatRequest {
            model: "sonar-pro".into(),
            messages: vec![Message::user("hi")],
            stream: false,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert!(json.get("stream").is_none());
        assert_eq!(json["model"], "sonar-pro");

        let json = serde_json::to_value(ChatRequest {
            stream: true,
            ..req
        })
        .unwrap();
        assert_eq!(json["stream"], true);
    }

    #[test]
    fn endpoint_joins_base_url() {
        let client = ChatClient::new("key", "https://api.perplexity.ai/").unwrap();
        assert_eq!(
            client.endpoint(),
            "https://api.perplexity.ai/chat/completions"
        );
    }

    #[test]
    fn api_error_prefers_structured_message() {
        let err = api_error(401, r#"{"error":{"message":"Invalid API key","type":"auth"}}"#);
        match err {
            Error::Api {
                status, message, ..
            } => {
                assert_eq!(status, 401);
                assert_eq!(message, "Invalid API key");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn api_error_falls_back_to_raw_body() {
        let err = api_error(502, "  Bad Gateway\n");
        assert_eq!(err.to_string(), "research API error (HTTP 502): Bad Gateway");
    }
}
