//! Anthropic Messages API client.
//!
//! Used for the generation service: one user message in, the concatenated
//! text content blocks out.

use crate::api::build_http_client;
use crate::{Error, Message, Result};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, trace};

const SERVICE: &str = "generation";

/// Default Messages API endpoint.
pub const ANTHROPIC_URL: &str = "https://api.anthropic.com/v1/messages";

/// API version header value.
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Messages API request body.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct MessagesRequest {
    pub model: String,
    pub max_tokens: u32,
    pub messages: Vec<Message>,
}

#[derive(Deserialize, Debug)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize, Debug)]
struct RawMessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    model: Option<String>,
    stop_reason: Option<String>,
    usage: Option<MessagesUsage>,
}

#[derive(Deserialize, Debug)]
struct RawError {
    #[serde(rename = "type")]
    error_type: String,
    message: String,
}

#[derive(Deserialize, Debug)]
struct RawErrorResponse {
    error: RawError,
}

#[derive(Deserialize, Debug)]
struct MessagesUsage {
    input_tokens: u32,
    output_tokens: u32,
}

/// Clean return type from [`MessagesClient::create`].
#[derive(Debug, Clone)]
pub struct MessagesCompletion {
    /// All `text` content blocks joined in order.
    pub text: String,
    pub stop_reason: Option<String>,
}

/// Async HTTP client for the Messages API.
pub struct MessagesClient {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
}

impl MessagesClient {
    pub fn new(api_key: impl Into<String>, endpoint: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: build_http_client(SERVICE)?,
            api_key: api_key.into(),
            endpoint: endpoint.into(),
        })
    }

    /// Send a Messages API request.
    pub async fn create(&self, request: &MessagesRequest) -> Result<MessagesCompletion> {
        debug!(
            "Generation request: model={}, messages={}, max_tokens={}",
            request.model,
            request.messages.len(),
            request.max_tokens,
        );
        trace!(
            "Request payload size: {} bytes",
            serde_json::to_string(request).map_or(0, |s| s.len())
        );

        let start = Instant::now();
        let resp = self
            .client
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(request)
            .send()
            .await
            .map_err(|e| Error::http(SERVICE, format!("request failed: {e}")))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| Error::http(SERVICE, format!("failed to read response: {e}")))?;

        debug!(
            "Generation response: HTTP {} in {:.1}s ({} bytes)",
            status,
            start.elapsed().as_secs_f64(),
            body.len()
        );

        if !status.is_success() {
            let message = match serde_json::from_str::<RawErrorResponse>(&body) {
                Ok(err) => format!("{} - {}", err.error.error_type, err.error.message),
                Err(_) => body.trim().to_string(),
            };
            return Err(Error::Api {
                service: SERVICE,
                status: status.as_u16(),
                message,
            });
        }

        let parsed: RawMessagesResponse =
            serde_json::from_str(&body).map_err(|e| Error::parse(SERVICE, e.to_string()))?;

        if let Some(ref usage) = parsed.usage {
            debug!(
                "Generation token usage: model={}, input={}, output={}",
                parsed.model.as_deref().unwrap_or("unknown"),
                usage.input_tokens,
                usage.output_tokens
            );
        }

        let text = parsed
            .content
            .iter()
            .filter(|block| block.block_type == "text")
            .filter_map(|block| block.text.as_deref())
            .collect::<String>();

        Ok(MessagesCompletion {
            text,
            stop_reason: parsed.stop_reason,
        })
    }
}
