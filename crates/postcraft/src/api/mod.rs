//! API interaction layer: typed HTTP clients for both upstream services.
//!
//! - [`chat`]: OpenAI-compatible chat completions client used for research
//!   (Perplexity). Supports single-shot and SSE-streamed responses.
//! - [`streaming`]: SSE parser producing [`StreamEvent`](streaming::StreamEvent)
//!   values from `data:` lines.
//! - [`messages`]: Anthropic Messages API client used for post generation.
//!
//! Both clients make exactly one attempt per call. Transport failures,
//! non-success statuses and error payloads surface as [`crate::Error`].

pub mod chat;
pub mod messages;
pub mod streaming;

pub use chat::{ChatClient, ChatCompletion, ChatRequest, UsageInfo};
pub use messages::{MessagesClient, MessagesCompletion, MessagesRequest};
pub use streaming::{StreamEvent, collect_text};

use std::time::Duration;

/// Request timeout applied to both HTTP clients.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Build the shared `reqwest` client configuration.
pub(crate) fn build_http_client(service: &'static str) -> crate::Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(concat!("postcraft/", env!("CARGO_PKG_VERSION")))
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(|e| crate::Error::http(service, format!("failed to build HTTP client: {e}")))
}
