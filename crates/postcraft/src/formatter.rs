//! Post generation and revision via a text-generation service.
//!
//! The [`Formatter`] trait captures the two operations the session needs.
//! [`ClaudeFormatter`] builds the instruction with [`crate::prompt`], sends
//! it as a single user message, and trims the reply.

use std::future::Future;
use std::pin::Pin;

use tracing::{debug, info};

use crate::api::messages::{MessagesClient, MessagesRequest};
use crate::config::ServiceConfig;
use crate::post::PostConfig;
use crate::prompt::{format_prompt, revision_prompt};
use crate::{Error, Message, Result};

/// Boxed future returned by [`Formatter`] operations.
pub type FormatFuture<'a> = Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>>;

/// Anything that can format research into a post and revise a post.
pub trait Formatter: Send + Sync {
    /// Turn research text into a post shaped by `config`.
    fn format_post<'a>(&'a self, research: &'a str, config: &'a PostConfig) -> FormatFuture<'a>;

    /// Produce a revised version of `original` that addresses `feedback`.
    fn revise_post<'a>(&'a self, original: &'a str, feedback: &'a str) -> FormatFuture<'a>;
}

/// Formatter backed by the Anthropic Messages API.
pub struct ClaudeFormatter {
    client: MessagesClient,
    model: String,
    max_tokens: u32,
}

impl ClaudeFormatter {
    pub fn new(api_key: &str, config: &ServiceConfig) -> Result<Self> {
        Ok(Self {
            client: MessagesClient::new(api_key, config.generation_url.clone())?,
            model: config.generation_model.clone(),
            max_tokens: config.max_tokens,
        })
    }

    /// The request sent by [`Formatter::format_post`].
    pub fn format_request(&self, research: &str, config: &PostConfig) -> MessagesRequest {
        self.request(format_prompt(research, config))
    }

    /// The request sent by [`Formatter::revise_post`].
    pub fn revision_request(&self, original: &str, feedback: &str) -> MessagesRequest {
        self.request(revision_prompt(original, feedback))
    }

    fn request(&self, prompt: String) -> MessagesRequest {
        MessagesRequest {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            messages: vec![Message::user(prompt)],
        }
    }

    async fn generate(&self, request: MessagesRequest) -> Result<String> {
        let completion = self.client.create(&request).await?;
        if completion.stop_reason.as_deref() == Some("max_tokens") {
            debug!("Generation stopped at the {} token ceiling", self.max_tokens);
        }
        let text = completion.text.trim();
        if text.is_empty() {
            return Err(Error::EmptyResponse {
                service: "generation",
            });
        }
        Ok(text.to_string())
    }
}

impl Formatter for ClaudeFormatter {
    fn format_post<'a>(&'a self, research: &'a str, config: &'a PostConfig) -> FormatFuture<'a> {
        Box::pin(async move {
            info!(
                format = %config.format(),
                length = %config.length(),
                customer_story = config.is_customer_story(),
                "Formatting post"
            );
            self.generate(self.format_request(research, config)).await
        })
    }

    fn revise_post<'a>(&'a self, original: &'a str, feedback: &'a str) -> FormatFuture<'a> {
        Box::pin(async move {
            info!(feedback_chars = feedback.len(), "Revising post");
            self.generate(self.revision_request(original, feedback))
                .await
        })
    }
}
