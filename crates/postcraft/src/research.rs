//! Topic research via an answer-generation service.
//!
//! The [`Researcher`] trait is the capability the session depends on;
//! [`PerplexityResearcher`] implements it on top of the chat completions
//! client. Research text is returned as-is: nothing downstream assumes any
//! structure in it.

use std::future::Future;
use std::pin::Pin;

use tracing::{debug, info};

use crate::api::chat::{ChatClient, ChatRequest};
use crate::api::streaming::collect_text;
use crate::config::ServiceConfig;
use crate::{Error, Message, Result};

/// Boxed future returned by [`Researcher::get_research`].
pub type ResearchFuture<'a> = Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>>;

/// Anything that can turn a topic into research text.
///
/// Uses a boxed future so that the trait is dyn-compatible.
pub trait Researcher: Send + Sync {
    /// Research `topic`. With `stream` set, the service delivers the answer
    /// incrementally and the fragments are joined before returning.
    fn get_research<'a>(&'a self, topic: &'a str, stream: bool) -> ResearchFuture<'a>;
}

/// The fixed two-message research instruction for a topic.
pub fn research_messages(topic: &str) -> Vec<Message> {
    vec![
        Message::system(
            "You are an artificial intelligence assistant that provides \
             detailed, factual research with statistics and sources.",
        ),
        Message::user(format!(
            "Give me 5 interesting facts with stats about {topic}. \
             Include sources for any statistical claims. Focus on recent \
             and impactful data that would be engaging for a professional audience."
        )),
    ]
}

/// Both delivery modes treat a reply with no text as a failure.
fn non_empty(research: String) -> Result<String> {
    if research.is_empty() {
        return Err(Error::EmptyResponse {
            service: "research",
        });
    }
    Ok(research)
}

/// Research backed by the Perplexity chat completions API.
pub struct PerplexityResearcher {
    client: ChatClient,
    model: String,
}

impl PerplexityResearcher {
    pub fn new(api_key: &str, config: &ServiceConfig) -> Result<Self> {
        Ok(Self {
            client: ChatClient::new(api_key, &config.research_url)?,
            model: config.research_model.clone(),
        })
    }

    /// The request sent for `topic`.
    pub fn request(&self, topic: &str, stream: bool) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: research_messages(topic),
            stream,
        }
    }

    async fn stream_response(&self, request: &ChatRequest) -> Result<String> {
        let events = self.client.chat_stream(request).await?;
        non_empty(collect_text(&events))
    }

    async fn complete_response(&self, request: &ChatRequest) -> Result<String> {
        let completion = self.client.chat(request).await?;
        if completion.finish_reason.as_deref() == Some("length") {
            debug!("Research reply was cut off at the model's length limit");
        }
        non_empty(completion.content.unwrap_or_default())
    }
}

impl Researcher for PerplexityResearcher {
    fn get_research<'a>(&'a self, topic: &'a str, stream: bool) -> ResearchFuture<'a> {
        Box::pin(async move {
            info!(topic, stream, "Gathering research");
            let request = self.request(topic, stream);
            let research = if stream {
                self.stream_response(&request).await?
            } else {
                self.complete_response(&request).await?
            };
            debug!("Research text: {} chars", research.len());
            Ok(research)
        })
    }
}
