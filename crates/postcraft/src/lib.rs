//! Research a topic and turn it into a LinkedIn post.
//!
//! `postcraft` chains two language-model services. A research service
//! (Perplexity, OpenAI-compatible chat completions) gathers statistic-backed
//! facts about a topic, and a generation service (Anthropic Messages API)
//! reshapes that research into a post following one of four fixed
//! [`PostFormat`]s. An interactive [`Session`] wraps both calls in an
//! accept / revise / restart loop.
//!
//! # Getting started
//!
//! ```ignore
//! use postcraft::prelude::*;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> postcraft::Result<()> {
//!     let credentials = Credentials::from_env()?;
//!     let config = ServiceConfig::default();
//!
//!     let researcher = PerplexityResearcher::new(&credentials.research_key, &config)?;
//!     let formatter = ClaudeFormatter::new(&credentials.generation_key, &config)?;
//!
//!     let research = researcher.get_research("electric vehicles", true).await?;
//!     let post_config = PostConfig::new(
//!         PostFormat::FactsWithEmoji,
//!         "electric vehicles",
//!         PostLength::Short,
//!         false,
//!     );
//!     let post = formatter.format_post(&research, &post_config).await?;
//!     println!("{post}");
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`api`] | HTTP clients for both services, SSE stream parsing |
//! | [`research`] | [`Researcher`] trait and the Perplexity implementation |
//! | [`post`] | [`PostFormat`], [`PostLength`], [`PostConfig`] |
//! | [`prompt`] | Format and revision instruction templates |
//! | [`formatter`] | [`Formatter`] trait and the Claude implementation |
//! | [`session`] | Interactive state machine over a [`Console`] |
//! | [`config`] | Credentials and service settings |

pub mod api;
pub mod config;
pub mod error;
pub mod formatter;
pub mod post;
pub mod prelude;
pub mod prompt;
pub mod research;
pub mod session;

use serde::{Deserialize, Serialize};

pub use config::{Credentials, ServiceConfig};
pub use error::{Error, Result};
pub use formatter::{ClaudeFormatter, Formatter};
pub use post::{PostConfig, PostFormat, PostLength};
pub use research::{PerplexityResearcher, Researcher};
pub use session::{Console, Session, StdConsole};

// ── Message types ──────────────────────────────────────────────────

/// Role of a message in a request conversation.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MessageRole::System => write!(f, "system"),
            MessageRole::User => write!(f, "user"),
        }
    }
}

/// A single message sent to either service.
///
/// Both the chat-completions and the Messages API accept this
/// `{role, content}` shape for plain text turns.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }
}
