//! Credentials and service settings.
//!
//! [`Credentials`] come from the process environment and are checked before
//! any client is built. [`ServiceConfig`] holds everything else, with
//! defaults matching the hosted services and `with_*` setters for overrides.

use std::fmt;

use crate::api::chat::PERPLEXITY_URL;
use crate::api::messages::ANTHROPIC_URL;
use crate::{Error, Result};

/// Environment variable holding the research service key.
pub const RESEARCH_KEY_VAR: &str = "PERPLEXITY_API_KEY";

/// Environment variable holding the generation service key.
pub const GENERATION_KEY_VAR: &str = "ANTHROPIC_API_KEY";

/// Default research model.
pub const DEFAULT_RESEARCH_MODEL: &str = "sonar-pro";

/// Default generation model.
pub const DEFAULT_GENERATION_MODEL: &str = "claude-3-5-sonnet-20241022";

/// Default output ceiling for generation requests.
pub const DEFAULT_MAX_TOKENS: u32 = 1000;

/// API keys for both services.
#[derive(Clone)]
pub struct Credentials {
    pub research_key: String,
    pub generation_key: String,
}

impl Credentials {
    /// Read both keys from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Read both keys through `lookup`. A missing or blank value is a
    /// [`Error::MissingCredential`]; the research key is checked first.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let require = |var: &'static str| {
            lookup(var)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or(Error::MissingCredential { var })
        };
        Ok(Self {
            research_key: require(RESEARCH_KEY_VAR)?,
            generation_key: require(GENERATION_KEY_VAR)?,
        })
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("research_key", &"<redacted>")
            .field("generation_key", &"<redacted>")
            .finish()
    }
}

/// Settings for both services and the session.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    /// Research model identifier. Default: `"sonar-pro"`.
    pub research_model: String,
    /// Research service base URL; `/chat/completions` is appended.
    pub research_url: String,
    /// Generation model identifier. Default: `"claude-3-5-sonnet-20241022"`.
    pub generation_model: String,
    /// Full Messages API endpoint.
    pub generation_url: String,
    /// Output ceiling for generation requests. Default: `1000`.
    pub max_tokens: u32,
    /// Request research as an SSE stream. Default: `true`.
    pub stream: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            research_model: DEFAULT_RESEARCH_MODEL.to_string(),
            research_url: PERPLEXITY_URL.to_string(),
            generation_model: DEFAULT_GENERATION_MODEL.to_string(),
            generation_url: ANTHROPIC_URL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            stream: true,
        }
    }
}

impl ServiceConfig {
    pub fn with_research_model(mut self, model: impl Into<String>) -> Self {
        self.research_model = model.into();
        self
    }

    pub fn with_research_url(mut self, url: impl Into<String>) -> Self {
        self.research_url = url.into();
        self
    }

    pub fn with_generation_model(mut self, model: impl Into<String>) -> Self {
        self.generation_model = model.into();
        self
    }

    pub fn with_generation_url(mut self, url: impl Into<String>) -> Self {
        self.generation_url = url.into();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_stream(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }
}
