//! Convenience re-exports for common `postcraft` types.
//!
//! ```ignore
//! use postcraft::prelude::*;
//! ```

pub use crate::config::{Credentials, ServiceConfig};
pub use crate::error::{Error, Result};
pub use crate::formatter::{ClaudeFormatter, Formatter};
pub use crate::post::{PostConfig, PostFormat, PostLength};
pub use crate::research::{PerplexityResearcher, Researcher};
pub use crate::session::{Console, ScriptedConsole, Session, SessionState, StdConsole};
pub use crate::{Message, MessageRole};
