//! Error type shared by every layer of the crate.
//!
//! Invalid interactive input is never an [`Error`]: the session re-prompts
//! in place. Everything here aborts the current run and reaches `main`,
//! which prints it and exits with [`Error::exit_code`].

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required API key is missing from the environment.
    #[error("{var} not found in environment variables")]
    MissingCredential { var: &'static str },

    /// Transport failure: connection, timeout, or an unreadable body.
    #[error("{service} service request failed: {message}")]
    Http {
        service: &'static str,
        message: String,
    },

    /// The service answered with a non-success status or an error payload.
    #[error("{service} API error (HTTP {status}): {message}")]
    Api {
        service: &'static str,
        status: u16,
        message: String,
    },

    /// The response body was not the JSON we expected.
    #[error("failed to parse {service} response: {message}")]
    Parse {
        service: &'static str,
        message: String,
    },

    /// The service returned no text at all.
    #[error("{service} service returned an empty response")]
    EmptyResponse { service: &'static str },

    #[error("console I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Standard input closed while a prompt was waiting for an answer.
    #[error("input closed before the session finished")]
    InputClosed,
}

impl Error {
    pub(crate) fn http(service: &'static str, message: impl Into<String>) -> Self {
        Self::Http {
            service,
            message: message.into(),
        }
    }

    pub(crate) fn parse(service: &'static str, message: impl Into<String>) -> Self {
        Self::Parse {
            service,
            message: message.into(),
        }
    }

    /// Process exit code for this error kind.
    ///
    /// `2` for configuration problems, `3` for service failures, `4` for
    /// console failures.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::MissingCredential { .. } => 2,
            Error::Http { .. }
            | Error::Api { .. }
            | Error::Parse { .. }
            | Error::EmptyResponse { .. } => 3,
            Error::Io(_) | Error::InputClosed => 4,
        }
    }
}
