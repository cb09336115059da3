//! Client error types

use thiserror::Error;

/// Client error type
///
/// Everything the backend or the network can do wrong ends up here. The
/// `Display` output is the human-readable message surfaced to operators.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport failed before a response arrived
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx response; `message` comes from the `{error}` body or is
    /// synthesized as "Request failed (<status>)"
    #[error("{message}")]
    Request { status: u16, message: String },

    /// 2xx response whose body could not be decoded
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// A save of the same kind is already in flight
    #[error("Another save is already in progress")]
    Busy,

    /// Invalid client configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ClientError {
    /// Create a request error with an explicit message
    pub fn request(status: u16, message: impl Into<String>) -> Self {
        Self::Request {
            status,
            message: message.into(),
        }
    }

    /// HTTP status code, when the failure came from a response
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Request { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;
