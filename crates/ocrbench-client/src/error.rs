//! Error types for ocrbench-client
//!
//! Every variant maps onto one kind of the shared failure taxonomy in
//! [`ocrbench_core::ErrorKind`].

use std::time::Duration;

/// Result type for all client operations in this crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Upper bound on how much of an error body is kept for diagnostics.
const MAX_ERROR_BODY_CHARS: usize = 512;

/// Unified error type for endpoint calls
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Connection-level failure reported by the HTTP client
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// Endpoint answered with a non-success status
    #[error("Endpoint returned {status}: {body}")]
    Status { status: u16, body: String },

    /// Response body was not what the endpoint contract promises
    #[error("Malformed response: {reason}")]
    Decode { reason: String },

    /// Event stream closed before the `[DONE]` sentinel
    #[error("Stream closed after {frames} frames without a [DONE] sentinel")]
    StreamIncomplete { frames: usize },

    /// Call exceeded its deadline
    #[error("Request timed out after {timeout:?}")]
    Timeout { timeout: Duration },

    /// URL parsing errors
    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Invalid configuration
    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },
}

impl Error {
    /// Create a status error, truncating long bodies
    pub fn status(status: u16, body: impl Into<String>) -> Self {
        let body: String = body.into();
        Self::Status {
            status,
            body: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
        }
    }

    /// Create a decode error
    pub fn decode(reason: impl Into<String>) -> Self {
        Self::Decode {
            reason: reason.into(),
        }
    }

    /// Create an invalid configuration error
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    /// Returns true for connection failures and timeouts.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(e) => !e.is_decode() && !e.is_builder(),
            Self::StreamIncomplete { .. } | Self::Timeout { .. } => true,
            _ => false,
        }
    }
}

impl From<derive_builder::UninitializedFieldError> for Error {
    fn from(err: derive_builder::UninitializedFieldError) -> Self {
        Self::invalid_config(err.to_string())
    }
}

impl From<String> for Error {
    fn from(reason: String) -> Self {
        Self::invalid_config(reason)
    }
}

impl From<Error> for ocrbench_core::Error {
    fn from(err: Error) -> Self {
        use ocrbench_core::Error as CoreError;

        let message = err.to_string();
        match err {
            Error::Http(e) if e.is_timeout() => CoreError::timeout().with_message(message),
            Error::Http(e) if e.is_decode() => CoreError::decode()
                .with_message(message)
                .with_source(e),
            Error::Http(e) => CoreError::transport().with_message(message).with_source(e),
            Error::Status { status, .. } => CoreError::http(status).with_message(message),
            Error::Decode { .. } => CoreError::decode().with_message(message),
            Error::StreamIncomplete { .. } => CoreError::transport().with_message(message),
            Error::Timeout { .. } => CoreError::timeout().with_message(message),
            Error::UrlParse(e) => CoreError::configuration()
                .with_message(message)
                .with_source(e),
            Error::InvalidConfig { .. } => CoreError::configuration().with_message(message),
        }
    }
}
