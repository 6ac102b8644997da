//! Common error type definitions.

use strum::{AsRefStr, IntoStaticStr};
use thiserror::Error;

/// Type alias for boxed dynamic errors that can be sent across threads.
pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Type alias for Results with our custom Error type.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Categories of errors that can occur while benchmarking a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    /// Page number outside of the document.
    OutOfRange,
    /// Endpoint answered with a non-success status code.
    Http,
    /// Connection-level failure or a stream that closed early.
    Transport,
    /// Response body is missing a required field.
    Decode,
    /// Request exceeded its deadline.
    Timeout,
    /// Aggregation over zero results.
    EmptyInput,
    /// Rasterization or image encoding failed.
    Render,
    /// Invalid configuration.
    Configuration,
}

/// A structured error type shared by all providers.
#[derive(Debug, Error)]
#[error("{kind:?}{}", message.as_ref().map(|m| format!(": {}", m)).unwrap_or_default())]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional error message.
    pub message: Option<String>,
    /// HTTP status code, if the failure came from an HTTP response.
    pub status: Option<u16>,
    /// Optional source error.
    #[source]
    pub source: Option<BoxedError>,
}

impl Error {
    /// Creates a new error with the given kind.
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            status: None,
            source: None,
        }
    }

    /// Adds a message to this error.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Adds an HTTP status code to this error.
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Adds a source error to this error.
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Creates a new page out of range error.
    pub fn out_of_range(page: u32, page_count: u32) -> Self {
        Self::new(ErrorKind::OutOfRange)
            .with_message(format!("page {page} out of range (1-{page_count})"))
    }

    /// Creates a new HTTP status error.
    pub fn http(status: u16) -> Self {
        Self::new(ErrorKind::Http).with_status(status)
    }

    /// Creates a new transport error.
    pub fn transport() -> Self {
        Self::new(ErrorKind::Transport)
    }

    /// Creates a new decode error.
    pub fn decode() -> Self {
        Self::new(ErrorKind::Decode)
    }

    /// Creates a new timeout error.
    pub fn timeout() -> Self {
        Self::new(ErrorKind::Timeout)
    }

    /// Creates a new empty input error.
    pub fn empty_input() -> Self {
        Self::new(ErrorKind::EmptyInput)
    }

    /// Creates a new render error.
    pub fn render() -> Self {
        Self::new(ErrorKind::Render)
    }

    /// Creates a new configuration error.
    pub fn configuration() -> Self {
        Self::new(ErrorKind::Configuration)
    }

    /// Returns the error kind.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the error kind as a string.
    pub fn kind_str(&self) -> &'static str {
        self.kind.into()
    }

    /// Returns true if a retry could plausibly succeed.
    ///
    /// Only connection-level failures and timeouts qualify; an HTTP status
    /// or a malformed body will fail the same way again.
    pub fn is_retryable(&self) -> bool {
        matches!(self.kind, ErrorKind::Transport | ErrorKind::Timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_message() {
        let err = Error::out_of_range(0, 12);
        assert_eq!(err.to_string(), "OutOfRange: page 0 out of range (1-12)");
        assert_eq!(err.kind_str(), "out_of_range");
    }

    #[test]
    fn http_error_carries_status() {
        let err = Error::http(503).with_message("service unavailable");
        assert_eq!(err.kind(), ErrorKind::Http);
        assert_eq!(err.status, Some(503));
        assert!(!err.is_retryable());
    }

    #[test]
    fn only_transport_and_timeout_are_retryable() {
        assert!(Error::transport().is_retryable());
        assert!(Error::timeout().is_retryable());
        assert!(!Error::decode().is_retryable());
        assert!(!Error::empty_input().is_retryable());
    }
}
