//! Error types for ocrbench-harness.

/// Result type for all harness operations in this crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Unified error type for scheduling and aggregation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A page failed while the scheduler was running in fail-fast mode.
    #[error("Page {page} failed: {source}")]
    PageFailed {
        page: u32,
        #[source]
        source: ocrbench_core::Error,
    },

    /// Aggregation was asked to summarize zero results.
    #[error("Cannot summarize an empty result set")]
    EmptyInput,

    /// The admission gate was closed while pages were still pending.
    #[error("Admission gate closed")]
    GateClosed(#[from] tokio::sync::AcquireError),

    /// Invalid scheduler configuration.
    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },
}

impl Error {
    /// Create a page failure error
    pub fn page_failed(page: u32, source: ocrbench_core::Error) -> Self {
        Self::PageFailed { page, source }
    }

    /// Create an invalid configuration error
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    /// Returns the page a failure is attributed to, if any.
    pub fn page(&self) -> Option<u32> {
        match self {
            Self::PageFailed { page, .. } => Some(*page),
            _ => None,
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
        match err {
            Error::PageFailed { page, source } => {
                let message = match source.message.as_deref() {
                    Some(inner) => format!("page {page}: {inner}"),
                    None => format!("page {page}"),
                };
                Self {
                    message: Some(message),
                    ..source
                }
            }
            Error::EmptyInput => {
                Self::empty_input().with_message("cannot summarize an empty result set")
            }
            Error::GateClosed(e) => Self::configuration()
                .with_message(e.to_string())
                .with_source(e),
            Error::InvalidConfig { reason } => Self::configuration().with_message(reason),
        }
    }
}
