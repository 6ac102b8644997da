#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Tracing target for OCR client operations.
///
/// Use this target for logging requests, retries, and endpoint errors.
pub const TRACING_TARGET_CLIENT: &str = "ocrbench_client::client";

/// Tracing target for server metrics collection.
pub const TRACING_TARGET_METRICS: &str = "ocrbench_client::metrics";

mod client;
pub mod error;
mod metrics;
#[doc(hidden)]
pub mod prelude;
mod provider;

pub use crate::client::{
    DEFAULT_MODEL, OcrClient, OcrClientBuilder, OcrClientConfig, OcrCredentials, StreamDecoder,
    collect_stream,
};
pub use crate::error::{Error, Result};
pub use crate::metrics::{LOAD_METRIC_PATTERNS, MetricSnapshot, MetricsCollector};
