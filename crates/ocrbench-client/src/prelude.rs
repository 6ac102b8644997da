//! Prelude for the ocrbench-client crate
//!
//! This module re-exports the most commonly used types from the crate
//! to provide a convenient single import for users.

pub use crate::client::{OcrClient, OcrClientConfig, OcrCredentials};
pub use crate::error::{Error, Result};
pub use crate::metrics::{MetricSnapshot, MetricsCollector};
