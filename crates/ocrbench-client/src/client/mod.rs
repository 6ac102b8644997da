//! OCR client module
//!
//! This module provides the client for OpenAI-compatible OCR endpoints,
//! its configuration, and the wire types it speaks.

mod completion;
mod credentials;
mod ocr_client;
mod ocr_config;
mod stream;

pub use credentials::OcrCredentials;
pub use ocr_client::OcrClient;
pub use ocr_config::{DEFAULT_MODEL, OcrClientBuilder, OcrClientConfig};
pub use stream::{StreamDecoder, collect_stream};
