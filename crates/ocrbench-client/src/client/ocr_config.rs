//! OCR client configuration
//!
//! This module provides the configuration structure and builder for [`OcrClient`].
//!
//! [`OcrClient`]: super::OcrClient

use std::time::Duration;

use derive_builder::Builder;
use ocrbench_core::GenerationParams;
use url::Url;

use crate::error::{Error, Result};

/// Model identifier served by the reference LightOnOCR deployment.
pub const DEFAULT_MODEL: &str = "lightonai/LightOnOCR-1B-1025";

/// Configuration for the OCR client
///
/// Contains the endpoint, the model and generation parameters sent with every
/// request, and the deadline and retry policy applied to each call.
#[derive(Debug, Clone, Builder)]
#[builder(
    name = "OcrClientBuilder",
    pattern = "owned",
    setter(into, strip_option, prefix = "with"),
    build_fn(validate = "Self::validate_config", error = "Error")
)]
pub struct OcrClientConfig {
    /// Base URL of the OpenAI-compatible endpoint
    #[builder(setter(custom))]
    pub base_url: Url,
    /// Model identifier
    #[builder(default = "DEFAULT_MODEL.to_string()")]
    pub model: String,
    /// Generation parameters
    #[builder(default)]
    pub generation: GenerationParams,
    /// Deadline for a single attempt, including reading the full body
    #[builder(default = "Duration::from_secs(300)")]
    pub timeout: Duration,
    /// Connection timeout duration
    #[builder(default = "Duration::from_secs(10)")]
    pub connect_timeout: Duration,
    /// Extra attempts after a connection failure or timeout
    #[builder(default = "0")]
    pub max_retries: u32,
    /// Base delay between attempts, multiplied by the attempt number
    #[builder(default = "Duration::from_millis(500)")]
    pub retry_backoff: Duration,
    /// User agent string for requests
    #[builder(default = "OcrClientConfig::default_user_agent()")]
    pub user_agent: String,
}

impl OcrClientConfig {
    /// Create a new configuration builder
    pub fn builder() -> OcrClientBuilder {
        OcrClientBuilder::default()
    }

    /// Resolves `path` against the base URL, keeping any path prefix.
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let url = format!("{}/{}", base, path.trim_start_matches('/'));
        Ok(url.parse()?)
    }

    fn default_user_agent() -> String {
        format!("ocrbench/{}", env!("CARGO_PKG_VERSION"))
    }
}

impl OcrClientBuilder {
    /// Set the base URL of the endpoint
    pub fn with_base_url(mut self, url: &str) -> Result<Self> {
        let parsed: Url = url
            .parse()
            .map_err(|e| Error::invalid_config(format!("Invalid base URL '{}': {}", url, e)))?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(Error::invalid_config(format!(
                "Base URL '{}' must use http or https",
                url
            )));
        }

        self.base_url = Some(parsed);
        Ok(self)
    }

    fn validate_config(&self) -> std::result::Result<(), String> {
        if let Some(timeout) = &self.timeout {
            if timeout.is_zero() {
                return Err("Timeout must be greater than 0".to_string());
            }
        }

        if let Some(connect_timeout) = &self.connect_timeout {
            if connect_timeout.is_zero() {
                return Err("Connect timeout must be greater than 0".to_string());
            }
        }

        if let Some(model) = &self.model {
            if model.trim().is_empty() {
                return Err("Model must not be empty".to_string());
            }
        }

        if let Some(generation) = &self.generation {
            if generation.max_output_tokens == 0 {
                return Err("Max output tokens must be greater than 0".to_string());
            }
            if !(0.0..=2.0).contains(&generation.temperature) {
                return Err(format!(
                    "Temperature must be within 0.0-2.0, got {}",
                    generation.temperature
                ));
            }
            if let Some(top_p) = generation.top_p {
                if !(top_p > 0.0 && top_p <= 1.0) {
                    return Err(format!("Top-p must be within (0.0, 1.0], got {}", top_p));
                }
            }
        }

        Ok(())
    }
}
