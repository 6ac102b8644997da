//! OCR endpoint configuration.

use std::time::Duration;

use anyhow::{Context, Result as AnyhowResult, anyhow};
use clap::Args;
use ocrbench_client::{DEFAULT_MODEL, OcrClientConfig, OcrCredentials};
use ocrbench_core::GenerationParams;

use crate::TRACING_TARGET_CONFIG;

/// Where the OCR model is served and how it is asked to generate.
///
/// # Environment Variables
///
/// - `OCR_URL` - Base URL of the OpenAI-compatible endpoint (required)
/// - `OCR_MODEL` - Model identifier (default: lightonai/LightOnOCR-1B-1025)
/// - `OCR_API_KEY` - Bearer token, if the endpoint requires one
/// - `OCR_TIMEOUT` - Per-request deadline in seconds (default: 300)
/// - `OCR_RETRIES` - Retries after connection failures or timeouts (default: 0)
#[derive(Debug, Clone, Args)]
#[must_use = "config does nothing unless you use it"]
pub struct EndpointConfig {
    /// Base URL of the endpoint, e.g. https://name--lighton-ocr-vllm-serve.modal.run
    #[arg(long, env = "OCR_URL")]
    pub url: String,

    /// Model identifier sent with every request.
    #[arg(long, env = "OCR_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Request an incremental event stream instead of a single JSON body.
    #[arg(long, env = "OCR_STREAM", default_value_t = false)]
    pub stream: bool,

    /// Upper bound on generated tokens per page.
    #[arg(long, env = "OCR_MAX_TOKENS", default_value_t = 4096)]
    pub max_tokens: u32,

    /// Sampling temperature.
    #[arg(long, env = "OCR_TEMPERATURE", default_value_t = 0.2)]
    pub temperature: f32,

    /// Nucleus sampling cutoff; omitted from requests when unset.
    #[arg(long, env = "OCR_TOP_P")]
    pub top_p: Option<f32>,

    /// Deadline for a single request in seconds, including the full body.
    #[arg(long, env = "OCR_TIMEOUT", default_value_t = 300)]
    pub timeout: u64,

    /// Retries after a connection failure or timeout. Error statuses are never retried.
    #[arg(long, env = "OCR_RETRIES", default_value_t = 0)]
    pub retries: u32,

    /// Bearer token for endpoints behind authentication.
    #[arg(long, env = "OCR_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,
}

impl EndpointConfig {
    /// Validates values the client builder cannot check on its own.
    pub fn validate(&self) -> AnyhowResult<()> {
        if self.timeout == 0 || self.timeout > 3600 {
            return Err(anyhow!(
                "Timeout {} seconds is invalid. Must be between 1 and 3600 seconds.",
                self.timeout
            ));
        }
        Ok(())
    }

    /// Builds the client configuration.
    pub fn client_config(&self) -> AnyhowResult<OcrClientConfig> {
        let generation = GenerationParams {
            max_output_tokens: self.max_tokens,
            temperature: self.temperature,
            top_p: self.top_p,
            streaming: self.stream,
        };

        OcrClientConfig::builder()
            .with_base_url(&self.url)?
            .with_model(self.model.as_str())
            .with_generation(generation)
            .with_timeout(Duration::from_secs(self.timeout))
            .with_max_retries(self.retries)
            .build()
            .context("invalid endpoint configuration")
    }

    /// Returns the credentials to authenticate with.
    pub fn credentials(&self) -> OcrCredentials {
        OcrCredentials::from_optional(self.api_key.clone())
    }

    /// Logs configuration (no secrets).
    pub fn log(&self) {
        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            url = %self.url,
            model = %self.model,
            stream = self.stream,
            max_tokens = self.max_tokens,
            temperature = self.temperature,
            top_p = ?self.top_p,
            timeout_secs = self.timeout,
            retries = self.retries,
            authenticated = self.api_key.is_some(),
            "Endpoint configuration"
        );
    }
}
