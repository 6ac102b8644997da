//! CLI configuration management.
//!
//! This module defines the complete CLI configuration hierarchy:
//!
//! ```text
//! Cli
//! ├── endpoint: EndpointConfig    # URL, model, generation, timeout, auth
//! ├── benchmark: BenchmarkConfig  # PDF source, pages, concurrency, output
//! └── raster: RasterSpec          # Longest-edge cap and render scale
//! ```
//!
//! All configuration can be provided via CLI arguments or environment variables.
//! Use `--help` to see all available options.
//!
//! # Example
//!
//! ```bash
//! ocrbench --url https://name--lighton-ocr-vllm-serve.modal.run \
//!     --pdf ./report.pdf --pages 1-10 --concurrency 4
//!
//! # Or via environment variables
//! OCR_URL=http://localhost:8000 OCR_PDF=./report.pdf ocrbench --stream
//! ```

mod benchmark;
mod endpoint;
mod pages;

use std::process;

use anyhow::Context;
pub use benchmark::BenchmarkConfig;
use clap::Parser;
pub use endpoint::EndpointConfig;
use ocrbench_render::RasterSpec;
pub use pages::{PageSelection, PageSelectionError};

use crate::{TRACING_TARGET_CONFIG, TRACING_TARGET_STARTUP};

/// Complete CLI configuration.
#[derive(Debug, Clone, Parser)]
#[command(name = "ocrbench")]
#[command(about = "Benchmark OCR throughput of an OpenAI-compatible vision endpoint")]
#[command(version)]
pub struct Cli {
    /// Endpoint, model, and request settings.
    #[clap(flatten)]
    pub endpoint: EndpointConfig,

    /// Page selection, concurrency, and output settings.
    #[clap(flatten)]
    pub benchmark: BenchmarkConfig,

    /// Rasterization settings.
    #[clap(flatten)]
    pub raster: RasterSpec,
}

impl Cli {
    /// Loads environment variables from .env file (if enabled) and parses CLI arguments.
    ///
    /// The .env file is loaded before clap parses arguments so that its
    /// values can serve as `env` fallbacks.
    pub fn init() -> Self {
        Self::load_dotenv();
        Self::parse()
    }

    /// Loads environment variables from .env file if the dotenv feature is enabled.
    #[cfg(feature = "dotenv")]
    fn load_dotenv() {
        if let Err(err) = dotenvy::dotenv()
            && !err.not_found()
        {
            eprintln!("Warning: failed to load .env file: {err}");
        }
    }

    /// No-op when dotenv feature is disabled.
    #[cfg(not(feature = "dotenv"))]
    fn load_dotenv() {}

    /// Validates all configuration values.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.endpoint
            .validate()
            .context("invalid endpoint configuration")?;
        self.benchmark
            .validate()
            .context("invalid benchmark configuration")?;
        self.raster
            .validate()
            .context("invalid raster configuration")?;
        Ok(())
    }

    /// Logs configuration (no sensitive information).
    pub fn log(&self) {
        Self::log_build_info();
        self.endpoint.log();
        self.benchmark.log();

        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            max_dimension = self.raster.max_dimension,
            dpi_scale = self.raster.dpi_scale,
            pdfium_dir = ?self.benchmark.pdfium_dir,
            "Raster configuration"
        );
    }

    /// Logs build information at debug level.
    fn log_build_info() {
        tracing::debug!(
            target: TRACING_TARGET_STARTUP,
            version = env!("CARGO_PKG_VERSION"),
            pid = process::id(),
            arch = std::env::consts::ARCH,
            os = std::env::consts::OS,
            features = ?Self::enabled_features(),
            "Build information"
        );
    }

    /// Returns a list of enabled compile-time features.
    fn enabled_features() -> Vec<&'static str> {
        [cfg!(feature = "dotenv").then_some("dotenv")]
            .into_iter()
            .flatten()
            .collect()
    }
}
