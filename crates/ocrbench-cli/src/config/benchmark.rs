//! Benchmark run configuration.

use anyhow::{Result as AnyhowResult, anyhow};
use clap::Args;
use ocrbench_harness::{Discipline, SchedulerConfig};

use super::PageSelection;
use crate::TRACING_TARGET_CONFIG;

/// Which pages to send and how hard to push the endpoint.
#[derive(Debug, Clone, Args)]
#[must_use = "config does nothing unless you use it"]
pub struct BenchmarkConfig {
    /// PDF to benchmark: a local path or an http(s) URL.
    #[arg(long, env = "OCR_PDF")]
    pub pdf: String,

    /// Pages to send: a range like 1-5, a list like 1,3,5, or both (1-3,7).
    #[arg(long, default_value = "1-3")]
    pub pages: PageSelection,

    /// Maximum number of requests in flight.
    #[arg(short = 'c', long, visible_alias = "parallel", env = "OCR_CONCURRENCY", default_value_t = 1)]
    pub concurrency: usize,

    /// How requests are dispatched under the concurrency limit.
    #[arg(long, value_enum, default_value_t = Discipline::Windowed)]
    pub discipline: Discipline,

    /// Abort on the first failed page instead of reporting partial results.
    #[arg(long, default_value_t = false)]
    pub fail_fast: bool,

    /// Fetch and print the server's load metrics after the run.
    #[arg(long, default_value_t = false)]
    pub metrics: bool,

    /// Print each page's transcription after the summary.
    #[arg(long, default_value_t = false)]
    pub show_text: bool,

    /// Print the report as JSON instead of text.
    #[arg(long, default_value_t = false)]
    pub json: bool,

    /// Directory holding the pdfium shared library; falls back to the system library.
    #[arg(long, env = "PDFIUM_LIB_DIR")]
    pub pdfium_dir: Option<String>,
}

impl BenchmarkConfig {
    /// Validates all configuration values.
    pub fn validate(&self) -> AnyhowResult<()> {
        if self.concurrency == 0 {
            return Err(anyhow!("Concurrency must be at least 1."));
        }
        if self.pdf.trim().is_empty() {
            return Err(anyhow!("PDF source must not be empty."));
        }
        Ok(())
    }

    /// Builds the scheduler configuration.
    pub fn scheduler_config(&self) -> AnyhowResult<SchedulerConfig> {
        Ok(SchedulerConfig::builder()
            .with_concurrency(self.concurrency)
            .with_discipline(self.discipline)
            .with_fail_fast(self.fail_fast)
            .build()?)
    }

    /// Logs configuration.
    pub fn log(&self) {
        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            pdf = %self.pdf,
            pages = %self.pages,
            page_count = self.pages.len(),
            concurrency = self.concurrency,
            discipline = %self.discipline,
            fail_fast = self.fail_fast,
            "Benchmark configuration"
        );
    }
}
