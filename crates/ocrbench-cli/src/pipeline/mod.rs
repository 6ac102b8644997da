//! End-to-end benchmark: load, prepare, dispatch, aggregate.

mod prepare;
mod source;

use anyhow::{Context, bail};
use ocrbench_client::{MetricSnapshot, OcrClient};
use ocrbench_harness::{BenchmarkReport, Progress, Scheduler};

pub use self::prepare::{PreparedDocument, prepare_pages};
pub use self::source::DocumentSource;
use crate::TRACING_TARGET_PIPELINE;
use crate::config::Cli;

/// Everything a benchmark run produced.
#[derive(Debug)]
pub struct BenchmarkRun {
    pub report: BenchmarkReport,
    pub metrics: Option<MetricSnapshot>,
}

/// Runs the benchmark described by `cli`.
pub async fn run(cli: &Cli) -> anyhow::Result<BenchmarkRun> {
    let endpoint = &cli.endpoint;
    let benchmark = &cli.benchmark;

    let client = OcrClient::new(endpoint.client_config()?, endpoint.credentials())
        .context("failed to create OCR client")?;

    let source = DocumentSource::parse(&benchmark.pdf);
    let data = source.load(&client).await?;

    let prepared = prepare_pages(
        data,
        benchmark.pages.pages().to_vec(),
        cli.raster,
        benchmark.pdfium_dir.clone(),
    )
    .await?;

    tracing::info!(
        target: TRACING_TARGET_PIPELINE,
        pages = prepared.pages.len(),
        page_count = prepared.page_count,
        "Pages prepared"
    );

    let scheduler_config = benchmark.scheduler_config()?;
    let scheduler = Scheduler::new(client.clone(), scheduler_config).with_progress(print_progress);
    let outcome = scheduler.run(&prepared.pages).await?;

    if outcome.results.is_empty() {
        for failure in &outcome.failures {
            eprintln!("  Page {} failed: {}", failure.page_number, failure.error);
        }
        bail!("all {} pages failed", outcome.failures.len());
    }

    let report = BenchmarkReport::from_outcome(outcome, benchmark.concurrency, benchmark.discipline)?;

    let metrics = if benchmark.metrics {
        let collector = client.metrics()?;
        let snapshot = collector
            .fetch()
            .await
            .with_context(|| format!("failed to fetch metrics from {}", collector.url()))?;
        Some(snapshot)
    } else {
        None
    };

    Ok(BenchmarkRun { report, metrics })
}

fn print_progress(progress: &Progress) {
    let elapsed = progress.elapsed.as_secs_f64();
    match (progress.page_number, progress.page_duration) {
        (Some(page), Some(duration)) => eprintln!(
            "  Completed {}/{} pages in {:.1}s (page {}: {:.1}s)",
            progress.completed,
            progress.total,
            elapsed,
            page,
            duration.as_secs_f64()
        ),
        (Some(page), None) => eprintln!(
            "  Completed {}/{} pages in {:.1}s (page {} failed)",
            progress.completed, progress.total, elapsed, page
        ),
        _ => eprintln!(
            "  Completed {}/{} pages in {:.1}s",
            progress.completed, progress.total, elapsed
        ),
    }
}
