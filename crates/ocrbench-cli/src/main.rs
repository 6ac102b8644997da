#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod config;
mod output;
mod pipeline;
mod telemetry;

use std::process;

use anyhow::{Context, bail};

use crate::config::Cli;

// Tracing target constants
pub const TRACING_TARGET_STARTUP: &str = "ocrbench_cli::startup";
pub const TRACING_TARGET_SHUTDOWN: &str = "ocrbench_cli::shutdown";
pub const TRACING_TARGET_CONFIG: &str = "ocrbench_cli::config";
pub const TRACING_TARGET_PIPELINE: &str = "ocrbench_cli::pipeline";

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let Err(error) = run().await else {
        tracing::debug!(
            target: TRACING_TARGET_SHUTDOWN,
            "benchmark finished successfully"
        );
        process::exit(0);
    };

    if tracing::enabled!(tracing::Level::ERROR) {
        tracing::error!(
            target: TRACING_TARGET_SHUTDOWN,
            error = format!("{error:#}"),
            "benchmark terminated with error"
        );
    } else {
        eprintln!("Error: {error:#}");
    }

    process::exit(1);
}

/// Main application entry point.
async fn run() -> anyhow::Result<()> {
    let cli = Cli::init();

    telemetry::init_tracing()?;
    cli.log();
    cli.validate()?;

    let run = pipeline::run(&cli).await?;
    let report = &run.report;

    if cli.benchmark.json {
        let json = output::format_json(report, run.metrics.as_ref())
            .context("failed to serialize report")?;
        println!("{json}");
    } else {
        print!("{}", output::format_report(report));
        if let Some(metrics) = &run.metrics {
            print!("{}", output::format_metrics(metrics));
        }
        if cli.benchmark.show_text {
            print!("{}", output::format_transcriptions(report));
        }
    }

    if !report.is_complete() {
        bail!(
            "{} of {} pages failed",
            report.failures.len(),
            report.failures.len() + report.total_pages
        );
    }

    Ok(())
}
