//! Human-readable and JSON rendering of benchmark results.

use std::fmt::Write;

use ocrbench_client::MetricSnapshot;
use ocrbench_harness::BenchmarkReport;
use serde::Serialize;

const RULE_WIDTH: usize = 80;

fn banner(out: &mut String, title: &str) {
    let rule = "=".repeat(RULE_WIDTH);
    let _ = write!(out, "\n{rule}\n{title}\n{rule}\n\n");
}

/// Formats the summary block and the per-page breakdown.
pub fn format_report(report: &BenchmarkReport) -> String {
    let mut out = String::new();
    banner(&mut out, "BENCHMARK RESULTS");

    let _ = writeln!(out, "Run ID:                    {}", report.run_id);
    let _ = writeln!(out, "Total pages processed:     {}", report.total_pages);
    let _ = writeln!(out, "Parallel requests:         {}", report.concurrency);
    let _ = writeln!(out, "Scheduling discipline:     {}", report.discipline);
    let _ = writeln!(
        out,
        "Total duration:            {:.2}s",
        report.total_duration.as_secs_f64()
    );
    let _ = writeln!(
        out,
        "Average page duration:     {:.2}s",
        report.avg_page_duration.as_secs_f64()
    );
    let _ = writeln!(
        out,
        "Throughput:                {:.2} pages/sec",
        report.pages_per_sec
    );
    let _ = writeln!(out, "Total tokens extracted:    {}", report.total_tokens);
    let _ = writeln!(
        out,
        "Avg tokens/sec per page:   {:.1}",
        report.avg_tokens_per_sec
    );

    let _ = writeln!(out, "\nPer-page breakdown:");
    for result in &report.results {
        let _ = writeln!(
            out,
            "  Page {}: {:.2}s, {} tokens, {:.1} tok/s, {} chars",
            result.page_number,
            result.duration.as_secs_f64(),
            result.tokens,
            result.tokens_per_sec,
            result.text_length
        );
    }

    if !report.failures.is_empty() {
        let _ = writeln!(out, "\nFailed pages:");
        for failure in &report.failures {
            let _ = writeln!(out, "  Page {}: {}", failure.page_number, failure.message);
        }
    }

    out
}

/// Formats the extracted text of every page.
pub fn format_transcriptions(report: &BenchmarkReport) -> String {
    let mut out = String::new();
    banner(&mut out, "TRANSCRIPTIONS");

    for result in &report.results {
        let _ = writeln!(out, "--- Page {} ---\n{}\n", result.page_number, result.text);
    }

    out
}

/// Formats a metrics snapshot, one sample per line in name order.
pub fn format_metrics(snapshot: &MetricSnapshot) -> String {
    let mut out = String::new();
    banner(&mut out, "vLLM METRICS");

    if snapshot.is_empty() {
        let _ = writeln!(out, "(no load metrics reported)");
    }
    for (name, value) in snapshot.iter() {
        let _ = writeln!(out, "{name}: {value}");
    }

    out
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    report: &'a BenchmarkReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    metrics: Option<&'a MetricSnapshot>,
}

/// Renders the report, and metrics if fetched, as pretty JSON.
pub fn format_json(
    report: &BenchmarkReport,
    metrics: Option<&MetricSnapshot>,
) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&JsonOutput { report, metrics })
}
