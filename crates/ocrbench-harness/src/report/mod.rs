//! Reduction of per-page results into a benchmark summary.

use std::time::Duration;

use jiff::Timestamp;
use ocrbench_core::OcrResult;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::TRACING_TARGET_REPORT;
use crate::error::{Error, Result};
use crate::scheduler::{Discipline, RunOutcome};

/// A page that failed, as recorded in a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailedPage {
    /// 1-based page number.
    pub page_number: u32,
    /// Failure category, such as `http` or `timeout`.
    pub kind: String,
    /// Human-readable failure description.
    pub message: String,
}

/// Summary statistics of a benchmark run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkReport {
    /// Time-ordered identifier of the run.
    pub run_id: Uuid,
    /// Number of pages that produced a result.
    pub total_pages: usize,
    /// Concurrency limit the run used.
    pub concurrency: usize,
    /// Dispatch discipline the run used.
    #[serde(default)]
    pub discipline: Discipline,
    /// Wall-clock duration of the whole run.
    #[serde(with = "secs_f64")]
    pub total_duration: Duration,
    /// Mean per-page request duration.
    #[serde(with = "secs_f64")]
    pub avg_page_duration: Duration,
    /// `total_pages / total_duration`.
    pub pages_per_sec: f64,
    /// Sum of the per-page token estimates.
    pub total_tokens: usize,
    /// Mean of the per-page tokens-per-second figures.
    pub avg_tokens_per_sec: f64,
    /// Per-page results in submission order.
    pub results: Vec<OcrResult>,
    /// Pages that failed, in submission order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<FailedPage>,
    /// When the report was produced.
    pub generated_at: Timestamp,
}

impl BenchmarkReport {
    /// Summarizes `results` from a run of `total_duration` dispatched under
    /// `concurrency` with `discipline`.
    ///
    /// Fails with [`Error::EmptyInput`] when `results` is empty, since the
    /// means are undefined.
    pub fn summarize(
        results: Vec<OcrResult>,
        concurrency: usize,
        discipline: Discipline,
        total_duration: Duration,
    ) -> Result<Self> {
        if results.is_empty() {
            return Err(Error::EmptyInput);
        }

        let count = results.len();
        let total_tokens = results.iter().map(|r| r.tokens).sum();
        let avg_page_duration = results.iter().map(|r| r.duration).sum::<Duration>() / count as u32;
        let avg_tokens_per_sec =
            results.iter().map(|r| r.tokens_per_sec).sum::<f64>() / count as f64;

        let total_secs = total_duration.as_secs_f64();
        let pages_per_sec = if total_secs > 0.0 {
            count as f64 / total_secs
        } else {
            0.0
        };

        let report = Self {
            run_id: Uuid::now_v7(),
            total_pages: count,
            concurrency,
            discipline,
            total_duration,
            avg_page_duration,
            pages_per_sec,
            total_tokens,
            avg_tokens_per_sec,
            results,
            failures: Vec::new(),
            generated_at: Timestamp::now(),
        };

        tracing::debug!(
            target: TRACING_TARGET_REPORT,
            run_id = %report.run_id,
            total_pages = report.total_pages,
            pages_per_sec = report.pages_per_sec,
            total_tokens = report.total_tokens,
            "Report summarized"
        );

        Ok(report)
    }

    /// Summarizes a scheduler outcome, carrying its failures along.
    ///
    /// Throughput counts successful pages only.
    pub fn from_outcome(
        outcome: RunOutcome,
        concurrency: usize,
        discipline: Discipline,
    ) -> Result<Self> {
        let failures = outcome
            .failures
            .iter()
            .map(|failure| FailedPage {
                page_number: failure.page_number,
                kind: failure.error.kind_str().to_string(),
                message: failure.error.to_string(),
            })
            .collect();

        let mut report =
            Self::summarize(outcome.results, concurrency, discipline, outcome.elapsed)?;
        report.failures = failures;
        Ok(report)
    }

    /// Returns true if no page failed.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

mod secs_f64 {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(duration.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
    }
}
