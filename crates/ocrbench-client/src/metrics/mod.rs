//! Server load snapshots from a Prometheus text endpoint.
//!
//! Only the vLLM gauges that describe queueing, cache pressure, and
//! throughput are kept; everything else on `/metrics` is dropped.

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::Client as HttpClient;
use serde::Serialize;
use url::Url;

use crate::TRACING_TARGET_METRICS;
use crate::client::{OcrClient, OcrClientConfig, OcrCredentials};
use crate::error::{Error, Result};

const METRICS_PATH: &str = "metrics";

/// Substrings identifying the metrics worth reporting.
pub const LOAD_METRIC_PATTERNS: [&str; 5] = [
    "vllm:num_requests_running",
    "vllm:num_requests_waiting",
    "vllm:gpu_cache_usage",
    "vllm:avg_prompt_throughput",
    "vllm:avg_generation_throughput",
];

/// Metric name (labels included) to value.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct MetricSnapshot {
    values: BTreeMap<String, f64>,
}

impl MetricSnapshot {
    /// Parses Prometheus text exposition, keeping allow-listed samples.
    ///
    /// Comment and blank lines are ignored, as are samples whose value does
    /// not parse as a number. Unparseable input yields an empty snapshot.
    pub fn parse(text: &str) -> Self {
        let values = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .filter_map(|line| {
                let mut parts = line.split_whitespace();
                let name = parts.next()?;
                let value = parts.next()?.parse::<f64>().ok()?;
                Some((name, value))
            })
            .filter(|(name, _)| LOAD_METRIC_PATTERNS.iter().any(|p| name.contains(p)))
            .map(|(name, value)| (name.to_string(), value))
            .collect();

        Self { values }
    }

    /// Returns the value recorded under an exact name.
    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    /// Iterates samples in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(name, value)| (name.as_str(), *value))
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if no allow-listed sample was found.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Fetches [`MetricSnapshot`]s from `{base_url}/metrics`.
///
/// Scrapes carry the owning client's credentials and are bounded by its
/// request timeout.
#[derive(Debug, Clone)]
pub struct MetricsCollector {
    http_client: HttpClient,
    credentials: OcrCredentials,
    url: Url,
    timeout: Duration,
}

impl MetricsCollector {
    pub(crate) fn from_client(
        http_client: HttpClient,
        config: &OcrClientConfig,
        credentials: OcrCredentials,
    ) -> Result<Self> {
        Ok(Self {
            http_client,
            credentials,
            url: config.endpoint(METRICS_PATH)?,
            timeout: config.timeout,
        })
    }

    /// Creates a standalone, unauthenticated collector for the endpoint at
    /// `base_url` with default timeouts.
    pub fn new(base_url: &str) -> Result<Self> {
        OcrClient::with_defaults(base_url)?.metrics()
    }

    /// Returns the URL being scraped.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Scrapes the endpoint once.
    ///
    /// Fails with [`Error::Timeout`] if the full body has not arrived within
    /// the request timeout.
    pub async fn fetch(&self) -> Result<MetricSnapshot> {
        let request = self.credentials.apply(self.http_client.get(self.url.clone()));
        let scrape = async {
            let response = request.send().await?;
            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(Error::status(status.as_u16(), body));
            }
            Ok::<_, Error>(response.text().await?)
        };

        let timeout = self.timeout;
        let text = tokio::time::timeout(timeout, scrape)
            .await
            .map_err(|_| Error::Timeout { timeout })??;
        let snapshot = MetricSnapshot::parse(&text);

        tracing::debug!(
            target: TRACING_TARGET_METRICS,
            url = %self.url,
            samples = snapshot.len(),
            "Fetched server metrics"
        );

        Ok(snapshot)
    }
}
