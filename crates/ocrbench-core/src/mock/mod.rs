//! Mock provider for testing schedulers without a live endpoint.
//!
//! # Feature Flag
//!
//! This module is only available when the `test-utils` feature is enabled:
//!
//! ```toml
//! [dev-dependencies]
//! ocrbench-core = { version = "...", features = ["test-utils"] }
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use std::time::Duration;
//! use ocrbench_core::mock::MockProvider;
//!
//! let provider = MockProvider::new()
//!     .with_delay(1, Duration::from_secs(3))
//!     .with_failure(4);
//! ```

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::{Error, OcrProvider, OcrResult, PreparedPage, Result};

/// Provider that sleeps for a configurable time per page and records how
/// many calls overlapped.
#[derive(Debug, Default)]
pub struct MockProvider {
    default_delay: Duration,
    delays: HashMap<u32, Duration>,
    failures: HashSet<u32>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
    completions: Mutex<Vec<u32>>,
}

impl MockProvider {
    /// Creates a provider that answers every page immediately.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the delay used for pages without an explicit delay.
    pub fn with_default_delay(mut self, delay: Duration) -> Self {
        self.default_delay = delay;
        self
    }

    /// Sets the delay for one page.
    pub fn with_delay(mut self, page_number: u32, delay: Duration) -> Self {
        self.delays.insert(page_number, delay);
        self
    }

    /// Makes one page fail with a transport error after its delay.
    pub fn with_failure(mut self, page_number: u32) -> Self {
        self.failures.insert(page_number);
        self
    }

    /// Returns the highest number of calls observed in flight at once.
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    /// Returns the number of calls currently in flight.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Returns page numbers in the order their calls finished.
    pub fn completion_order(&self) -> Vec<u32> {
        self.completions
            .lock()
            .map(|order| order.clone())
            .unwrap_or_default()
    }

    fn delay_for(&self, page_number: u32) -> Duration {
        self.delays
            .get(&page_number)
            .copied()
            .unwrap_or(self.default_delay)
    }
}

/// Decrements the in-flight counter on every exit path.
struct InFlightGuard<'a>(&'a AtomicUsize);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl OcrProvider for MockProvider {
    async fn recognize(&self, page: &PreparedPage) -> Result<OcrResult> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
        let _guard = InFlightGuard(&self.in_flight);

        let delay = self.delay_for(page.page_number);
        tokio::time::sleep(delay).await;

        if let Ok(mut order) = self.completions.lock() {
            order.push(page.page_number);
        }

        if self.failures.contains(&page.page_number) {
            return Err(Error::transport().with_message("connection reset by mock"));
        }

        let text = format!("mock transcription of page {}", page.page_number);
        Ok(OcrResult::new(page.page_number, delay, text))
    }
}
