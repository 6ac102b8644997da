//! Results of a scheduler run.

use std::time::Duration;

use ocrbench_core::OcrResult;

/// A page that failed, with the error attributed to it.
#[derive(Debug)]
pub struct PageFailure {
    /// 1-based page number.
    pub page_number: u32,
    /// Why the page failed.
    pub error: ocrbench_core::Error,
}

/// Everything a run produced, in page-submission order.
#[derive(Debug)]
pub struct RunOutcome {
    /// Successful pages.
    pub results: Vec<OcrResult>,
    /// Failed pages.
    pub failures: Vec<PageFailure>,
    /// Wall-clock duration of the whole run.
    pub elapsed: Duration,
}

impl RunOutcome {
    /// Returns true if every page succeeded.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Number of pages that were attempted.
    pub fn attempted(&self) -> usize {
        self.results.len() + self.failures.len()
    }
}
