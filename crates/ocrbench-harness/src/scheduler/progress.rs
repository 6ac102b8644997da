//! Progress events emitted while a run is in flight.

use std::sync::Arc;
use std::time::Duration;

/// Snapshot emitted after each completion (windowed) or group (batched).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    /// Pages finished so far, successfully or not; never decreases.
    pub completed: usize,
    /// Pages submitted to the run.
    pub total: usize,
    /// Time since the run started.
    pub elapsed: Duration,
    /// Page that just finished; `None` for a whole batched group.
    pub page_number: Option<u32>,
    /// Duration of that page's request, if it succeeded.
    pub page_duration: Option<Duration>,
}

impl Progress {
    /// Returns true once every page has finished.
    pub fn is_finished(&self) -> bool {
        self.completed == self.total
    }
}

/// Callback invoked with every [`Progress`] event.
pub type ProgressFn = Arc<dyn Fn(&Progress) + Send + Sync>;
