//! Scheduler configuration.

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use super::Discipline;
use crate::error::Error;

/// Configuration for a [`Scheduler`](super::Scheduler).
#[derive(Debug, Clone, PartialEq, Eq, Builder, Serialize, Deserialize)]
#[builder(
    name = "SchedulerBuilder",
    pattern = "owned",
    setter(into, prefix = "with"),
    build_fn(validate = "Self::validate", error = "Error")
)]
pub struct SchedulerConfig {
    /// Maximum number of pages in flight at once.
    #[builder(default = "1")]
    pub concurrency: usize,

    /// How pages are dispatched under the limit.
    #[builder(default)]
    pub discipline: Discipline,

    /// Abort the run on the first failed page instead of collecting failures.
    #[builder(default = "false")]
    pub fail_fast: bool,
}

impl SchedulerConfig {
    /// Create a new configuration builder.
    pub fn builder() -> SchedulerBuilder {
        SchedulerBuilder::default()
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            concurrency: 1,
            discipline: Discipline::default(),
            fail_fast: false,
        }
    }
}

impl SchedulerBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(concurrency) = self.concurrency {
            if concurrency == 0 {
                return Err("concurrency must be at least 1".into());
            }
        }
        Ok(())
    }
}
