//! Prelude for the ocrbench-harness crate
//!
//! This module re-exports the most commonly used types from the crate
//! to provide a convenient single import for users.

pub use crate::error::{Error, Result};
pub use crate::report::BenchmarkReport;
pub use crate::scheduler::{Discipline, Progress, RunOutcome, Scheduler, SchedulerConfig};
