#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Tracing target for scheduling: admissions, completions, failures.
pub const TRACING_TARGET_SCHEDULER: &str = "ocrbench_harness::scheduler";

/// Tracing target for report aggregation.
pub const TRACING_TARGET_REPORT: &str = "ocrbench_harness::report";

pub mod error;
#[doc(hidden)]
pub mod prelude;
mod report;
mod scheduler;

pub use crate::error::{Error, Result};
pub use crate::report::{BenchmarkReport, FailedPage};
pub use crate::scheduler::{
    Discipline, PageFailure, Progress, ProgressFn, RunOutcome, Scheduler, SchedulerBuilder,
    SchedulerConfig,
};
