//! Dispatch disciplines.

#[cfg(feature = "config")]
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// How pages are dispatched under the concurrency limit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[derive(Serialize, Deserialize, Display, EnumString)]
#[cfg_attr(feature = "config", derive(ValueEnum))]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Discipline {
    /// Keep the limit saturated, dispatching the next page as soon as any
    /// in-flight page completes.
    #[default]
    Windowed,
    /// Dispatch consecutive groups of `limit` pages and wait for each whole
    /// group before starting the next.
    Batched,
}
