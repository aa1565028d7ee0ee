//! Resolution statistics for Grimorio.
//!
//! Records what every resolution did, variable by variable, in a bounded
//! log, and keeps running totals for dashboards and debugging.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod collector;
mod config;

pub use collector::{ResolutionLog, StatsCollector, StatsSummary, VariableUsage};
pub use config::{StatsConfig, StatsConfigBuilder};
