//! Stats collector configuration.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// Configuration for the stats collector.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Getters,
    derive_setters::Setters,
    derive_builder::Builder,
)]
#[setters(prefix = "with_")]
pub struct StatsConfig {
    /// Whether resolutions are recorded at all
    #[serde(default = "default_enabled")]
    #[builder(default = "default_enabled()")]
    enabled: bool,

    /// Log entries kept before the oldest are dropped
    #[serde(default = "default_max_logs")]
    #[builder(default = "default_max_logs()")]
    max_logs: usize,

    /// Distinct variable names counted for `top_variables`; names first seen
    /// once this many are tracked are not counted
    #[serde(default = "default_max_variables")]
    #[builder(default = "default_max_variables()")]
    max_variables: usize,
}

fn default_enabled() -> bool {
    true
}

fn default_max_logs() -> usize {
    1000
}

fn default_max_variables() -> usize {
    1000
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            max_logs: default_max_logs(),
            max_variables: default_max_variables(),
        }
    }
}
