//! Resolution log and aggregate counters.

use crate::StatsConfig;
use chrono::{DateTime, Utc};
use derive_getters::Getters;
use grimorio_core::{CardId, ResolutionStats, VariableOutcome};
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::{HashMap, VecDeque};
use tracing::{debug, info, instrument};

/// One variable outcome from one resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Getters)]
pub struct ResolutionLog {
    /// When the resolution was recorded
    timestamp: DateTime<Utc>,
    /// Card the resolution started from, if any
    card_id: Option<CardId>,
    /// Key of that card
    card_key: Option<String>,
    /// Variable reference as written
    variable: String,
    /// What happened to it
    outcome: VariableOutcome,
}

/// Running totals since creation or the last reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Getters)]
pub struct StatsSummary {
    /// Resolutions recorded
    total_resolutions: u64,
    /// Of those, served from cache
    cache_served: u64,
    /// Sum of `resolved_count`
    resolved: u64,
    /// Sum of `empty_count`
    empty: u64,
    /// Sum of `error_count`
    errors: u64,
    /// Distinct variable names counted
    distinct_variables: usize,
}

/// How often a variable was referenced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Getters)]
pub struct VariableUsage {
    /// Variable reference
    name: String,
    /// Times referenced
    count: u64,
}

#[derive(Debug, Default)]
struct CollectorState {
    logs: VecDeque<ResolutionLog>,
    variable_counts: HashMap<String, u64>,
    summary: StatsSummary,
}

/// Thread-safe collector of resolution outcomes.
///
/// Keeps the most recent `max_logs` variable outcomes in a ring and running
/// totals that survive log rotation. Reference counts cover at most
/// `max_variables` names; malformed tokens are logged but never counted as
/// variables.
///
/// # Example
///
/// ```
/// use grimorio_core::{CardId, ResolutionStats, VariableOutcome};
/// use grimorio_stats::{StatsCollector, StatsConfig};
///
/// let collector = StatsCollector::new(StatsConfig::default());
///
/// let mut stats = ResolutionStats::new();
/// stats.record("npc.nombre", VariableOutcome::Resolved);
/// stats.record("npc.apodo", VariableOutcome::Unknown);
/// collector.record(Some(&CardId::new("c-1")), Some("saludo"), &stats);
///
/// assert_eq!(*collector.summary().total_resolutions(), 1);
/// assert_eq!(collector.recent_logs(10).len(), 2);
/// ```
#[derive(Debug)]
pub struct StatsCollector {
    config: StatsConfig,
    state: Mutex<CollectorState>,
}

impl StatsCollector {
    /// Creates a new collector.
    pub fn new(config: StatsConfig) -> Self {
        debug!(
            enabled = config.enabled(),
            max_logs = config.max_logs(),
            max_variables = config.max_variables(),
            "Creating new StatsCollector"
        );
        Self {
            config,
            state: Mutex::new(CollectorState::default()),
        }
    }

    /// Configuration in effect.
    pub fn config(&self) -> &StatsConfig {
        &self.config
    }

    /// Records one resolution.
    ///
    /// Every `(variable, outcome)` pair in `stats` becomes a log entry;
    /// the counters are added to the running totals.
    #[instrument(skip(self, card_id, stats))]
    pub fn record(
        &self,
        card_id: Option<&CardId>,
        card_key: Option<&str>,
        stats: &ResolutionStats,
    ) {
        if !self.config.enabled() {
            return;
        }

        let timestamp = Utc::now();
        let max_logs = *self.config.max_logs();
        let max_variables = *self.config.max_variables();
        let (resolved, empty, errors) = stats.counts();

        let mut state = self.state.lock();
        let summary = &mut state.summary;
        summary.total_resolutions += 1;
        if *stats.from_cache() {
            summary.cache_served += 1;
        }
        summary.resolved += resolved as u64;
        summary.empty += empty as u64;
        summary.errors += errors as u64;

        for variable in stats.variables() {
            if *variable.outcome() != VariableOutcome::MalformedToken {
                if let Some(count) = state.variable_counts.get_mut(variable.name()) {
                    *count += 1;
                } else if state.variable_counts.len() < max_variables {
                    state.variable_counts.insert(variable.name().clone(), 1);
                } else {
                    debug!(variable = %variable.name(), "Variable table full, not counted");
                }
            }

            if max_logs == 0 {
                continue;
            }
            if state.logs.len() == max_logs {
                state.logs.pop_front();
            }
            state.logs.push_back(ResolutionLog {
                timestamp,
                card_id: card_id.cloned(),
                card_key: card_key.map(str::to_string),
                variable: variable.name().clone(),
                outcome: *variable.outcome(),
            });
        }
        state.summary.distinct_variables = state.variable_counts.len();
    }

    /// Most recent log entries, newest first.
    pub fn recent_logs(&self, limit: usize) -> Vec<ResolutionLog> {
        self.state.lock().logs.iter().rev().take(limit).cloned().collect()
    }

    /// Most recent entries with the given outcome, newest first.
    pub fn logs_by_outcome(&self, outcome: VariableOutcome, limit: usize) -> Vec<ResolutionLog> {
        self.filtered(|log| log.outcome == outcome, limit)
    }

    /// Most recent error entries (cycles, depth overflows, malformed
    /// tokens), newest first.
    pub fn error_logs(&self, limit: usize) -> Vec<ResolutionLog> {
        self.filtered(|log| log.outcome.is_error(), limit)
    }

    /// Most referenced variables, by count descending then name.
    pub fn top_variables(&self, limit: usize) -> Vec<VariableUsage> {
        let state = self.state.lock();
        let mut usage: Vec<VariableUsage> = state
            .variable_counts
            .iter()
            .map(|(name, count)| VariableUsage {
                name: name.clone(),
                count: *count,
            })
            .collect();
        drop(state);

        usage.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
        usage.truncate(limit);
        usage
    }

    /// Running totals.
    pub fn summary(&self) -> StatsSummary {
        self.state.lock().summary
    }

    /// Clears logs, variable counts and totals.
    pub fn reset(&self) {
        let mut state = self.state.lock();
        let cleared = state.logs.len();
        *state = CollectorState::default();
        info!(cleared, "Reset resolution statistics");
    }

    fn filtered(&self, keep: impl Fn(&ResolutionLog) -> bool, limit: usize) -> Vec<ResolutionLog> {
        self.state
            .lock()
            .logs
            .iter()
            .rev()
            .filter(|log| keep(log))
            .take(limit)
            .cloned()
            .collect()
    }
}

impl Default for StatsCollector {
    fn default() -> Self {
        Self::new(StatsConfig::default())
    }
}
