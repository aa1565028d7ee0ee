//! Per-resolution statistics.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// What happened to one `{{reference}}` during a resolution.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum VariableOutcome {
    /// Primary variable or variable card found in the context
    Resolved,
    /// Template card expanded
    Expanded,
    /// Variable card whose source path is absent from the context
    Empty,
    /// Neither a context path nor a card key
    Unknown,
    /// Template card already being expanded higher up the chain
    CycleDetected,
    /// Expansion refused beyond the configured depth
    DepthExceeded,
    /// Unbalanced, nested or empty `{{ }}` span, kept as literal text
    MalformedToken,
}

impl VariableOutcome {
    /// Whether this outcome counts towards `error_count`.
    pub fn is_error(self) -> bool {
        matches!(
            self,
            Self::CycleDetected | Self::DepthExceeded | Self::MalformedToken
        )
    }

    /// Whether this outcome counts towards `empty_count`.
    pub fn is_empty(self) -> bool {
        matches!(self, Self::Empty | Self::Unknown)
    }

    /// Whether this outcome counts towards `resolved_count`.
    pub fn is_resolved(self) -> bool {
        matches!(self, Self::Resolved | Self::Expanded)
    }
}

/// A variable name paired with its outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct VariableRecord {
    name: String,
    outcome: VariableOutcome,
}

impl VariableRecord {
    /// Create a record.
    pub fn new(name: impl Into<String>, outcome: VariableOutcome) -> Self {
        Self {
            name: name.into(),
            outcome,
        }
    }
}

/// Counters for one resolution, including every nested expansion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct ResolutionStats {
    /// Tokens substituted with a value
    resolved_count: usize,
    /// Tokens substituted with an empty string because nothing was found
    empty_count: usize,
    /// Cycles, depth overflows and malformed tokens
    error_count: usize,
    /// Whether the text was served from the cache
    from_cache: bool,
    /// Every reference in textual, depth-first order
    variables: Vec<VariableRecord>,
}

impl ResolutionStats {
    /// Empty counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one reference.
    pub fn record(&mut self, name: impl Into<String>, outcome: VariableOutcome) {
        if outcome.is_resolved() {
            self.resolved_count += 1;
        } else if outcome.is_empty() {
            self.empty_count += 1;
        } else if outcome.is_error() {
            self.error_count += 1;
        }
        self.variables.push(VariableRecord::new(name, outcome));
    }

    /// Whether any error outcome was recorded.
    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    /// Mark whether these stats describe a cached result.
    pub fn set_from_cache(&mut self, from_cache: bool) {
        self.from_cache = from_cache;
    }

    /// Drop the per-variable list, keeping the counters.
    pub fn clear_variables(&mut self) {
        self.variables.clear();
    }

    /// Counters as `(resolved, empty, errors)`.
    pub fn counts(&self) -> (usize, usize, usize) {
        (self.resolved_count, self.empty_count, self.error_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_every_outcome_lands_in_exactly_one_counter() {
        for outcome in VariableOutcome::iter() {
            let classes = [outcome.is_resolved(), outcome.is_empty(), outcome.is_error()];
            assert_eq!(classes.iter().filter(|c| **c).count(), 1, "{outcome}");
        }
    }

    #[test]
    fn test_record_accumulates() {
        let mut stats = ResolutionStats::new();
        stats.record("npc.nombre", VariableOutcome::Resolved);
        stats.record("saludo", VariableOutcome::Expanded);
        stats.record("npc.apodo", VariableOutcome::Unknown);
        stats.record("a", VariableOutcome::CycleDetected);

        assert_eq!(stats.counts(), (2, 1, 1));
        assert!(stats.has_errors());
        assert_eq!(stats.variables().len(), 4);
        assert_eq!(stats.variables()[3].outcome(), &VariableOutcome::CycleDetected);

        stats.clear_variables();
        assert!(stats.variables().is_empty());
        assert_eq!(stats.counts(), (2, 1, 1));
    }

    #[test]
    fn test_outcome_names() {
        assert_eq!(VariableOutcome::CycleDetected.to_string(), "cycle_detected");
        assert_eq!(
            "depth_exceeded".parse::<VariableOutcome>().unwrap(),
            VariableOutcome::DepthExceeded
        );
    }
}
