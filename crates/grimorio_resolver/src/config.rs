//! Resolver configuration.

use derive_getters::Getters;
use grimorio_error::{ConfigError, GrimorioResult};
use serde::{Deserialize, Serialize};

/// Default bound on nested template expansions.
pub const DEFAULT_MAX_DEPTH: u32 = 32;

/// Largest accepted `max_depth`; keeps recursion well inside the stack.
pub const MAX_DEPTH_LIMIT: u32 = 1024;

/// Configuration for template expansion.
///
/// ```toml
/// [resolver]
/// max_depth = 32
/// ```
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
pub struct ResolverConfig {
    /// Maximum nesting of template cards
    #[serde(default = "default_max_depth")]
    #[builder(default = "DEFAULT_MAX_DEPTH")]
    max_depth: u32,
}

fn default_max_depth() -> u32 {
    DEFAULT_MAX_DEPTH
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
        }
    }
}

impl ResolverConfig {
    /// Reject values the resolver cannot honor safely.
    pub fn validate(&self) -> GrimorioResult<()> {
        if self.max_depth > MAX_DEPTH_LIMIT {
            return Err(ConfigError::new(format!(
                "resolver.max_depth {} exceeds the limit of {}",
                self.max_depth, MAX_DEPTH_LIMIT
            ))
            .into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        assert_eq!(*ResolverConfig::default().max_depth(), DEFAULT_MAX_DEPTH);
        let built = ResolverConfigBuilder::default().build().unwrap();
        assert_eq!(built, ResolverConfig::default());
    }

    #[test]
    fn test_validate() {
        assert!(ResolverConfig::default().with_max_depth(0).validate().is_ok());
        assert!(ResolverConfig::default().with_max_depth(5000).validate().is_err());
    }
}
