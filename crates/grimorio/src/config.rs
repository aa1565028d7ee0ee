//! Configuration loading for the Grimorio engine.

use config::{Config, File, FileFormat};
use derive_getters::Getters;
use grimorio_cache::ResolutionCacheConfig;
use grimorio_error::{ConfigError, GrimorioError, GrimorioResult};
use grimorio_resolver::ResolverConfig;
use grimorio_stats::StatsConfig;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Bundled default configuration.
const DEFAULT_CONFIG: &str = include_str!("../../../grimorio.toml");

/// Engine configuration.
///
/// ```toml
/// [resolver]
/// max_depth = 32
///
/// [cache]
/// enabled = true
/// ttl_secs = 300
/// max_entries = 1000
/// fingerprint = "whole_context"
///
/// [stats]
/// enabled = true
/// max_logs = 1000
/// max_variables = 1000
/// ```
#[derive(
    Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Getters, derive_setters::Setters,
)]
#[setters(prefix = "with_")]
pub struct GrimorioConfig {
    /// Template expansion settings
    #[serde(default)]
    resolver: ResolverConfig,
    /// Resolution cache settings
    #[serde(default)]
    cache: ResolutionCacheConfig,
    /// Stats collector settings
    #[serde(default)]
    stats: StatsConfig,
}

impl GrimorioConfig {
    /// Load configuration from a specific file.
    ///
    /// Missing sections and fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or holds values
    /// the engine cannot honor.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<std::path::Path>) -> GrimorioResult<Self> {
        debug!("Loading configuration from file");

        let config: Self = Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .map_err(|e| {
                GrimorioError::from(ConfigError::new(format!(
                    "Failed to read configuration from {}: {}",
                    path.as_ref().display(),
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                GrimorioError::from(ConfigError::new(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration with precedence: user override > bundled default.
    ///
    /// Configuration sources in order of precedence (later sources override earlier):
    /// 1. Bundled defaults (grimorio.toml shipped with the crate)
    /// 2. User config in home directory (~/.config/grimorio/grimorio.toml)
    /// 3. User config in current directory (./grimorio.toml)
    ///
    /// User config files are optional and will be silently skipped if not found.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use grimorio::GrimorioConfig;
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let config = GrimorioConfig::load()?;
    /// println!("max depth: {}", config.resolver().max_depth());
    /// # Ok(())
    /// # }
    /// ```
    #[instrument]
    pub fn load() -> GrimorioResult<Self> {
        debug!("Loading configuration with precedence: current dir > home dir > bundled defaults");

        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/grimorio/grimorio.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        builder = builder.add_source(File::with_name("grimorio").required(false));

        let config: Self = builder
            .build()
            .map_err(|e| {
                GrimorioError::from(ConfigError::new(format!(
                    "Failed to build configuration: {}",
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                GrimorioError::from(ConfigError::new(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })?;

        config.validate()?;
        Ok(config)
    }

    /// Parse the bundled defaults only.
    pub fn bundled() -> GrimorioResult<Self> {
        Config::builder()
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
            .build()
            .and_then(Config::try_deserialize)
            .map_err(|e| {
                GrimorioError::from(ConfigError::new(format!(
                    "Bundled configuration is invalid: {}",
                    e
                )))
            })
    }

    /// Reject values the engine cannot honor.
    pub fn validate(&self) -> GrimorioResult<()> {
        self.resolver.validate()
    }
}
