//! Configuration Loader
//!
//! Handles locating the config file and applying environment overrides.

use crate::global::{validate_log_level, GlobalConfig};
use crate::{ConfigError, ConfigResult};
use std::collections::BTreeMap;
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Explicit config file location
pub const ENV_CONFIG: &str = "BUILDINFO_CONFIG";
/// Path to the `dotnet` host
pub const ENV_DOTNET: &str = "BUILDINFO_DOTNET";
/// Worker thread count
pub const ENV_JOBS: &str = "BUILDINFO_JOBS";
/// Report directory
pub const ENV_REPORT_DIR: &str = "BUILDINFO_REPORT_DIR";
/// Log level
pub const ENV_LOG: &str = "BUILDINFO_LOG";

/// Log level used when nothing else is configured
pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Configuration loader
///
/// Loads configuration with the following precedence:
/// 1. Config file - lowest priority
/// 2. Environment variables (BUILDINFO_*) - overrides the file
/// 3. CLI flags - highest priority (handled by caller)
pub struct ConfigLoader {
    /// Config file given by the caller
    config_file: Option<PathBuf>,
}

/// Loaded configuration
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Effective settings
    pub global: GlobalConfig,

    /// File the settings were read from, if any
    pub source: Option<PathBuf>,
}

impl ConfigLoader {
    /// Create a loader using the default config location
    pub fn new() -> Self {
        Self { config_file: None }
    }

    /// Read a specific config file instead of the default one
    pub fn with_config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_file = Some(path.into());
        self
    }

    /// Load the config file (if any), then apply environment overrides
    ///
    /// An explicitly named file must exist. The default file is optional.
    pub fn load(&self) -> ConfigResult<Config> {
        let (global, source) = match self.explicit_path() {
            Some(path) => (GlobalConfig::load_from_file(&path)?, Some(path)),
            None => match GlobalConfig::global_config_path() {
                Ok(path) if path.exists() => (GlobalConfig::load_from_file(&path)?, Some(path)),
                _ => (GlobalConfig::default(), None),
            },
        };

        let global = apply_env_overrides(global)?;
        global.validate()?;

        Ok(Config { global, source })
    }

    fn explicit_path(&self) -> Option<PathBuf> {
        self.config_file
            .clone()
            .or_else(|| env_value(ENV_CONFIG).map(PathBuf::from))
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Non-empty value of an environment variable
fn env_value(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Apply BUILDINFO_* environment variables on top of the file config
fn apply_env_overrides(mut config: GlobalConfig) -> ConfigResult<GlobalConfig> {
    if let Some(dotnet) = env_value(ENV_DOTNET) {
        config.toolchain.get_or_insert_with(Default::default).dotnet = Some(PathBuf::from(dotnet));
    }

    if let Some(jobs) = env_value(ENV_JOBS) {
        let parsed = jobs
            .trim()
            .parse::<usize>()
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| ConfigError::InvalidEnv {
                name: ENV_JOBS.to_string(),
                value: jobs.clone(),
                reason: "expected a positive integer".to_string(),
            })?;
        config.evaluation.get_or_insert_with(Default::default).jobs = Some(parsed);
    }

    if let Some(dir) = env_value(ENV_REPORT_DIR) {
        config.report.get_or_insert_with(Default::default).dir = Some(PathBuf::from(dir));
    }

    if let Some(level) = env_value(ENV_LOG) {
        validate_log_level(ENV_LOG, &level).map_err(|_| ConfigError::InvalidEnv {
            name: ENV_LOG.to_string(),
            value: level.clone(),
            reason: "unknown log level".to_string(),
        })?;
        config.log_level = Some(level);
    }

    Ok(config)
}

impl Config {
    /// Effective log level (config > default)
    pub fn log_level(&self) -> &str {
        self.global.log_level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }

    /// Configured `dotnet` host
    pub fn dotnet(&self) -> Option<&Path> {
        self.global
            .toolchain
            .as_ref()
            .and_then(|t| t.dotnet.as_deref())
    }

    /// Configured SDK discovery timeout
    pub fn discovery_timeout(&self) -> Option<Duration> {
        self.global
            .toolchain
            .as_ref()
            .and_then(|t| t.discovery_timeout_secs)
            .map(Duration::from_secs)
    }

    /// Configured worker thread count
    pub fn jobs(&self) -> Option<usize> {
        self.global.evaluation.as_ref().and_then(|e| e.jobs)
    }

    /// Configured designer item group
    pub fn designer_items(&self) -> Option<&str> {
        self.global
            .evaluation
            .as_ref()
            .and_then(|e| e.designer_items.as_deref())
    }

    /// Configured host tool property name
    pub fn previewer_tool_property(&self) -> Option<&str> {
        self.global
            .evaluation
            .as_ref()
            .and_then(|e| e.previewer_tool_property.as_deref())
    }

    /// Global MSBuild properties from the config file
    pub fn properties(&self) -> BTreeMap<String, String> {
        self.global
            .evaluation
            .as_ref()
            .map(|e| e.properties.clone())
            .unwrap_or_default()
    }

    /// Configured report directory
    pub fn report_dir(&self) -> Option<&Path> {
        self.global.report.as_ref().and_then(|r| r.dir.as_deref())
    }
}
