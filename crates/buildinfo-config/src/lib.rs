//! buildinfo Configuration System
//!
//! Provides configuration management for the `buildinfo` tool:
//! - User configuration (~/.buildinfo/config.toml)
//! - Environment variable overrides (BUILDINFO_*)
//! - Validation of every loaded value
//!
//! # Configuration Hierarchy
//!
//! Configuration is loaded and merged in the following order (later overrides earlier):
//! 1. Config file (~/.buildinfo/config.toml, `BUILDINFO_CONFIG` or an explicit path)
//! 2. Environment variables (BUILDINFO_*)
//! 3. CLI flags (applied by the caller)
//!
//! # Example
//!
//! ```no_run
//! use buildinfo_config::ConfigLoader;
//!
//! let config = ConfigLoader::new().load().unwrap();
//! println!("log level: {}", config.log_level());
//! ```

pub mod global;
pub mod loader;

use std::path::PathBuf;
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid TOML syntax in {file}: {error}")]
    TomlParseError {
        file: PathBuf,
        error: toml::de::Error,
    },

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Invalid environment variable {name}={value}: {reason}")]
    InvalidEnv {
        name: String,
        value: String,
        reason: String,
    },

    #[error("Home directory not found")]
    HomeNotFound,
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

// Re-export main types
pub use global::{EvaluationConfig, GlobalConfig, ReportConfig, ToolchainConfig};
pub use loader::{Config, ConfigLoader};
