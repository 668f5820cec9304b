//! Global Configuration (~/.buildinfo/config.toml)
//!
//! Handles user-level configuration stored in `~/.buildinfo/config.toml`.

use crate::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Accepted values for `log_level`
pub const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error", "off"];

/// User configuration from ~/.buildinfo/config.toml
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct GlobalConfig {
    /// Log level when no verbosity flag is given
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,

    /// .NET host settings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub toolchain: Option<ToolchainConfig>,

    /// Evaluation settings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evaluation: Option<EvaluationConfig>,

    /// Report output settings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<ReportConfig>,
}

/// .NET host settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct ToolchainConfig {
    /// Path to the `dotnet` host (default: `dotnet` on PATH)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dotnet: Option<PathBuf>,

    /// Seconds to wait for `dotnet --list-sdks` (default: 10)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discovery_timeout_secs: Option<u64>,
}

/// Evaluation settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct EvaluationConfig {
    /// Worker threads (default: available parallelism)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jobs: Option<usize>,

    /// Item group holding designer sources (default: AvaloniaXaml)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub designer_items: Option<String>,

    /// Property naming the design-time host tool
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previewer_tool_property: Option<String>,

    /// Global MSBuild properties applied to every evaluation
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, String>,
}

/// Report output settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct ReportConfig {
    /// Directory receiving report files (default: system temp dir)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

impl GlobalConfig {
    /// Load configuration from a file
    pub fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound(path.to_path_buf())
            } else {
                ConfigError::IoError(e)
            }
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::TomlParseError {
            file: path.to_path_buf(),
            error: e,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if let Some(level) = &self.log_level {
            validate_log_level("log_level", level)?;
        }

        if let Some(toolchain) = &self.toolchain {
            if toolchain.discovery_timeout_secs == Some(0) {
                return Err(ConfigError::InvalidValue {
                    field: "toolchain.discovery_timeout_secs".to_string(),
                    reason: "must be greater than 0".to_string(),
                });
            }
            if let Some(dotnet) = &toolchain.dotnet {
                if dotnet.as_os_str().is_empty() {
                    return Err(ConfigError::InvalidValue {
                        field: "toolchain.dotnet".to_string(),
                        reason: "must not be empty".to_string(),
                    });
                }
            }
        }

        if let Some(evaluation) = &self.evaluation {
            if evaluation.jobs == Some(0) {
                return Err(ConfigError::InvalidValue {
                    field: "evaluation.jobs".to_string(),
                    reason: "must be greater than 0".to_string(),
                });
            }
            if let Some(group) = &evaluation.designer_items {
                validate_name("evaluation.designer_items", group)?;
            }
            if let Some(property) = &evaluation.previewer_tool_property {
                validate_name("evaluation.previewer_tool_property", property)?;
            }
            for name in evaluation.properties.keys() {
                validate_name("evaluation.properties", name)?;
            }
        }

        Ok(())
    }

    /// Get the default config file path (~/.buildinfo/config.toml)
    pub fn global_config_path() -> ConfigResult<PathBuf> {
        let home = dirs::home_dir().ok_or(ConfigError::HomeNotFound)?;
        Ok(home.join(".buildinfo").join("config.toml"))
    }
}

/// Validate a log level value
pub(crate) fn validate_log_level(field: &str, value: &str) -> ConfigResult<()> {
    if !LOG_LEVELS.iter().any(|l| l.eq_ignore_ascii_case(value)) {
        return Err(ConfigError::InvalidValue {
            field: field.to_string(),
            reason: format!("must be one of {}, got '{}'", LOG_LEVELS.join(", "), value),
        });
    }
    Ok(())
}

/// MSBuild property and item names are non-empty identifiers without spaces
fn validate_name(field: &str, value: &str) -> ConfigResult<()> {
    if value.trim().is_empty() {
        return Err(ConfigError::InvalidValue {
            field: field.to_string(),
            reason: "name must not be empty".to_string(),
        });
    }
    if value.chars().any(|c| c.is_whitespace() || c == '=' || c == ';') {
        return Err(ConfigError::InvalidValue {
            field: field.to_string(),
            reason: format!("invalid name '{}'", value),
        });
    }
    Ok(())
}
