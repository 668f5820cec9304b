//! Effective settings for a command
//!
//! Flags win over the environment, which wins over the config file. Values
//! nobody sets fall back to the evaluation crate's defaults.

use buildinfo_config::Config;
use buildinfo_eval::properties::{DESIGNER_ITEM, PREVIEWER_TOOL_PATH};
use buildinfo_eval::toolchain::DEFAULT_DISCOVERY_TIMEOUT;
use buildinfo_eval::Overrides;
use std::path::PathBuf;
use std::time::Duration;

/// Host used when nothing names one
const DEFAULT_DOTNET: &str = "dotnet";

/// Flags given to `inspect`
#[derive(Debug, Clone, Default)]
pub struct InspectFlags {
    pub sdk: String,
    pub dotnet: Option<PathBuf>,
    pub jobs: Option<usize>,
    pub report_dir: Option<PathBuf>,
    pub properties: Vec<(String, String)>,
    pub quiet: bool,
}

/// Fully resolved settings for one run
#[derive(Debug, Clone)]
pub struct Settings {
    /// SDK selector (`latest` or a version prefix)
    pub sdk: String,
    /// `dotnet` host
    pub dotnet: PathBuf,
    /// Worker threads (`None` = available parallelism)
    pub jobs: Option<usize>,
    /// Directory receiving the report
    pub report_dir: PathBuf,
    /// Global properties for every evaluation
    pub properties: Overrides,
    /// Item group holding designer sources
    pub designer_items: String,
    /// Property naming the design-time host tool
    pub previewer_tool_property: String,
    /// Timeout for `dotnet --list-sdks`
    pub discovery_timeout: Duration,
    /// Suppress the summary line
    pub quiet: bool,
}

impl Settings {
    /// Merge flags over the loaded configuration
    pub fn resolve(config: &Config, flags: InspectFlags) -> Self {
        let mut properties = config.properties();
        properties.extend(flags.properties);

        Self {
            sdk: flags.sdk,
            dotnet: flags
                .dotnet
                .or_else(|| config.dotnet().map(PathBuf::from))
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DOTNET)),
            jobs: flags.jobs.or_else(|| config.jobs()),
            report_dir: flags
                .report_dir
                .or_else(|| config.report_dir().map(PathBuf::from))
                .unwrap_or_else(std::env::temp_dir),
            properties,
            designer_items: config
                .designer_items()
                .unwrap_or(DESIGNER_ITEM)
                .to_string(),
            previewer_tool_property: config
                .previewer_tool_property()
                .unwrap_or(PREVIEWER_TOOL_PATH)
                .to_string(),
            discovery_timeout: config
                .discovery_timeout()
                .unwrap_or(DEFAULT_DISCOVERY_TIMEOUT),
            quiet: flags.quiet,
        }
    }
}

/// Parse `--jobs`
pub fn parse_jobs(value: &str) -> Result<usize, String> {
    match value.trim().parse::<usize>() {
        Ok(0) => Err("must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(_) => Err(format!("'{}' is not a number", value)),
    }
}

/// Parse `--property KEY=VALUE`
pub fn parse_property(value: &str) -> Result<(String, String), String> {
    let (key, val) = value
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", value))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing property name in '{}'", value));
    }
    Ok((key.to_string(), val.to_string()))
}
