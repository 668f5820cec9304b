//! .NET SDK discovery and selection
//!
//! Discovery runs `dotnet --list-sdks` once, before any evaluation, under a
//! fixed timeout. The selected [`SdkInstall`] is then handed to the gateway
//! explicitly.

use crate::error::{EvalError, EvalResult};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;
use tracing::debug;

/// Default time allowed for `dotnet --list-sdks`
pub const DEFAULT_DISCOVERY_TIMEOUT: Duration = Duration::from_secs(10);

/// Selector values that mean "newest installed SDK"
const LATEST_SELECTORS: &[&str] = &["", "latest", "*"];

/// One installed SDK as reported by `dotnet --list-sdks`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SdkInstall {
    /// SDK version string (e.g. `8.0.100`)
    pub version: String,
    /// Directory containing the versioned SDK folders
    pub root: PathBuf,
}

impl SdkInstall {
    /// Create a new SDK entry
    pub fn new(version: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            version: version.into(),
            root: root.into(),
        }
    }

    /// Directory of this SDK version
    pub fn path(&self) -> PathBuf {
        self.root.join(&self.version)
    }

    /// MSBuild entry assembly shipped with this SDK
    pub fn msbuild_path(&self) -> PathBuf {
        self.path().join("MSBuild.dll")
    }
}

/// Parse `dotnet --list-sdks` output (`8.0.100 [/usr/share/dotnet/sdk]`)
pub fn parse_sdk_list(output: &str) -> Vec<SdkInstall> {
    output
        .lines()
        .filter_map(|line| {
            let line = line.trim();
            let (version, rest) = line.split_once(' ')?;
            let root = rest.trim().strip_prefix('[')?.strip_suffix(']')?;
            if version.is_empty() || root.is_empty() {
                return None;
            }
            Some(SdkInstall::new(version, root))
        })
        .collect()
}

/// Order SDK versions numerically where possible, textually otherwise
fn compare_versions(a: &str, b: &str) -> Ordering {
    match (semver::Version::parse(a), semver::Version::parse(b)) {
        (Ok(a), Ok(b)) => a.cmp(&b),
        _ => a.cmp(b),
    }
}

/// Pick an SDK: the newest one whose version starts with `selector`, or the
/// newest overall when no selector (or `latest`) is given
pub fn select_sdk(installs: &[SdkInstall], selector: Option<&str>) -> EvalResult<SdkInstall> {
    let selector = selector
        .map(str::trim)
        .filter(|s| !LATEST_SELECTORS.contains(&s.to_ascii_lowercase().as_str()));

    let chosen = installs
        .iter()
        .filter(|sdk| selector.map_or(true, |prefix| sdk.version.starts_with(prefix)))
        .max_by(|a, b| compare_versions(&a.version, &b.version));

    chosen.cloned().ok_or_else(|| EvalError::NoMatchingSdk {
        selector: selector.unwrap_or("latest").to_string(),
        available: if installs.is_empty() {
            "none".to_string()
        } else {
            installs
                .iter()
                .map(|sdk| sdk.version.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        },
    })
}

/// Locates installed SDKs through the `dotnet` host
#[derive(Debug, Clone)]
pub struct SdkLocator {
    /// `dotnet` host executable
    host: PathBuf,
    /// Limit for the discovery process
    timeout: Duration,
}

impl SdkLocator {
    /// Create a locator for the given host executable
    pub fn new(host: impl Into<PathBuf>) -> Self {
        Self {
            host: host.into(),
            timeout: DEFAULT_DISCOVERY_TIMEOUT,
        }
    }

    /// Set the discovery timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Host executable used for discovery
    pub fn host(&self) -> &Path {
        &self.host
    }

    /// List installed SDKs
    pub fn list(&self) -> EvalResult<Vec<SdkInstall>> {
        let mut command = Command::new(&self.host);
        command.arg("--list-sdks");
        let stdout = run_with_timeout(&self.host, command, self.timeout)?;
        let installs = parse_sdk_list(&stdout);
        debug!(count = installs.len(), host = %self.host.display(), "discovered SDKs");
        Ok(installs)
    }

    /// List installed SDKs and select one
    pub fn locate(&self, selector: Option<&str>) -> EvalResult<SdkInstall> {
        let installs = self.list()?;
        let sdk = select_sdk(&installs, selector)?;
        debug!(version = %sdk.version, root = %sdk.root.display(), "selected SDK");
        Ok(sdk)
    }
}

/// Run a command to completion, killing it once `timeout` elapses
fn run_with_timeout(program: &Path, command: Command, timeout: Duration) -> EvalResult<String> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| EvalError::SdkDiscovery(format!("failed to start runtime: {}", e)))?;

    let mut command = tokio::process::Command::from(command);
    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .kill_on_drop(true);

    let output = runtime.block_on(async {
        let child = command.spawn().map_err(|e| EvalError::spawn(program, e))?;
        // Dropping the timed-out future drops the child, which kills it
        tokio::time::timeout(timeout, child.wait_with_output())
            .await
            .map_err(|_| EvalError::Timeout {
                program: program.to_path_buf(),
                timeout,
            })?
            .map_err(|e| EvalError::spawn(program, e))
    })?;

    if !output.status.success() {
        return Err(EvalError::SdkDiscovery(format!(
            "'{} --list-sdks' exited with {}",
            program.display(),
            output.status
        )));
    }

    String::from_utf8(output.stdout).map_err(|e| EvalError::SdkDiscovery(e.to_string()))
}
