//! Evaluation gateway - the seam between buildinfo and MSBuild
//!
//! The evaluator never talks to MSBuild directly. It hands a project path and
//! a map of global property overrides to an [`EvaluationGateway`] and gets
//! back a fully resolved [`Evaluation`]: every property and item group it will
//! later need, so no engine state outlives the call.

use crate::error::{EvalError, EvalResult};
use crate::properties;
use crate::toolchain::SdkInstall;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Global property overrides passed to a single evaluation
pub type Overrides = BTreeMap<String, String>;

/// One evaluated item (its include plus metadata)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluatedItem {
    /// Evaluated include, as written in the project after expansion
    #[serde(rename = "Identity")]
    pub include: String,
    /// Remaining well-known and custom metadata
    #[serde(flatten)]
    pub metadata: BTreeMap<String, String>,
}

impl EvaluatedItem {
    /// Create an item with no metadata
    pub fn new(include: impl Into<String>) -> Self {
        Self {
            include: include.into(),
            metadata: BTreeMap::new(),
        }
    }
}

/// Evaluated property bag and item lists for one project evaluation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evaluation {
    #[serde(rename = "Properties", default)]
    pub properties: BTreeMap<String, String>,
    #[serde(rename = "Items", default)]
    pub items: BTreeMap<String, Vec<EvaluatedItem>>,
}

impl Evaluation {
    /// Create an empty evaluation
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a property
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    /// Append an item to a group
    pub fn with_item(mut self, group: impl Into<String>, include: impl Into<String>) -> Self {
        self.items
            .entry(group.into())
            .or_default()
            .push(EvaluatedItem::new(include));
        self
    }

    /// Property value, empty when undefined
    ///
    /// MSBuild names are case-insensitive; an exact match wins.
    pub fn property(&self, name: &str) -> &str {
        if let Some(value) = self.properties.get(name) {
            return value;
        }
        self.properties
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
            .unwrap_or("")
    }

    /// Items of a group, `None` when the group is absent
    pub fn item_group(&self, group: &str) -> Option<&[EvaluatedItem]> {
        Self::group_in(&self.items, group)
    }

    /// Case-insensitive item group lookup, exact match first
    pub(crate) fn group_in<'a>(
        items: &'a BTreeMap<String, Vec<EvaluatedItem>>,
        group: &str,
    ) -> Option<&'a [EvaluatedItem]> {
        items
            .get(group)
            .or_else(|| {
                items
                    .iter()
                    .find(|(key, _)| key.eq_ignore_ascii_case(group))
                    .map(|(_, items)| items)
            })
            .map(Vec::as_slice)
    }

    /// Items of a group, empty when the group is absent
    pub fn items(&self, group: &str) -> &[EvaluatedItem] {
        self.item_group(group).unwrap_or(&[])
    }
}

/// External engine that resolves a project's properties and items
///
/// Implementations must be safe to call concurrently: each call gets its own
/// override map and must not share mutable evaluation state with others.
pub trait EvaluationGateway: Send + Sync {
    fn evaluate(&self, project: &Path, overrides: &Overrides) -> EvalResult<Evaluation>;
}

impl<G: EvaluationGateway + ?Sized> EvaluationGateway for Box<G> {
    fn evaluate(&self, project: &Path, overrides: &Overrides) -> EvalResult<Evaluation> {
        (**self).evaluate(project, overrides)
    }
}

impl<G: EvaluationGateway + ?Sized> EvaluationGateway for std::sync::Arc<G> {
    fn evaluate(&self, project: &Path, overrides: &Overrides) -> EvalResult<Evaluation> {
        (**self).evaluate(project, overrides)
    }
}

/// Gateway backed by the MSBuild that ships with a selected .NET SDK
///
/// Every evaluation runs `dotnet <sdk>/MSBuild.dll <project> -getProperty:...`
/// in its own process. The SDK is pinned through the child's environment, so
/// the parent process environment is never modified.
#[derive(Debug, Clone)]
pub struct DotnetGateway {
    /// `dotnet` host executable
    host: PathBuf,
    /// Selected SDK
    sdk: SdkInstall,
    /// Properties requested from every evaluation
    properties: Vec<String>,
    /// Item groups requested from every evaluation
    item_groups: Vec<String>,
}

impl DotnetGateway {
    /// Create a gateway for the given host and SDK
    pub fn new(host: impl Into<PathBuf>, sdk: SdkInstall) -> Self {
        Self {
            host: host.into(),
            sdk,
            properties: properties::REQUIRED_PROPERTIES
                .iter()
                .map(|p| p.to_string())
                .chain(std::iter::once(properties::PREVIEWER_TOOL_PATH.to_string()))
                .collect(),
            item_groups: vec![
                properties::PROJECT_REFERENCE_ITEM.to_string(),
                properties::DESIGNER_ITEM.to_string(),
            ],
        }
    }

    /// Also request `property` from every evaluation
    pub fn with_property(mut self, property: impl Into<String>) -> Self {
        let property = property.into();
        if !self.properties.contains(&property) {
            self.properties.push(property);
        }
        self
    }

    /// Also request `group` from every evaluation
    pub fn with_item_group(mut self, group: impl Into<String>) -> Self {
        let group = group.into();
        if !self.item_groups.contains(&group) {
            self.item_groups.push(group);
        }
        self
    }

    /// The SDK this gateway evaluates with
    pub fn sdk(&self) -> &SdkInstall {
        &self.sdk
    }

    /// Arguments passed to the host for one evaluation
    pub fn command_args(&self, project: &Path, overrides: &Overrides) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            self.sdk.msbuild_path().into_os_string(),
            project.as_os_str().to_os_string(),
            "-nologo".into(),
        ];

        for property in &self.properties {
            args.push(format!("-getProperty:{}", property).into());
        }
        for group in &self.item_groups {
            args.push(format!("-getItem:{}", group).into());
        }
        for (key, value) in overrides {
            args.push(format!("-property:{}={}", key, escape_property_value(value)).into());
        }

        args
    }

    /// Environment that pins the child MSBuild to the selected SDK
    pub fn environment(&self) -> Vec<(&'static str, OsString)> {
        let sdk_dir = self.sdk.path();
        vec![
            ("MSBuildExtensionsPath", sdk_dir.clone().into_os_string()),
            ("MSBuildSDKsPath", sdk_dir.join("Sdks").into_os_string()),
            ("MSBUILD_EXE_PATH", self.sdk.msbuild_path().into_os_string()),
            ("DOTNET_HOST_PATH", self.host.clone().into_os_string()),
            ("DOTNET_CLI_UI_LANGUAGE", "en".into()),
        ]
    }
}

impl EvaluationGateway for DotnetGateway {
    fn evaluate(&self, project: &Path, overrides: &Overrides) -> EvalResult<Evaluation> {
        let output = Command::new(&self.host)
            .args(self.command_args(project, overrides))
            .envs(self.environment())
            .current_dir(crate::paths::project_dir(project))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| EvalError::spawn(&self.host, e))?;

        let stdout = String::from_utf8_lossy(&output.stdout);

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(EvalError::evaluation(
                project,
                summarize_failure(&stdout, &stderr),
            ));
        }

        parse_output(project, &stdout)
    }
}

/// Parse the JSON document MSBuild prints for `-getProperty`/`-getItem`
pub fn parse_output(project: &Path, stdout: &str) -> EvalResult<Evaluation> {
    let start = stdout
        .find('{')
        .ok_or_else(|| EvalError::invalid_output(project, "no JSON document in output"))?;

    serde_json::from_str(stdout[start..].trim_end())
        .map_err(|e| EvalError::invalid_output(project, e))
}

/// MSBuild treats `;` in a global property as a list separator
fn escape_property_value(value: &str) -> String {
    value.replace('%', "%25").replace(';', "%3B")
}

/// Keep the error lines MSBuild printed, or the tail of the output
fn summarize_failure(stdout: &str, stderr: &str) -> String {
    let errors: Vec<&str> = stdout
        .lines()
        .chain(stderr.lines())
        .map(str::trim)
        .filter(|line| line.contains("error"))
        .collect();

    if !errors.is_empty() {
        return errors.join("; ");
    }

    let combined: Vec<&str> = stdout
        .lines()
        .chain(stderr.lines())
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    let tail = combined.len().saturating_sub(3);
    if combined.is_empty() {
        "evaluator exited with a failure status".to_string()
    } else {
        combined[tail..].join("; ")
    }
}
