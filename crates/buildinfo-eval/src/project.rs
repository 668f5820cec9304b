//! Project records produced by evaluation

use crate::gateway::{EvaluatedItem, Evaluation};
use crate::output_path::ResolveWarning;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// A project file discovered by the collector, not yet evaluated
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProjectReference {
    /// Logical project name
    pub name: String,
    /// Project file path
    pub path: PathBuf,
}

impl ProjectReference {
    /// Create a new project reference
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }

    /// Reference named after the project file stem
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self { name, path }
    }
}

/// One evaluated (project file, target framework) pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Logical project name
    pub name: String,
    /// Project file path
    pub path: PathBuf,
    /// Assembly the build is expected to produce
    pub target_path: PathBuf,
    /// Free-form output kind (`Exe`, `WinExe`, `Library`, ...)
    pub output_type: String,
    /// Design-time host tool, absent when the project does not declare one
    pub designer_host_path: Option<PathBuf>,
    /// Framework this record was evaluated for
    pub target_framework: String,
    /// All frameworks the project declares
    pub target_frameworks: Vec<String>,
    /// Dependency manifest (`*.deps.json`)
    pub deps_file_path: PathBuf,
    /// Runtime configuration manifest (`*.runtimeconfig.json`)
    pub runtime_config_file_path: PathBuf,
    /// Absolute paths of referenced projects
    pub project_references: Vec<PathBuf>,
    /// Design-time references directory under the intermediate output
    pub intermediate_output_path: PathBuf,
    /// Item groups returned by the evaluation, kept for later passes
    #[serde(skip)]
    pub(crate) items: BTreeMap<String, Vec<EvaluatedItem>>,
    /// Anomalies met while resolving the references path
    #[serde(skip)]
    pub(crate) warnings: Vec<ResolveWarning>,
}

impl Project {
    /// Directory that owns the project file
    pub fn directory(&self) -> &Path {
        crate::paths::project_dir(&self.path)
    }

    /// Items of an evaluated group, `None` if the evaluation did not return it
    pub fn item_group(&self, group: &str) -> Option<&[EvaluatedItem]> {
        Evaluation::group_in(&self.items, group)
    }

    /// Anomalies met while resolving this record's paths
    pub fn warnings(&self) -> &[ResolveWarning] {
        &self.warnings
    }
}
