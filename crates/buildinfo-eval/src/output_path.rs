//! Design-time references path derivation
//!
//! Computes where the previewer build step drops its reference assemblies,
//! from the raw evaluated properties of one project evaluation. Two output
//! layouts exist:
//!
//! - **Per-project** (the default): `<IntermediateOutputPath>/<tfm>/Avalonia/references`,
//!   rooted under the project directory when relative.
//! - **Artifacts** (`UseArtifactsOutput=true`): everything lives under one
//!   repository-level `ArtifactsPath`, as
//!   `<ArtifactsPath>/obj/<project>/<configuration>_<tfm>/Avalonia/references`
//!   with the pivot folder lower-cased the way the .NET SDK names it.
//!
//! Resolution never fails. Missing data degrades to a best-effort path and a
//! [`ResolveWarning`] the caller is expected to log.

use crate::gateway::Evaluation;
use crate::paths::{normalize, project_dir, to_host_separators};
use crate::properties::{self, split_monikers};
use std::fmt;
use std::path::{Path, PathBuf};

/// Path segments appended below the intermediate directory
pub const REFERENCES_SEGMENTS: [&str; 2] = ["Avalonia", "references"];

const DEFAULT_INTERMEDIATE_DIR: &str = "obj";
const DEFAULT_ARTIFACTS_DIR: &str = "artifacts";
const DEFAULT_CONFIGURATION: &str = "Debug";

/// Output layout a project uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputLayout {
    /// `obj`/`bin` folders next to each project
    PerProject,
    /// Centralized `artifacts` folder shared by the repository
    Artifacts,
}

impl OutputLayout {
    /// Layout requested by an evaluation
    pub fn of(evaluation: &Evaluation) -> Self {
        if properties::is_true(evaluation.property(properties::USE_ARTIFACTS_OUTPUT)) {
            Self::Artifacts
        } else {
            Self::PerProject
        }
    }
}

/// Non-fatal anomaly found while resolving a path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveWarning {
    /// Neither `TargetFramework` nor `TargetFrameworks` is set
    MissingTargetFramework,
    /// Artifacts layout requested without an `ArtifactsPath`
    MissingArtifactsPath,
}

impl fmt::Display for ResolveWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingTargetFramework => write!(
                f,
                "project declares no TargetFramework or TargetFrameworks; the framework folder is omitted"
            ),
            Self::MissingArtifactsPath => write!(
                f,
                "UseArtifactsOutput is set but ArtifactsPath is empty; assuming an 'artifacts' folder next to the project"
            ),
        }
    }
}

/// Result of resolving the references path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Resolved path, host separators only
    pub path: PathBuf,
    /// Layout the path was composed for
    pub layout: OutputLayout,
    /// Anomalies encountered
    pub warnings: Vec<ResolveWarning>,
}

/// Framework the evaluation resolved, or the first declared one
pub fn select_target_framework(evaluation: &Evaluation) -> Option<String> {
    let single = evaluation.property(properties::TARGET_FRAMEWORK).trim();
    if !single.is_empty() {
        return Some(single.to_string());
    }
    split_monikers(evaluation.property(properties::TARGET_FRAMEWORKS))
        .into_iter()
        .next()
}

/// Resolve the design-time references path for one evaluation
pub fn resolve_references_path(evaluation: &Evaluation, project_path: &Path) -> Resolution {
    let mut warnings = Vec::new();
    let moniker = select_target_framework(evaluation);
    if moniker.is_none() {
        warnings.push(ResolveWarning::MissingTargetFramework);
    }

    let layout = OutputLayout::of(evaluation);
    let dir = project_dir(project_path);

    let composed = match layout {
        OutputLayout::PerProject => {
            let mut path = root_under(dir, intermediate_base(evaluation));
            if let Some(moniker) = &moniker {
                path.push(moniker);
            }
            path
        }
        OutputLayout::Artifacts => {
            let artifacts = evaluation.property(properties::ARTIFACTS_PATH).trim();
            let artifacts = if artifacts.is_empty() {
                warnings.push(ResolveWarning::MissingArtifactsPath);
                DEFAULT_ARTIFACTS_DIR
            } else {
                artifacts
            };

            let mut path = root_under(dir, artifacts);
            path.push("obj");
            path.push(artifacts_project_name(evaluation, project_path));
            path.push(artifacts_pivot(evaluation, moniker.as_deref()));
            path
        }
    };

    let mut path = composed;
    path.extend(REFERENCES_SEGMENTS);

    Resolution {
        path: finish(&path),
        layout,
        warnings,
    }
}

/// `IntermediateOutputPath`, then `BaseIntermediateOutputPath`, then `obj`
fn intermediate_base(evaluation: &Evaluation) -> &str {
    [
        properties::INTERMEDIATE_OUTPUT_PATH,
        properties::BASE_INTERMEDIATE_OUTPUT_PATH,
    ]
    .iter()
    .map(|name| evaluation.property(name).trim())
    .find(|value| !value.is_empty())
    .unwrap_or(DEFAULT_INTERMEDIATE_DIR)
}

/// Folder name the SDK uses for a project under `artifacts/obj`
fn artifacts_project_name(evaluation: &Evaluation, project_path: &Path) -> String {
    [properties::ARTIFACTS_PROJECT_NAME, properties::PROJECT_NAME]
        .iter()
        .map(|name| evaluation.property(name).trim())
        .find(|value| !value.is_empty())
        .map(str::to_string)
        .or_else(|| {
            project_path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
        })
        .unwrap_or_default()
}

/// `<configuration>_<tfm>`, lower-cased
fn artifacts_pivot(evaluation: &Evaluation, moniker: Option<&str>) -> String {
    let configuration = evaluation.property(properties::CONFIGURATION).trim();
    let configuration = if configuration.is_empty() {
        DEFAULT_CONFIGURATION
    } else {
        configuration
    };

    match moniker {
        Some(moniker) => format!("{}_{}", configuration, moniker).to_lowercase(),
        None => configuration.to_lowercase(),
    }
}

/// Root a possibly relative evaluated path under the project directory
fn root_under(dir: &Path, raw: &str) -> PathBuf {
    let path = PathBuf::from(to_host_separators(raw));
    if path.is_absolute() {
        path
    } else {
        dir.join(path)
    }
}

/// Fold dots and force host separators on the final value
fn finish(path: &Path) -> PathBuf {
    normalize(Path::new(&to_host_separators(&path.to_string_lossy())))
}
