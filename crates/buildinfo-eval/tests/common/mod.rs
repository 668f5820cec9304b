//! Shared fixtures for buildinfo-eval integration tests

#![allow(dead_code)]

use buildinfo_eval::{EvalError, EvalResult, Evaluation, EvaluationGateway, Overrides};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Absolute root for fixture paths on every platform
pub fn fixture_root() -> PathBuf {
    std::env::temp_dir().join("buildinfo-fixture")
}

/// Path under the fixture root, `/`-separated input
pub fn fixture_path(relative: &str) -> PathBuf {
    relative
        .split('/')
        .fold(fixture_root(), |path, segment| path.join(segment))
}

/// Scripted answers for one project file
#[derive(Default, Clone)]
pub struct ProjectScript {
    baseline: Option<Result<Evaluation, String>>,
    frameworks: BTreeMap<String, Result<Evaluation, String>>,
}

impl ProjectScript {
    pub fn new(baseline: Evaluation) -> Self {
        Self {
            baseline: Some(Ok(baseline)),
            frameworks: BTreeMap::new(),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            baseline: Some(Err(message.to_string())),
            frameworks: BTreeMap::new(),
        }
    }

    pub fn framework(mut self, tfm: &str, evaluation: Evaluation) -> Self {
        self.frameworks.insert(tfm.to_string(), Ok(evaluation));
        self
    }

    pub fn failing_framework(mut self, tfm: &str, message: &str) -> Self {
        self.frameworks.insert(tfm.to_string(), Err(message.to_string()));
        self
    }
}

/// In-memory gateway that records every call it receives
#[derive(Default)]
pub struct FakeGateway {
    projects: BTreeMap<PathBuf, ProjectScript>,
    calls: Mutex<Vec<(PathBuf, Overrides)>>,
}

impl FakeGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn project(mut self, path: impl Into<PathBuf>, script: ProjectScript) -> Self {
        self.projects.insert(path.into(), script);
        self
    }

    pub fn calls(&self) -> Vec<(PathBuf, Overrides)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_for(&self, project: &Path) -> Vec<Overrides> {
        self.calls()
            .into_iter()
            .filter(|(path, _)| path == project)
            .map(|(_, overrides)| overrides)
            .collect()
    }
}

impl EvaluationGateway for FakeGateway {
    fn evaluate(&self, project: &Path, overrides: &Overrides) -> EvalResult<Evaluation> {
        self.calls
            .lock()
            .unwrap()
            .push((project.to_path_buf(), overrides.clone()));

        let script = self
            .projects
            .get(project)
            .ok_or_else(|| EvalError::evaluation(project, "project file not found"))?;

        let answer = match overrides.get("TargetFramework") {
            Some(tfm) => script
                .frameworks
                .get(tfm)
                .cloned()
                .unwrap_or_else(|| Err(format!("no answer for {}", tfm))),
            None => script
                .baseline
                .clone()
                .unwrap_or_else(|| Err("no baseline".to_string())),
        };

        answer.map_err(|message| EvalError::evaluation(project, message))
    }
}

/// Typical single-target SDK project evaluation
pub fn sdk_project(dir: &str, name: &str, tfm: &str) -> Evaluation {
    let bin = fixture_path(&format!("{}/bin/Debug/{}", dir, tfm));
    Evaluation::new()
        .with_property("TargetFramework", tfm)
        .with_property("OutputType", "WinExe")
        .with_property("IntermediateOutputPath", "obj\\Debug\\")
        .with_property("TargetPath", path_str(&bin.join(format!("{}.dll", name))))
        .with_property(
            "ProjectDepsFilePath",
            path_str(&bin.join(format!("{}.deps.json", name))),
        )
        .with_property(
            "ProjectRuntimeConfigFilePath",
            path_str(&bin.join(format!("{}.runtimeconfig.json", name))),
        )
}

pub fn path_str(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
