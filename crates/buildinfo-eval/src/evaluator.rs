//! Project evaluation and multi-target fan-out
//!
//! A project is first evaluated without a framework override. If that
//! baseline declares `TargetFrameworks`, the project is evaluated again once
//! per declared framework with `TargetFramework` forced, and every evaluation
//! becomes its own [`Project`]. Nothing is carried over between evaluations.

use crate::error::{EvalError, EvalResult};
use crate::gateway::{Evaluation, EvaluationGateway, Overrides};
use crate::output_path::resolve_references_path;
use crate::paths::{absolutize, normalize, project_dir, to_host_separators};
use crate::project::{Project, ProjectReference};
use crate::properties::{self, split_monikers};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, error, warn};

/// Evaluator settings
#[derive(Debug, Clone)]
pub struct EvaluatorConfig {
    /// Base for relative tool paths and relative project paths
    pub working_dir: PathBuf,
    /// Global properties applied to every evaluation
    pub global_properties: Overrides,
    /// Property naming the design-time host tool
    pub previewer_tool_property: String,
    /// Worker threads (`None` = available parallelism)
    pub jobs: Option<usize>,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            working_dir: PathBuf::from("."),
            global_properties: Overrides::new(),
            previewer_tool_property: properties::PREVIEWER_TOOL_PATH.to_string(),
            jobs: None,
        }
    }
}

/// Evaluates projects through an [`EvaluationGateway`]
pub struct ProjectEvaluator<G> {
    gateway: G,
    config: EvaluatorConfig,
}

impl<G: EvaluationGateway> ProjectEvaluator<G> {
    /// Create an evaluator with default settings
    pub fn new(gateway: G) -> Self {
        Self {
            gateway,
            config: EvaluatorConfig::default(),
        }
    }

    /// Replace the evaluator settings
    pub fn with_config(mut self, config: EvaluatorConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the working directory
    pub fn with_working_dir(mut self, working_dir: impl Into<PathBuf>) -> Self {
        self.config.working_dir = working_dir.into();
        self
    }

    /// Add a global property applied to every evaluation
    pub fn with_global_property(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.global_properties.insert(name.into(), value.into());
        self
    }

    /// Set the number of worker threads
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.config.jobs = Some(jobs);
        self
    }

    /// Current settings
    pub fn config(&self) -> &EvaluatorConfig {
        &self.config
    }

    /// Underlying gateway
    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Evaluate every project on a bounded worker pool
    ///
    /// Output order follows `references`, then declared framework order.
    /// Projects that fail to evaluate are logged and contribute nothing.
    pub fn evaluate_all(&self, references: &[ProjectReference]) -> EvalResult<Vec<Project>> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.jobs.unwrap_or(0))
            .thread_name(|i| format!("buildinfo-eval-{}", i))
            .build()
            .map_err(|e| EvalError::ThreadPool(e.to_string()))?;

        let start = Instant::now();
        let projects: Vec<Project> = pool.install(|| {
            references
                .par_iter()
                .map(|reference| self.evaluate(reference))
                .collect::<Vec<_>>()
                .into_iter()
                .flatten()
                .collect()
        });

        debug!(
            projects = references.len(),
            records = projects.len(),
            threads = pool.current_num_threads(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "evaluation finished"
        );

        Ok(projects)
    }

    /// Evaluate one project, logging and swallowing failures
    pub fn evaluate(&self, reference: &ProjectReference) -> Vec<Project> {
        match self.try_evaluate(reference) {
            Ok(projects) => projects,
            Err(e) => {
                error!(project = %reference.name, "failed to evaluate project: {}", e);
                Vec::new()
            }
        }
    }

    /// Evaluate one project, returning one record per declared framework
    ///
    /// Fails only if the baseline evaluation fails. A failing framework
    /// evaluation is logged and skipped.
    pub fn try_evaluate(&self, reference: &ProjectReference) -> EvalResult<Vec<Project>> {
        let path = self.project_path(&reference.path);
        debug!(project = %reference.name, path = %path.display(), "evaluating");

        let baseline = self.gateway.evaluate(&path, &self.overrides(None))?;
        let declared = split_monikers(baseline.property(properties::TARGET_FRAMEWORKS));

        if declared.is_empty() {
            return Ok(vec![self.to_project(reference, &path, &baseline, &declared, None)]);
        }

        debug!(
            project = %reference.name,
            frameworks = %declared.join(";"),
            "multi-targeted project"
        );

        let projects: Vec<Project> = declared
            .par_iter()
            .filter_map(|moniker| {
                match self.gateway.evaluate(&path, &self.overrides(Some(moniker.as_str()))) {
                    Ok(evaluation) => Some(self.to_project(
                        reference,
                        &path,
                        &evaluation,
                        &declared,
                        Some(moniker.as_str()),
                    )),
                    Err(e) => {
                        warn!(
                            project = %reference.name,
                            framework = %moniker,
                            "failed to evaluate framework: {}",
                            e
                        );
                        None
                    }
                }
            })
            .collect();

        Ok(projects)
    }

    /// Global properties for one evaluation, with the framework forced if given
    fn overrides(&self, moniker: Option<&str>) -> Overrides {
        let mut overrides = self.config.global_properties.clone();
        if let Some(moniker) = moniker {
            overrides.insert(properties::TARGET_FRAMEWORK.to_string(), moniker.to_string());
        }
        overrides
    }

    fn project_path(&self, path: &Path) -> PathBuf {
        let path = PathBuf::from(to_host_separators(&path.to_string_lossy()));
        if path.is_absolute() {
            normalize(&path)
        } else {
            normalize(&self.config.working_dir.join(path))
        }
    }

    /// Turn one evaluation into a project record
    fn to_project(
        &self,
        reference: &ProjectReference,
        path: &Path,
        evaluation: &Evaluation,
        declared: &[String],
        forced: Option<&str>,
    ) -> Project {
        let dir = project_dir(path);

        let target_framework = forced
            .map(str::to_string)
            .unwrap_or_else(|| evaluation.property(properties::TARGET_FRAMEWORK).trim().to_string());

        let designer_host_path = match evaluation
            .property(&self.config.previewer_tool_property)
            .trim()
        {
            "" => None,
            tool => Some(absolutize(&self.config.working_dir, tool)),
        };

        let project_references = evaluation
            .items(properties::PROJECT_REFERENCE_ITEM)
            .iter()
            .filter(|item| !item.include.trim().is_empty())
            .map(|item| absolutize(dir, item.include.trim()))
            .collect();

        let resolution = resolve_references_path(evaluation, path);
        for warning in &resolution.warnings {
            warn!(
                project = %reference.name,
                framework = %target_framework,
                "{}",
                warning
            );
        }

        Project {
            name: reference.name.clone(),
            path: path.to_path_buf(),
            target_path: evaluated_path(evaluation.property(properties::TARGET_PATH)),
            output_type: evaluation.property(properties::OUTPUT_TYPE).trim().to_string(),
            designer_host_path,
            target_framework,
            target_frameworks: declared.to_vec(),
            deps_file_path: evaluated_path(evaluation.property(properties::DEPS_FILE_PATH)),
            runtime_config_file_path: evaluated_path(
                evaluation.property(properties::RUNTIME_CONFIG_FILE_PATH),
            ),
            project_references,
            intermediate_output_path: resolution.path,
            items: evaluation.items.clone(),
            warnings: resolution.warnings,
        }
    }
}

/// Evaluated path with host separators, empty when undefined
fn evaluated_path(raw: &str) -> PathBuf {
    PathBuf::from(to_host_separators(raw.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    /// Gateway answering from a fixed table keyed by forced framework
    struct TableGateway {
        answers: BTreeMap<Option<String>, Evaluation>,
        calls: Mutex<Vec<Overrides>>,
    }

    impl EvaluationGateway for TableGateway {
        fn evaluate(&self, project: &Path, overrides: &Overrides) -> EvalResult<Evaluation> {
            self.calls.lock().unwrap().push(overrides.clone());
            let key = overrides.get("TargetFramework").cloned();
            self.answers
                .get(&key)
                .cloned()
                .ok_or_else(|| EvalError::evaluation(project, "no answer"))
        }
    }

    fn gateway(answers: Vec<(Option<&str>, Evaluation)>) -> TableGateway {
        TableGateway {
            answers: answers
                .into_iter()
                .map(|(k, v)| (k.map(str::to_string), v))
                .collect(),
            calls: Mutex::new(Vec::new()),
        }
    }

    #[test]
    fn test_overrides_merge_global_properties() {
        let evaluator = ProjectEvaluator::new(gateway(Vec::new()))
            .with_global_property("Configuration", "Release")
            .with_global_property("TargetFramework", "net6.0");

        let baseline = evaluator.overrides(None);
        assert_eq!(baseline.get("Configuration").map(String::as_str), Some("Release"));

        let forced = evaluator.overrides(Some("net8.0"));
        assert_eq!(forced.get("TargetFramework").map(String::as_str), Some("net8.0"));
        assert_eq!(forced.get("Configuration").map(String::as_str), Some("Release"));
    }

    #[test]
    fn test_single_target_uses_baseline_only() {
        let evaluator = ProjectEvaluator::new(gateway(vec![(
            None,
            Evaluation::new().with_property("TargetFramework", "net8.0"),
        )]));

        let projects = evaluator
            .try_evaluate(&ProjectReference::new("App", "/repo/App/App.csproj"))
            .unwrap();

        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].target_framework, "net8.0");
        assert!(projects[0].target_frameworks.is_empty());
        assert_eq!(evaluator.gateway().calls.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_failed_framework_is_skipped() {
        let evaluator = ProjectEvaluator::new(gateway(vec![
            (
                None,
                Evaluation::new().with_property("TargetFrameworks", "net8.0;net9.0"),
            ),
            (
                Some("net9.0"),
                Evaluation::new().with_property("TargetFramework", "net9.0"),
            ),
        ]));

        let projects = evaluator
            .try_evaluate(&ProjectReference::new("App", "/repo/App/App.csproj"))
            .unwrap();

        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].target_framework, "net9.0");
        assert_eq!(projects[0].target_frameworks, vec!["net8.0", "net9.0"]);
    }

    #[test]
    fn test_failed_baseline_yields_nothing() {
        let evaluator = ProjectEvaluator::new(gateway(Vec::new()));
        let reference = ProjectReference::new("Broken", "/repo/Broken/Broken.csproj");

        assert!(evaluator.try_evaluate(&reference).is_err());
        assert!(evaluator.evaluate(&reference).is_empty());
    }

    #[test]
    fn test_relative_project_path_rooted_at_working_dir() {
        let evaluator = ProjectEvaluator::new(gateway(vec![(None, Evaluation::new())]))
            .with_working_dir("/work");
        let projects = evaluator.evaluate(&ProjectReference::new("App", "src/App/App.csproj"));
        assert_eq!(
            projects[0].path,
            normalize(&PathBuf::from("/work").join("src").join("App").join("App.csproj"))
        );
    }

    #[test]
    fn test_missing_framework_warning_kept_on_record() {
        let evaluator = ProjectEvaluator::new(gateway(vec![(
            None,
            Evaluation::new().with_property("OutputType", "Library"),
        )]));

        let projects = evaluator
            .try_evaluate(&ProjectReference::new("Legacy", "/repo/Legacy/Legacy.csproj"))
            .unwrap();

        assert_eq!(
            projects[0].warnings(),
            &[crate::output_path::ResolveWarning::MissingTargetFramework]
        );
    }

    #[test]
    fn test_evaluated_path_empty_stays_empty() {
        assert_eq!(evaluated_path(""), PathBuf::new());
        assert_eq!(evaluated_path("  "), PathBuf::new());
    }
}
