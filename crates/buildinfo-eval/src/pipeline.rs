//! End-to-end pipeline: collect, evaluate, link, report

use crate::collector;
use crate::designer::link_designer_files;
use crate::error::EvalResult;
use crate::evaluator::ProjectEvaluator;
use crate::gateway::EvaluationGateway;
use crate::properties;
use crate::report::Report;
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::info;

/// Statistics for one pipeline run
#[derive(Debug, Clone, Default)]
pub struct PipelineStats {
    /// Projects found by the collector
    pub collected: usize,
    /// Project records produced
    pub evaluated: usize,
    /// Designer files linked
    pub designer_files: usize,
    /// Path resolution warnings across all records
    pub warnings: usize,
    /// Wall time of the run
    pub total_time: Duration,
}

/// Runs the whole collection for one input
pub struct Pipeline<G> {
    evaluator: ProjectEvaluator<G>,
    designer_items: String,
}

impl<G: EvaluationGateway> Pipeline<G> {
    /// Create a pipeline around an evaluator
    pub fn new(evaluator: ProjectEvaluator<G>) -> Self {
        Self {
            evaluator,
            designer_items: properties::DESIGNER_ITEM.to_string(),
        }
    }

    /// Set the item group holding designer sources
    pub fn with_designer_items(mut self, group: impl Into<String>) -> Self {
        self.designer_items = group.into();
        self
    }

    /// Evaluator used by this pipeline
    pub fn evaluator(&self) -> &ProjectEvaluator<G> {
        &self.evaluator
    }

    /// Build the report for a solution file or project directory
    pub fn run(&self, input: &Path) -> EvalResult<(Report, PipelineStats)> {
        let start = Instant::now();

        let references = collector::collect(input)?;
        let projects = self.evaluator.evaluate_all(&references)?;
        let files = link_designer_files(&projects, &self.designer_items);

        let stats = PipelineStats {
            collected: references.len(),
            evaluated: projects.len(),
            designer_files: files.len(),
            warnings: projects.iter().map(|p| p.warnings().len()).sum(),
            total_time: start.elapsed(),
        };

        info!(
            input = %input.display(),
            collected = stats.collected,
            evaluated = stats.evaluated,
            designer_files = stats.designer_files,
            warnings = stats.warnings,
            "collection complete"
        );

        let report = Report {
            solution: input.display().to_string(),
            projects,
            files,
        };

        Ok((report, stats))
    }
}
