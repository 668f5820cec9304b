//! Inspect command - collect design-time build information for a solution

use crate::config::Settings;
use anyhow::{bail, Context, Result};
use buildinfo_eval::{
    DotnetGateway, EvaluatorConfig, InputKind, Pipeline, ProjectEvaluator, Report, SdkLocator,
};
use colored::Colorize;
use std::path::Path;
use tracing::info;

/// Run the inspect command
pub fn run(input: &Path, settings: &Settings) -> Result<()> {
    // Reject bad input before touching the toolchain
    let kind = match InputKind::detect(input) {
        Some(kind) => kind,
        None => bail!(
            "'{}' is neither a directory nor a .sln/.slnx solution file",
            input.display()
        ),
    };

    // Toolchain selection is fatal and happens before any evaluation
    let sdk = SdkLocator::new(&settings.dotnet)
        .with_timeout(settings.discovery_timeout)
        .locate(Some(settings.sdk.as_str()))
        .with_context(|| format!("Failed to select a .NET SDK matching '{}'", settings.sdk))?;
    info!(version = %sdk.version, root = %sdk.root.display(), ?kind, "using SDK");

    let gateway = DotnetGateway::new(&settings.dotnet, sdk)
        .with_property(&settings.previewer_tool_property)
        .with_item_group(&settings.designer_items);

    let evaluator = ProjectEvaluator::new(gateway).with_config(EvaluatorConfig {
        working_dir: std::env::current_dir().context("Failed to read working directory")?,
        global_properties: settings.properties.clone(),
        previewer_tool_property: settings.previewer_tool_property.clone(),
        jobs: settings.jobs,
    });

    let (report, stats) = Pipeline::new(evaluator)
        .with_designer_items(&settings.designer_items)
        .run(input)
        .with_context(|| format!("Failed to collect projects from {}", input.display()))?;

    let location = Report::location(&settings.report_dir, input);
    report
        .write_to(&location)
        .with_context(|| format!("Failed to write report to {}", location.display()))?;

    println!("{}", report.to_json().context("Failed to serialize report")?);

    if !settings.quiet {
        let skipped = stats.collected.saturating_sub(distinct_projects(&report));
        eprintln!(
            "{} {} record(s) from {} project(s), {} designer file(s) in {:.2}s",
            "Collected".green().bold(),
            stats.evaluated,
            stats.collected,
            stats.designer_files,
            stats.total_time.as_secs_f64()
        );
        if stats.warnings > 0 {
            eprintln!(
                "{} {} path warning(s) (see log)",
                "warning:".yellow().bold(),
                stats.warnings
            );
        }
        if skipped > 0 {
            eprintln!(
                "{} {} project(s) failed to evaluate (see log)",
                "warning:".yellow().bold(),
                skipped
            );
        }
        eprintln!("Report: {}", location.display());
    }

    Ok(())
}

/// Number of distinct project files in the report
fn distinct_projects(report: &Report) -> usize {
    let mut paths: Vec<&Path> = report.projects.iter().map(|p| p.path.as_path()).collect();
    paths.sort();
    paths.dedup();
    paths.len()
}
