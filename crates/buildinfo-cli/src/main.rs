use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod config;
mod logging;

/// Design-time build information for .NET XAML previewers.
///
/// buildinfo evaluates every project of a solution (once per target framework)
/// and reports the paths a previewer needs: output assembly, dependency and
/// runtime manifests, design-time references folder and designer sources.
///
/// EXAMPLES:
///     buildinfo inspect App.sln --sdk 8.0          Inspect a solution
///     buildinfo inspect src/ --sdk latest          Scan a directory tree
///     buildinfo inspect App.slnx --sdk 9.0 -j 4    Limit worker threads
///
/// ENVIRONMENT VARIABLES:
///     BUILDINFO_SDK         Default for --sdk
///     BUILDINFO_CONFIG      Config file (default: ~/.buildinfo/config.toml)
///     BUILDINFO_DOTNET      Path to the dotnet host
///     BUILDINFO_JOBS        Worker thread count
///     BUILDINFO_REPORT_DIR  Directory for report files
///     BUILDINFO_LOG         Log level (trace, debug, info, warn, error, off)
///     NO_COLOR              Set to disable colored output
#[derive(Parser)]
#[command(name = "buildinfo")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Config file to read instead of ~/.buildinfo/config.toml
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Verbose output (debug logging)
    #[arg(long, short = 'v', global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Quiet output (errors only)
    #[arg(long, short = 'q', global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Collect build information for a solution or directory
    ///
    /// Evaluates every project found in PATH with the selected .NET SDK,
    /// writes the report to <report dir>/<name>.json and prints it.
    ///
    /// EXAMPLES:
    ///     buildinfo inspect App.sln --sdk 8.0
    ///     buildinfo inspect . --sdk latest --property Configuration=Release
    ///     buildinfo inspect App.sln --sdk 8.0.1 --report-dir ./out
    #[command(visible_alias = "i")]
    Inspect {
        /// Solution file (.sln, .slnx) or directory containing project files
        path: PathBuf,

        /// SDK version or version prefix to evaluate with ('latest' for newest)
        #[arg(long, env = "BUILDINFO_SDK", value_name = "VERSION")]
        sdk: String,

        /// Path to the dotnet host
        #[arg(long, value_name = "PATH")]
        dotnet: Option<PathBuf>,

        /// Worker threads (default: available parallelism)
        #[arg(long, short = 'j', value_name = "N", value_parser = config::parse_jobs)]
        jobs: Option<usize>,

        /// Directory receiving the report file (default: system temp dir)
        #[arg(long, value_name = "DIR")]
        report_dir: Option<PathBuf>,

        /// Global MSBuild property applied to every evaluation (repeatable)
        #[arg(long = "property", short = 'p', value_name = "KEY=VALUE", value_parser = config::parse_property)]
        properties: Vec<(String, String)>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut loader = buildinfo_config::ConfigLoader::new();
    if let Some(path) = &cli.config {
        loader = loader.with_config_file(path);
    }
    let file_config = loader.load().context("Failed to load configuration")?;

    logging::init(logging::level_for(
        cli.verbose,
        cli.quiet,
        file_config.log_level(),
    ));

    match cli.command {
        Commands::Inspect {
            path,
            sdk,
            dotnet,
            jobs,
            report_dir,
            properties,
        } => {
            let flags = config::InspectFlags {
                sdk,
                dotnet,
                jobs,
                report_dir,
                properties,
                quiet: cli.quiet,
            };
            let settings = config::Settings::resolve(&file_config, flags);
            commands::inspect::run(&path, &settings)?;
        }
    }

    Ok(())
}
