//! buildinfo evaluation core
//!
//! Turns a solution (or a directory of project files) into the design-time
//! build information a XAML previewer needs:
//! - Project collection from `.sln`, `.slnx` or a directory tree
//! - MSBuild evaluation through a pluggable gateway, fanned out per target framework
//! - Output path derivation for per-project and artifacts layouts
//! - Designer file association
//! - .NET SDK discovery

pub mod collector;
pub mod designer;
pub mod error;
pub mod evaluator;
pub mod gateway;
pub mod output_path;
pub mod paths;
pub mod pipeline;
pub mod project;
pub mod properties;
pub mod report;
pub mod toolchain;

// Re-export main types
pub use collector::{collect, InputKind};
pub use designer::{link_designer_files, DesignerFile};
pub use error::{EvalError, EvalResult};
pub use evaluator::{EvaluatorConfig, ProjectEvaluator};
pub use gateway::{DotnetGateway, EvaluatedItem, Evaluation, EvaluationGateway, Overrides};
pub use output_path::{resolve_references_path, OutputLayout, Resolution, ResolveWarning};
pub use pipeline::{Pipeline, PipelineStats};
pub use project::{Project, ProjectReference};
pub use report::Report;
pub use toolchain::{select_sdk, SdkInstall, SdkLocator};
