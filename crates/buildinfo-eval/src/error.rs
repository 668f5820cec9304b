//! Evaluation error types

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub type EvalResult<T> = Result<T, EvalError>;

#[derive(Debug, Error)]
pub enum EvalError {
    #[error("Input is neither a directory nor a recognized solution file: {path}")]
    UnrecognizedInput { path: PathBuf },

    #[error("Failed to read solution at {path}: {error}")]
    SolutionReadError { path: PathBuf, error: String },

    #[error("Evaluation of '{project}' failed: {error}")]
    EvaluationFailed { project: PathBuf, error: String },

    #[error("Unexpected evaluator output for '{project}': {error}")]
    InvalidEvaluatorOutput { project: PathBuf, error: String },

    #[error("Failed to launch '{program}': {error}")]
    SpawnError { program: PathBuf, error: String },

    #[error("'{program}' did not finish within {timeout:?}")]
    Timeout { program: PathBuf, timeout: Duration },

    #[error("SDK discovery failed: {0}")]
    SdkDiscovery(String),

    #[error("No installed .NET SDK matches '{selector}' (available: {available})")]
    NoMatchingSdk { selector: String, available: String },

    #[error("Worker pool error: {0}")]
    ThreadPool(String),

    #[error("I/O error at {path}: {error}")]
    IoError {
        path: PathBuf,
        error: std::io::Error,
    },

    #[error("Report serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl EvalError {
    /// Create an unrecognized input error
    pub fn unrecognized_input(path: impl Into<PathBuf>) -> Self {
        Self::UnrecognizedInput { path: path.into() }
    }

    /// Create a solution read error
    pub fn solution_read(path: impl Into<PathBuf>, error: impl ToString) -> Self {
        Self::SolutionReadError {
            path: path.into(),
            error: error.to_string(),
        }
    }

    /// Create an evaluation failure for a project
    pub fn evaluation(project: impl Into<PathBuf>, error: impl ToString) -> Self {
        Self::EvaluationFailed {
            project: project.into(),
            error: error.to_string(),
        }
    }

    /// Create an invalid output error for a project
    pub fn invalid_output(project: impl Into<PathBuf>, error: impl ToString) -> Self {
        Self::InvalidEvaluatorOutput {
            project: project.into(),
            error: error.to_string(),
        }
    }

    /// Create a process spawn error
    pub fn spawn(program: impl Into<PathBuf>, error: impl ToString) -> Self {
        Self::SpawnError {
            program: program.into(),
            error: error.to_string(),
        }
    }

    /// Create an I/O error with path context
    pub fn io(path: impl Into<PathBuf>, error: std::io::Error) -> Self {
        Self::IoError {
            path: path.into(),
            error,
        }
    }
}
