//! Aggregate JSON report

use crate::designer::DesignerFile;
use crate::error::{EvalError, EvalResult};
use crate::project::Project;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

/// File name used when the input has no usable name (e.g. `/`)
const FALLBACK_REPORT_NAME: &str = "buildinfo";

/// Hex digits of the input path hash kept in the file name
const INPUT_HASH_LEN: usize = 8;

/// Everything collected for one solution or directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Input path as given
    pub solution: String,
    /// One entry per evaluated (project, framework)
    pub projects: Vec<Project>,
    /// Designer sources and their owning projects
    pub files: Vec<DesignerFile>,
}

impl Report {
    /// Pretty-printed JSON document
    pub fn to_json(&self) -> EvalResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the report to `path`, creating parent directories
    pub fn write_to(&self, path: &Path) -> EvalResult<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| EvalError::io(parent, e))?;
            }
        }
        fs::write(path, self.to_json()?).map_err(|e| EvalError::io(path, e))
    }

    /// Where the report for `input` is stored under `dir`
    ///
    /// `<file name>-<hash>.json`, the hash taken over the canonical input
    /// path so same-named solutions in different folders do not collide.
    pub fn location(dir: &Path, input: &Path) -> PathBuf {
        let canonical = fs::canonicalize(input).unwrap_or_else(|_| input.to_path_buf());
        let name = canonical
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .filter(|n| !n.is_empty() && n != "." && n != "..")
            .unwrap_or_else(|| FALLBACK_REPORT_NAME.to_string());
        dir.join(format!("{}-{}.json", name, input_hash(&canonical)))
    }
}

fn input_hash(path: &Path) -> String {
    let mut hasher = Sha256::new();
    hasher.update(path.to_string_lossy().as_bytes());
    let mut digest = format!("{:x}", hasher.finalize());
    digest.truncate(INPUT_HASH_LEN);
    digest
}
