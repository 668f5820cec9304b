//! Project set collection
//!
//! Finds the projects to evaluate from either a solution file (`.sln` or
//! `.slnx`) or a directory tree containing project files.

use crate::error::{EvalError, EvalResult};
use crate::paths::{absolutize, project_dir};
use crate::project::ProjectReference;
use once_cell::sync::Lazy;
use regex::Regex;
use std::ffi::OsStr;
use std::fs;
use std::path::Path;
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

/// Project file extensions MSBuild can evaluate
pub const PROJECT_EXTENSIONS: &[&str] = &["csproj", "fsproj", "vbproj"];

/// Directories never searched for project files
const SKIPPED_DIRS: &[&str] = &["bin", "obj", "node_modules"];

/// Solution folder entries in a `.sln`
const SOLUTION_FOLDER_TYPE: &str = "2150E333-8FDC-42A3-9474-1A3956D46DE8";

static SLN_PROJECT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"^Project\("\{(?P<kind>[0-9A-Fa-f-]+)\}"\)\s*=\s*"(?P<name>[^"]*)"\s*,\s*"(?P<path>[^"]*)"\s*,\s*"\{[0-9A-Fa-f-]+\}""#,
    )
    .expect("valid solution project pattern")
});

static SLNX_PROJECT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"<Project\b[^>]*?\bPath\s*=\s*(?:"(?P<double>[^"]+)"|'(?P<single>[^']+)')"#)
        .expect("valid slnx project pattern")
});

static XML_COMMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<!--.*?-->").expect("valid xml comment pattern"));

/// How an input path is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// Directory scanned for project files
    Directory,
    /// Classic text solution
    Solution,
    /// XML solution
    XmlSolution,
}

impl InputKind {
    /// Detect the input kind, `None` if neither strategy applies
    pub fn detect(input: &Path) -> Option<Self> {
        if input.is_dir() {
            return Some(Self::Directory);
        }
        if !input.is_file() {
            return None;
        }
        let extension = input.extension().and_then(OsStr::to_str)?;
        if extension.eq_ignore_ascii_case("sln") {
            Some(Self::Solution)
        } else if extension.eq_ignore_ascii_case("slnx") {
            Some(Self::XmlSolution)
        } else {
            None
        }
    }
}

/// Collect the projects referenced by a solution or found under a directory
pub fn collect(input: &Path) -> EvalResult<Vec<ProjectReference>> {
    let kind = InputKind::detect(input).ok_or_else(|| EvalError::unrecognized_input(input))?;

    let references = match kind {
        InputKind::Directory => scan_directory(input),
        InputKind::Solution => {
            let content = fs::read_to_string(input).map_err(|e| EvalError::solution_read(input, e))?;
            parse_solution(&content, project_dir(input))
        }
        InputKind::XmlSolution => {
            let content = fs::read_to_string(input).map_err(|e| EvalError::solution_read(input, e))?;
            parse_xml_solution(&content, project_dir(input))
        }
    };

    debug!(input = %input.display(), ?kind, count = references.len(), "collected projects");
    Ok(references)
}

/// Whether a path names an MSBuild project file
pub fn is_project_file(path: &Path) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .map(|ext| PROJECT_EXTENSIONS.iter().any(|p| ext.eq_ignore_ascii_case(p)))
        .unwrap_or(false)
}

/// Recursively find project files, sorted by path
pub fn scan_directory(root: &Path) -> Vec<ProjectReference> {
    let mut references: Vec<ProjectReference> = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_skipped_dir(entry))
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file() && is_project_file(entry.path()))
        .map(|entry| ProjectReference::from_path(entry.into_path()))
        .collect();

    references.sort_by(|a, b| a.path.cmp(&b.path));
    references
}

fn is_skipped_dir(entry: &DirEntry) -> bool {
    if !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.') || SKIPPED_DIRS.iter().any(|d| name.eq_ignore_ascii_case(d))
}

/// Parse `Project(...)` entries of a `.sln`, keeping MSBuild projects only
pub fn parse_solution(content: &str, solution_dir: &Path) -> Vec<ProjectReference> {
    content
        .lines()
        .filter_map(|line| SLN_PROJECT.captures(line.trim()))
        .filter(|caps| !caps["kind"].eq_ignore_ascii_case(SOLUTION_FOLDER_TYPE))
        .filter(|caps| is_project_file(Path::new(&caps["path"].replace('\\', "/"))))
        .map(|caps| ProjectReference::new(&caps["name"], absolutize(solution_dir, &caps["path"])))
        .collect()
}

/// Parse `<Project Path="..."/>` entries of a `.slnx`
///
/// Entries inside `<!-- -->` comments are ignored.
pub fn parse_xml_solution(content: &str, solution_dir: &Path) -> Vec<ProjectReference> {
    let content = XML_COMMENT.replace_all(content, "");
    SLNX_PROJECT
        .captures_iter(&content)
        .filter_map(|caps| caps.name("double").or_else(|| caps.name("single")))
        .map(|path| path.as_str().to_string())
        .filter(|path| is_project_file(Path::new(&path.replace('\\', "/"))))
        .map(|path| ProjectReference::from_path(absolutize(solution_dir, &path)))
        .collect()
}
