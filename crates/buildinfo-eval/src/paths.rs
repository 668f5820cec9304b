//! Path helpers shared by the evaluator, resolver and linker
//!
//! MSBuild hands back paths written for whichever platform authored the
//! project file, so every value is rewritten to the host separator before it
//! is joined or compared.

use std::path::{Component, Path, PathBuf, MAIN_SEPARATOR};

/// Separator that is foreign to the host platform
const FOREIGN_SEPARATOR: char = if MAIN_SEPARATOR == '/' { '\\' } else { '/' };

/// Rewrite every foreign separator in `raw` to the host separator
pub fn to_host_separators(raw: &str) -> String {
    raw.replace(FOREIGN_SEPARATOR, &MAIN_SEPARATOR.to_string())
}

/// Fold `.` and `..` components without touching the filesystem
///
/// `..` directly under a root is dropped, leading `..` of a relative path is kept.
pub fn normalize(path: &Path) -> PathBuf {
    let mut parts: Vec<Component<'_>> = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match parts.last() {
                Some(Component::Normal(_)) => {
                    parts.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => parts.push(component),
            },
            other => parts.push(other),
        }
    }

    parts.iter().map(|c| c.as_os_str()).collect()
}

/// Resolve an evaluated path string against `base`
///
/// Absolute inputs are kept as-is (after separator and dot folding).
pub fn absolutize(base: &Path, raw: &str) -> PathBuf {
    let candidate = PathBuf::from(to_host_separators(raw));
    if candidate.is_absolute() {
        normalize(&candidate)
    } else {
        normalize(&base.join(candidate))
    }
}

/// Directory that owns a project file, falling back to `.` for bare names
pub fn project_dir(project_path: &Path) -> &Path {
    match project_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}
