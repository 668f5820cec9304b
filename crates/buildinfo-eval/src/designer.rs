//! Designer source file associations

use crate::paths::absolutize;
use crate::project::Project;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A designer source file and the project that owns it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignerFile {
    /// Absolute path of the designer source
    pub path: PathBuf,
    /// Output assembly of the owning project
    pub target_path: PathBuf,
    /// Project file of the owning project
    pub project_path: PathBuf,
}

/// Associate every item of `group` with the project that declares it
///
/// Projects without the group contribute nothing. Order is project order,
/// then item order. Files shared by several projects appear once per project.
pub fn link_designer_files(projects: &[Project], group: &str) -> Vec<DesignerFile> {
    projects
        .iter()
        .flat_map(|project| {
            project
                .item_group(group)
                .unwrap_or(&[])
                .iter()
                .filter(|item| !item.include.trim().is_empty())
                .map(move |item| DesignerFile {
                    path: absolutize(project.directory(), item.include.trim()),
                    target_path: project.target_path.clone(),
                    project_path: project.path.clone(),
                })
        })
        .collect()
}
