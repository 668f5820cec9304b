//! MSBuild property and item names read during evaluation

pub const TARGET_FRAMEWORK: &str = "TargetFramework";
pub const TARGET_FRAMEWORKS: &str = "TargetFrameworks";
pub const TARGET_PATH: &str = "TargetPath";
pub const OUTPUT_TYPE: &str = "OutputType";
pub const DEPS_FILE_PATH: &str = "ProjectDepsFilePath";
pub const RUNTIME_CONFIG_FILE_PATH: &str = "ProjectRuntimeConfigFilePath";
pub const INTERMEDIATE_OUTPUT_PATH: &str = "IntermediateOutputPath";
pub const BASE_INTERMEDIATE_OUTPUT_PATH: &str = "BaseIntermediateOutputPath";
pub const USE_ARTIFACTS_OUTPUT: &str = "UseArtifactsOutput";
pub const ARTIFACTS_PATH: &str = "ArtifactsPath";
pub const ARTIFACTS_PROJECT_NAME: &str = "ArtifactsProjectName";
pub const PROJECT_NAME: &str = "MSBuildProjectName";
pub const CONFIGURATION: &str = "Configuration";

/// Default property holding the previewer host tool
pub const PREVIEWER_TOOL_PATH: &str = "AvaloniaPreviewerNetCoreToolPath";

pub const PROJECT_REFERENCE_ITEM: &str = "ProjectReference";

/// Default item group holding designer (XAML) sources
pub const DESIGNER_ITEM: &str = "AvaloniaXaml";

/// Properties every evaluation must report back
pub const REQUIRED_PROPERTIES: &[&str] = &[
    TARGET_FRAMEWORK,
    TARGET_FRAMEWORKS,
    TARGET_PATH,
    OUTPUT_TYPE,
    DEPS_FILE_PATH,
    RUNTIME_CONFIG_FILE_PATH,
    INTERMEDIATE_OUTPUT_PATH,
    BASE_INTERMEDIATE_OUTPUT_PATH,
    USE_ARTIFACTS_OUTPUT,
    ARTIFACTS_PATH,
    ARTIFACTS_PROJECT_NAME,
    PROJECT_NAME,
    CONFIGURATION,
];

/// Split a `;`-delimited moniker list, dropping blanks and repeats
pub fn split_monikers(raw: &str) -> Vec<String> {
    let mut monikers: Vec<String> = Vec::new();
    for entry in raw.split(';').map(str::trim).filter(|s| !s.is_empty()) {
        if !monikers.iter().any(|m| m == entry) {
            monikers.push(entry.to_string());
        }
    }
    monikers
}

/// MSBuild boolean check: case-insensitive comparison against `true`
pub fn is_true(raw: &str) -> bool {
    raw.trim().eq_ignore_ascii_case("true")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_monikers() {
        assert_eq!(split_monikers("net8.0;net9.0"), vec!["net8.0", "net9.0"]);
        assert_eq!(split_monikers(" net8.0 ; ;net8.0;"), vec!["net8.0"]);
        assert!(split_monikers("").is_empty());
        assert!(split_monikers(";;").is_empty());
    }

    #[test]
    fn test_is_true() {
        assert!(is_true("true"));
        assert!(is_true("TRUE"));
        assert!(is_true(" True "));
        assert!(!is_true("1"));
        assert!(!is_true(""));
        assert!(!is_true("false"));
    }
}
