//! Project import settings and the on-disk layout derived from them

use crate::constants::{
    PROJECT_CACHE_FILENAME, PROJECT_CACHE_SUBDIRECTORY, PROJECT_DATA_SUBDIRECTORY,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// The build system a project was imported with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildSystemName {
    #[default]
    Bazel,
    Blaze,
}

impl fmt::Display for BuildSystemName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildSystemName::Bazel => write!(f, "bazel"),
            BuildSystemName::Blaze => write!(f, "blaze"),
        }
    }
}

/// Identity of an imported project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSettings {
    /// Human readable project name
    pub project_name: String,
    /// Root of the source workspace
    pub workspace_root: PathBuf,
    /// Directory holding per-project derived data
    pub project_data_directory: PathBuf,
    /// Build system used for sync
    #[serde(default)]
    pub build_system: BuildSystemName,
}

impl ImportSettings {
    pub fn new(
        project_name: impl Into<String>,
        workspace_root: impl Into<PathBuf>,
        project_data_directory: impl Into<PathBuf>,
        build_system: BuildSystemName,
    ) -> Self {
        Self {
            project_name: project_name.into(),
            workspace_root: workspace_root.into(),
            project_data_directory: project_data_directory.into(),
            build_system,
        }
    }

    /// `<project_data_directory>/.blaze`
    pub fn project_data_dir(&self) -> PathBuf {
        self.project_data_directory.join(PROJECT_DATA_SUBDIRECTORY)
    }

    /// `<project_data_directory>/.blaze/cache`
    pub fn project_cache_dir(&self) -> PathBuf {
        self.project_data_dir().join(PROJECT_CACHE_SUBDIRECTORY)
    }

    /// Location of the serialized project data snapshot
    pub fn cache_file(&self) -> PathBuf {
        self.project_cache_dir().join(PROJECT_CACHE_FILENAME)
    }

    pub fn workspace_root(&self) -> &Path {
        &self.workspace_root
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_file_is_derived_from_project_data_directory() {
        let settings = ImportSettings::new(
            "demo",
            "/src/demo",
            "/home/dev/.ide/demo",
            BuildSystemName::Bazel,
        );
        assert_eq!(
            settings.cache_file(),
            PathBuf::from("/home/dev/.ide/demo/.blaze/cache/cache.dat.gz")
        );
    }

    #[test]
    fn build_system_defaults_to_bazel_when_missing() {
        let json = r#"{
            "project_name": "demo",
            "workspace_root": "/src/demo",
            "project_data_directory": "/data/demo"
        }"#;
        let settings: ImportSettings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.build_system, BuildSystemName::Bazel);
        assert_eq!(settings.build_system.to_string(), "bazel");
    }
}
