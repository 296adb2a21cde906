use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::audit::{ForbiddenCall, MarkerSpec, default_fixup_markers, default_paint_markers};
use crate::contrast::ContrastPolicy;
use crate::error::{CheckError, Result};

/// Where the host application keeps its themes and paint-routing source,
/// relative to the project directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectLayout {
    pub theme_dir: PathBuf,
    pub theme_extension: String,
    pub source_root: PathBuf,
    pub source_extensions: Vec<String>,
    pub paint_source: PathBuf,
    pub fixup_source: PathBuf,
}

impl Default for ProjectLayout {
    fn default() -> Self {
        Self {
            theme_dir: PathBuf::from("src/themes/defaults"),
            theme_extension: "json".to_string(),
            source_root: PathBuf::from("src"),
            source_extensions: vec!["cpp".to_string()],
            paint_source: PathBuf::from("src/main.cpp"),
            fixup_source: PathBuf::from("src/themes/theme.cpp"),
        }
    }
}

impl ProjectLayout {
    /// Anchor every relative path at `project_dir`. Absolute paths are kept.
    #[must_use]
    pub fn resolved(&self, project_dir: &Path) -> Self {
        Self {
            theme_dir: project_dir.join(&self.theme_dir),
            source_root: project_dir.join(&self.source_root),
            paint_source: project_dir.join(&self.paint_source),
            fixup_source: project_dir.join(&self.fixup_source),
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HoverConfig {
    pub policy: ContrastPolicy,
    pub layout: ProjectLayout,
    pub markers: Vec<MarkerSpec>,
    pub forbidden: ForbiddenCall,
    pub fixup_markers: Vec<String>,
}

impl Default for HoverConfig {
    fn default() -> Self {
        Self {
            policy: ContrastPolicy::default(),
            layout: ProjectLayout::default(),
            markers: default_paint_markers(),
            forbidden: ForbiddenCall::default(),
            fixup_markers: default_fixup_markers(),
        }
    }
}

impl HoverConfig {
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(CheckError::MissingPath {
                path: path.to_path_buf(),
            });
        }
        Self::from_json_str(&fs::read_to_string(path)?)
    }

    pub fn validate(&self) -> Result<()> {
        self.policy.validate()?;
        if self.layout.source_extensions.is_empty() {
            return Err(CheckError::invalid("source_extensions cannot be empty"));
        }
        if self.forbidden.call.trim().is_empty() {
            return Err(CheckError::invalid("forbidden call name cannot be empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use tempfile::tempdir;

    use super::{HoverConfig, ProjectLayout};
    use crate::error::CheckError;

    #[test]
    fn defaults_match_host_layout_and_policy() {
        let config = HoverConfig::default();
        assert_eq!(config.policy.raw_threshold, 20);
        assert_eq!(config.policy.fixed_threshold, 15);
        assert_eq!(config.policy.brighten.percent, 130);
        assert_eq!(config.policy.brighten.bias, 1);
        assert_eq!(config.layout.theme_dir, PathBuf::from("src/themes/defaults"));
        assert_eq!(config.markers.len(), 5);
        assert_eq!(config.forbidden.call, "setStyleSheet");
        config.validate().expect("defaults are valid");
    }

    #[test]
    fn partial_json_keeps_remaining_defaults() {
        let config = HoverConfig::from_json_str(
            r#"{"policy": {"raw_threshold": 40}, "layout": {"theme_dir": "themes"}}"#,
        )
        .expect("partial config");
        assert_eq!(config.policy.raw_threshold, 40);
        assert_eq!(config.policy.fixed_threshold, 15);
        assert_eq!(config.policy.brighten.percent, 130);
        assert_eq!(config.layout.theme_dir, PathBuf::from("themes"));
        assert_eq!(config.layout.paint_source, PathBuf::from("src/main.cpp"));
    }

    #[test]
    fn darkening_brighten_policy_is_rejected() {
        let error = HoverConfig::from_json_str(r#"{"policy": {"brighten": {"percent": 50}}}"#)
            .expect_err("percent below 100 should fail");
        assert!(matches!(error, CheckError::InvalidArgument { .. }));
    }

    #[test]
    fn load_reports_missing_config_file() {
        let temp = tempdir().expect("tempdir");
        let missing = temp.path().join("hover.json");
        let error = HoverConfig::load(&missing).expect_err("missing file should fail");
        assert!(matches!(error, CheckError::MissingPath { path } if path == missing));
    }

    #[test]
    fn resolved_layout_is_anchored_at_project_dir() {
        let layout = ProjectLayout {
            fixup_source: PathBuf::from("/abs/theme.cpp"),
            ..ProjectLayout::default()
        }
        .resolved(Path::new("/work/app"));
        assert_eq!(layout.theme_dir, PathBuf::from("/work/app/src/themes/defaults"));
        assert_eq!(layout.paint_source, PathBuf::from("/work/app/src/main.cpp"));
        assert_eq!(layout.fixup_source, PathBuf::from("/abs/theme.cpp"));
    }
}
