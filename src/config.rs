//! Project configuration, loaded from `.pmp.review.yaml`

use crate::review::ReviewConfig;
use crate::traits::FileSystem;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Name of the per-project configuration file
pub const CONFIG_FILE: &str = ".pmp.review.yaml";

/// Command run when the configuration names none
pub const DEFAULT_APPLY_COMMAND: &str = "tofu apply";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Custom apply command (overrides the default)
    pub apply_command: Option<String>,

    /// Extra environment variables for the apply process
    pub env: HashMap<String, String>,

    /// Review policy
    pub review: ReviewConfig,
}

impl ProjectConfig {
    /// Path of the config file inside a project directory
    pub fn path_in(project_dir: &Path) -> PathBuf {
        project_dir.join(CONFIG_FILE)
    }

    /// Load the project config; a missing file yields the defaults
    pub fn load(fs: &dyn FileSystem, project_dir: &Path) -> Result<Self> {
        let path = Self::path_in(project_dir);
        if !fs.exists(&path) {
            tracing::debug!(?path, "No config file, using defaults");
            return Ok(Self::default());
        }

        let content = fs.read_to_string(&path)?;
        let config: ProjectConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        Ok(config)
    }

    /// The apply command to run
    pub fn apply_command(&self) -> &str {
        self.apply_command
            .as_deref()
            .unwrap_or(DEFAULT_APPLY_COMMAND)
    }
}

/// Review policy flags given on the command line
#[derive(Debug, Clone, Copy, Default)]
pub struct ReviewOverrides {
    pub require_review_all: bool,
    pub no_auto_collapse: bool,
    pub collapsed: bool,
}

impl ReviewOverrides {
    /// Set each config field whose flag was given; other fields keep the
    /// file's values
    pub fn apply(&self, config: &mut ReviewConfig) {
        if self.require_review_all {
            config.require_review_all = true;
        }
        if self.no_auto_collapse {
            config.auto_collapse_on_review = false;
        }
        if self.collapsed {
            config.default_collapsed = true;
        }
    }
}
