// ABOUTME: Machine-written run state kept beside the settings document.
// ABOUTME: Holds the current release pointer so the operator's file is never rewritten.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::deploy::{DeployError, StorageContext};
use crate::error::Result;
use crate::types::ReleaseId;

pub const STATE_FILENAME: &str = ".releaser.state.yml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current: Option<ReleaseId>,
}

impl ReleaseState {
    /// State file path for the settings document at `config_path`.
    pub fn path_for(config_path: &Path) -> PathBuf {
        config_path.with_file_name(STATE_FILENAME)
    }

    /// A missing file is an empty state.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(&content)?)
    }

    /// Replace the file atomically.
    pub fn save(&self, path: &Path) -> std::result::Result<(), DeployError> {
        let yaml = serde_yaml::to_string(self)
            .map_err(|e| DeployError::config_error(format!("failed to serialize state: {e}")))?;
        let tmp = path.with_file_name(format!("{STATE_FILENAME}.tmp"));

        std::fs::write(&tmp, yaml).storage_context("failed to write state", &tmp)?;
        std::fs::rename(&tmp, path).storage_context("failed to replace state", path)
    }
}
