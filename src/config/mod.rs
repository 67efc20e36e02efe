// ABOUTME: Configuration types and parsing for releaser.yml.
// ABOUTME: Handles YAML parsing, defaults for every section, and validation.

mod deserialize;
mod environment;
mod git;
mod init;
mod paths;
mod permissions;
mod processes;
mod state;
mod store;

pub use environment::EnvironmentConfig;
pub use git::GitConfig;
pub use init::init_config;
pub use paths::{
    DeployPaths, LIVE_ALIAS, PathsConfig, with_trailing_separator, without_trailing_separator,
};
pub use permissions::{ChmodRule, ChownRule, PermissionChange, PhaseRules};
pub use processes::{HookNames, ProcessesConfig};
pub use state::{ReleaseState, STATE_FILENAME};
pub use store::ConfigStore;

use crate::error::{Error, Result};
use crate::hooks::HookStage;
use crate::types::{Phase, ReleaseId};
pub(crate) use deserialize::validate_relative;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILENAME: &str = "releaser.yml";
pub const CONFIG_FILENAME_ALT: &str = "releaser.yaml";
pub const CONFIG_FILENAME_DIR: &str = ".releaser/config.yml";

/// The settings document. Every section is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Initial CurrentPointer. Runs record the pointer in the state file
    /// and never write it back here.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current: Option<ReleaseId>,

    #[serde(default)]
    pub environment: EnvironmentConfig,

    #[serde(default)]
    pub paths: PathsConfig,

    #[serde(default)]
    pub git: GitConfig,

    /// Release-relative files persisted in the shared root.
    #[serde(default)]
    pub shared: Vec<String>,

    /// Release-relative files deleted after materialization.
    #[serde(default)]
    pub remove: Vec<String>,

    #[serde(default)]
    pub chown: PhaseRules<ChownRule>,

    #[serde(default)]
    pub chmod: PhaseRules<ChmodRule>,

    #[serde(default)]
    pub processes: ProcessesConfig,
}

impl Config {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        // An empty document is a valid all-defaults config.
        let config: Config = if yaml.trim().is_empty() {
            Config::default()
        } else {
            serde_yaml::from_str(yaml)?
        };
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(Error::from)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Locate the settings document in `dir`.
    pub fn discover_path(dir: &Path) -> Result<PathBuf> {
        let candidates = [
            dir.join(CONFIG_FILENAME),
            dir.join(CONFIG_FILENAME_ALT),
            dir.join(CONFIG_FILENAME_DIR),
        ];

        candidates
            .into_iter()
            .find(|path| path.is_file())
            .ok_or_else(|| Error::ConfigNotFound(dir.to_path_buf()))
    }

    pub fn validate(&self) -> Result<()> {
        let checks = self
            .shared
            .iter()
            .map(|p| ("shared", p))
            .chain(self.remove.iter().map(|p| ("remove", p)))
            .chain(Phase::ALL.into_iter().flat_map(move |phase| {
                self.chown
                    .get(phase)
                    .paths
                    .iter()
                    .map(|p| ("chown", p))
                    .chain(self.chmod.get(phase).paths.iter().map(|p| ("chmod", p)))
            }));

        for (section, path) in checks {
            validate_relative(section, path).map_err(Error::InvalidConfig)?;
        }

        for stage in HookStage::ALL {
            for phase in Phase::ALL {
                if self
                    .processes
                    .hooks(stage, phase)
                    .iter()
                    .any(|name| name.trim().is_empty())
                {
                    return Err(Error::InvalidConfig(format!(
                        "processes.{}.{}: hook name cannot be empty",
                        stage.as_str(),
                        phase.as_str()
                    )));
                }
            }
        }

        Ok(())
    }
}
