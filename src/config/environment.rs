// ABOUTME: Environment section of the settings document.
// ABOUTME: Retention count, sudo elevation, and the per-command timeout.

use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::time::Duration;

use super::deserialize::deserialize_max_releases;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    #[serde(default = "default_name")]
    pub name: String,

    /// Number of releases kept on disk.
    #[serde(
        default = "default_max_releases",
        deserialize_with = "deserialize_max_releases"
    )]
    pub max_releases: NonZeroUsize,

    /// Run permission, copy, and removal commands under `sudo`.
    #[serde(default)]
    pub use_sudo: bool,

    /// Limit for each external command. `0s` disables the limit.
    #[serde(default = "default_process_timeout", with = "humantime_serde")]
    pub process_timeout: Duration,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            max_releases: default_max_releases(),
            use_sudo: false,
            process_timeout: default_process_timeout(),
        }
    }
}

fn default_name() -> String {
    "prod".to_string()
}

fn default_max_releases() -> NonZeroUsize {
    NonZeroUsize::new(5).unwrap_or(NonZeroUsize::MIN)
}

fn default_process_timeout() -> Duration {
    Duration::from_secs(120)
}
