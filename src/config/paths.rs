// ABOUTME: Filesystem roots of a deploy target.
// ABOUTME: Resolves configured or default paths, each ending in exactly one separator.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::types::ReleaseId;

/// Name of the live alias symlink under the root.
pub const LIVE_ALIAS: &str = "current";

/// The `paths` section as written by the operator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub releases: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shared: Option<PathBuf>,
}

/// Resolved roots, computed once per run and never changed afterwards.
///
/// Every directory path ends in a single `/`, so joining a relative entry is
/// plain concatenation and `root()` compares equal regardless of how the
/// operator spelled it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployPaths {
    root: PathBuf,
    repo: PathBuf,
    releases: PathBuf,
    shared: PathBuf,
}

impl DeployPaths {
    /// Resolve against `base_dir`, the directory holding the settings
    /// document. Unset paths default to `base_dir` for the root and
    /// `{root}/repo`, `{root}/releases`, `{root}/shared` for the rest.
    pub fn resolve(config: &PathsConfig, base_dir: &Path) -> Self {
        let absolute = |p: &PathBuf| {
            if p.is_absolute() {
                p.clone()
            } else {
                base_dir.join(p)
            }
        };

        let root = with_trailing_separator(
            &config
                .root
                .as_ref()
                .map(absolute)
                .unwrap_or_else(|| base_dir.to_path_buf()),
        );
        let under_root = |name: &str| root.join(name);

        let repo = config
            .repo
            .as_ref()
            .map(absolute)
            .unwrap_or_else(|| under_root("repo"));
        let releases = config
            .releases
            .as_ref()
            .map(absolute)
            .unwrap_or_else(|| under_root("releases"));
        let shared = config
            .shared
            .as_ref()
            .map(absolute)
            .unwrap_or_else(|| under_root("shared"));

        Self {
            repo: with_trailing_separator(&repo),
            releases: with_trailing_separator(&releases),
            shared: with_trailing_separator(&shared),
            root,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn repo(&self) -> &Path {
        &self.repo
    }

    pub fn releases(&self) -> &Path {
        &self.releases
    }

    pub fn shared(&self) -> &Path {
        &self.shared
    }

    /// Directory of one release, with a trailing separator.
    pub fn release(&self, id: &ReleaseId) -> PathBuf {
        with_trailing_separator(&self.releases.join(id.as_str()))
    }

    /// Location of the live alias symlink.
    pub fn live_alias(&self) -> PathBuf {
        self.root.join(LIVE_ALIAS)
    }
}

/// Append exactly one trailing `/`, collapsing any the input already had.
pub fn with_trailing_separator(path: &Path) -> PathBuf {
    let text = path.to_string_lossy();
    let trimmed = text.trim_end_matches('/');
    PathBuf::from(format!("{trimmed}/"))
}

/// Drop trailing separators (used for symlink targets). `/` stays `/`.
pub fn without_trailing_separator(path: &Path) -> PathBuf {
    let text = path.to_string_lossy();
    let trimmed = text.trim_end_matches('/');
    if trimmed.is_empty() {
        PathBuf::from("/")
    } else {
        PathBuf::from(trimmed)
    }
}
