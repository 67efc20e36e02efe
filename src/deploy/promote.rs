// ABOUTME: Repoints the live alias symlink at a release.
// ABOUTME: The new link is built under a temporary name and renamed over the alias.

use std::path::{Path, PathBuf};

use super::DeployError;
use crate::config::{DeployPaths, LIVE_ALIAS, with_trailing_separator, without_trailing_separator};
use crate::release::Release;

pub struct LivePromoter<'a> {
    paths: &'a DeployPaths,
}

impl<'a> LivePromoter<'a> {
    pub fn new(paths: &'a DeployPaths) -> Self {
        Self { paths }
    }

    pub fn alias_path(&self) -> PathBuf {
        self.paths.live_alias()
    }

    /// Point the alias at `release`.
    ///
    /// An existing symlink is replaced by `rename`, so the alias never goes
    /// missing. A real directory or file in the alias position is removed
    /// first. Promoting the release that is already live is a no-op.
    pub fn promote(&self, release: &Release) -> Result<(), DeployError> {
        let alias = self.alias_path();
        let target = without_trailing_separator(release.path());

        if !release.path().is_dir() {
            return Err(DeployError::promotion(format!(
                "release {} is missing at {}",
                release.id(),
                release.path().display()
            )));
        }

        if std::fs::read_link(&alias).is_ok_and(|dest| dest == target) {
            tracing::debug!("{} already points at {}", LIVE_ALIAS, release.id());
            return Ok(());
        }

        clear_non_link(&alias)?;

        let tmp = self.paths.root().join(format!(".{LIVE_ALIAS}.{}.tmp", std::process::id()));
        if std::fs::symlink_metadata(&tmp).is_ok() {
            std::fs::remove_file(&tmp).map_err(|e| {
                DeployError::promotion(format!("failed to remove {}: {e}", tmp.display()))
            })?;
        }

        std::os::unix::fs::symlink(&target, &tmp).map_err(|e| {
            DeployError::promotion(format!("failed to create link {}: {e}", tmp.display()))
        })?;

        if let Err(e) = std::fs::rename(&tmp, &alias) {
            let _ = std::fs::remove_file(&tmp);
            return Err(DeployError::promotion(format!(
                "failed to replace {}: {e}",
                alias.display()
            )));
        }

        tracing::debug!("{} -> {}", alias.display(), target.display());
        Ok(())
    }

    /// Directory the alias currently resolves to, with a trailing separator.
    pub fn live_target(&self) -> Option<PathBuf> {
        std::fs::read_link(self.alias_path())
            .ok()
            .map(|p| with_trailing_separator(&p))
    }
}

fn clear_non_link(alias: &Path) -> Result<(), DeployError> {
    let Ok(metadata) = std::fs::symlink_metadata(alias) else {
        return Ok(());
    };
    if metadata.file_type().is_symlink() {
        return Ok(());
    }

    tracing::warn!("replacing non-symlink at {}", alias.display());
    let removed = if metadata.is_dir() {
        std::fs::remove_dir_all(alias)
    } else {
        std::fs::remove_file(alias)
    };
    removed.map_err(|e| {
        DeployError::promotion(format!("failed to remove {}: {e}", alias.display()))
    })
}
