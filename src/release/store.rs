// ABOUTME: Enumerates releases on disk under the releases root.
// ABOUTME: Disk presence is authoritative; the current pointer is not consulted for listing.

use std::path::PathBuf;

use super::{Release, RetentionPolicy, stale_among};
use crate::config::DeployPaths;
use crate::config::with_trailing_separator;
use crate::deploy::{DeployError, StorageContext};
use crate::types::ReleaseId;

/// Read access to the release directories of one deploy target.
#[derive(Debug, Clone)]
pub struct ReleaseStore {
    paths: DeployPaths,
}

impl ReleaseStore {
    pub fn new(paths: DeployPaths) -> Self {
        Self { paths }
    }

    /// Releases newest-first. Dot entries (including staging directories)
    /// and anything that is not a directory are skipped.
    pub fn list(&self) -> Result<Vec<Release>, DeployError> {
        let root = self.paths.releases();
        let entries = std::fs::read_dir(root).storage_context("failed to read releases", root)?;

        let mut releases = Vec::new();
        for entry in entries {
            let entry = entry.storage_context("failed to read releases", root)?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                tracing::debug!("skipping non-utf8 entry in {}", root.display());
                continue;
            };
            if name.starts_with('.') {
                continue;
            }
            if !entry.path().is_dir() {
                continue;
            }
            let Ok(id) = ReleaseId::new(name) else {
                continue;
            };
            releases.push(Release::new(id.clone(), self.path_for(&id)));
        }

        releases.sort_by(|a, b| b.id().cmp(a.id()));
        Ok(releases)
    }

    pub fn exists(&self, id: &ReleaseId) -> bool {
        self.path_for(id).is_dir()
    }

    pub fn path_for(&self, id: &ReleaseId) -> PathBuf {
        self.paths.release(id)
    }

    /// Look up an existing release, failing with a storage error if absent.
    pub fn get(&self, id: &ReleaseId) -> Result<Release, DeployError> {
        if !self.exists(id) {
            return Err(DeployError::missing(format!(
                "release {} does not exist in {}",
                id,
                self.paths.releases().display()
            )));
        }
        Ok(Release::new(id.clone(), self.path_for(id)))
    }

    /// Release the live alias currently points at, if it points into the
    /// releases root.
    pub fn live(&self) -> Option<ReleaseId> {
        let target = std::fs::read_link(self.paths.live_alias()).ok()?;
        let target = with_trailing_separator(&target);
        let parent = target.parent()?;
        if with_trailing_separator(parent) != self.paths.releases() {
            return None;
        }
        let name = target.file_name()?.to_str()?;
        ReleaseId::new(name).ok()
    }

    /// Releases beyond the retention window, oldest last, minus `protect`.
    pub fn find_stale(
        &self,
        policy: RetentionPolicy,
        protect: &[ReleaseId],
    ) -> Result<Vec<Release>, DeployError> {
        let releases = self.list()?;
        Ok(stale_among(&releases, policy, protect, Release::id)
            .into_iter()
            .cloned()
            .collect())
    }
}
