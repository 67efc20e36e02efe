// ABOUTME: Deletes configured files from a release.
// ABOUTME: Only regular files are removed; directories and missing entries are skipped.

use super::{DeployError, StorageContext};
use crate::release::Release;

#[derive(Debug, Default, Clone, Copy)]
pub struct Pruner;

impl Pruner {
    /// Returns how many files were removed.
    pub fn remove(&self, release: &Release, remove: &[String]) -> Result<usize, DeployError> {
        let mut removed = 0;
        for entry in remove {
            let path = release.join(entry);
            let is_file = std::fs::symlink_metadata(&path).is_ok_and(|m| m.is_file());
            if !is_file {
                tracing::debug!("prune: skipping {}", path.display());
                continue;
            }
            std::fs::remove_file(&path).storage_context("failed to remove file", &path)?;
            removed += 1;
        }
        Ok(removed)
    }
}
