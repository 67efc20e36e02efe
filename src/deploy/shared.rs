// ABOUTME: Links persistent shared files into a release.
// ABOUTME: Seeds the canonical copy on first encounter, then replaces the release-local file with a symlink.

use std::path::Path;

use super::{DeployError, StorageContext};
use crate::config::{DeployPaths, validate_relative};
use crate::release::Release;

pub struct SharedLinker<'a> {
    paths: &'a DeployPaths,
}

impl<'a> SharedLinker<'a> {
    pub fn new(paths: &'a DeployPaths) -> Self {
        Self { paths }
    }

    /// Link every entry of `shared` into `release`. Running it again on the
    /// same release changes nothing.
    pub fn link(&self, release: &Release, shared: &[String]) -> Result<(), DeployError> {
        for entry in shared {
            self.link_entry(release, entry)?;
        }
        Ok(())
    }

    fn link_entry(&self, release: &Release, entry: &str) -> Result<(), DeployError> {
        validate_relative("shared", entry).map_err(DeployError::config_error)?;
        let canonical = self.paths.shared().join(entry);
        let local = release.join(entry);

        if let Some(dir) = canonical.parent() {
            std::fs::create_dir_all(dir).storage_context("failed to create shared directory", dir)?;
        }

        if is_link_to(&local, &canonical) && canonical.exists() {
            tracing::debug!("{} already linked", entry);
            return Ok(());
        }

        if let Some(dir) = local.parent() {
            std::fs::create_dir_all(dir)
                .storage_context("failed to create release directory", dir)?;
        }

        let local_present = std::fs::symlink_metadata(&local).is_ok();
        if !local_present && !canonical.exists() {
            tracing::debug!("creating placeholder for {}", entry);
            std::fs::write(&local, b"").storage_context("failed to create placeholder", &local)?;
        }

        if !canonical.exists() && local.is_file() {
            tracing::debug!("seeding shared copy of {}", entry);
            std::fs::copy(&local, &canonical)
                .storage_context("failed to copy into shared", &canonical)?;
        }

        if !canonical.exists() {
            return Err(DeployError::config_error(format!(
                "shared file does not exist: {}",
                canonical.display()
            )));
        }

        if std::fs::symlink_metadata(&local).is_ok() {
            remove_entry(&local)?;
        }

        std::os::unix::fs::symlink(&canonical, &local)
            .storage_context("failed to link shared file", &local)?;
        Ok(())
    }
}

fn is_link_to(link: &Path, target: &Path) -> bool {
    std::fs::read_link(link).is_ok_and(|dest| dest == target)
}

fn remove_entry(path: &Path) -> Result<(), DeployError> {
    let metadata = std::fs::symlink_metadata(path).storage_context("failed to inspect", path)?;
    if metadata.is_dir() {
        std::fs::remove_dir_all(path).storage_context("failed to remove release-local copy", path)
    } else {
        std::fs::remove_file(path).storage_context("failed to remove release-local copy", path)
    }
}
