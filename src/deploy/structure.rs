// ABOUTME: Verifies and creates the root, repo, releases and shared directories.
// ABOUTME: Deploys require the layout to exist; `init` creates it.

use std::path::Path;

use super::{DeployError, StorageContext};
use crate::config::DeployPaths;

/// Directory layout of one deploy target.
#[derive(Debug, Clone)]
pub struct DirectoryStructure {
    paths: DeployPaths,
}

impl DirectoryStructure {
    pub fn new(paths: DeployPaths) -> Self {
        Self { paths }
    }

    /// Check every directory exists.
    pub fn verify(&self) -> Result<(), DeployError> {
        if !self.paths.root().is_dir() {
            return Err(DeployError::config_error(format!(
                "root {} is not a directory",
                self.paths.root().display()
            )));
        }
        for (label, dir) in self.managed() {
            if !dir.is_dir() {
                return Err(DeployError::missing(format!(
                    "{label} directory {} does not exist (run `releaser init`)",
                    dir.display()
                )));
            }
        }
        Ok(())
    }

    /// Create any missing directory. Existing ones are left alone.
    pub fn create(&self) -> Result<(), DeployError> {
        let root = self.paths.root();
        std::fs::create_dir_all(root).storage_context("failed to create root", root)?;
        for (label, dir) in self.managed() {
            tracing::debug!("ensuring {} directory {}", label, dir.display());
            std::fs::create_dir_all(dir)
                .storage_context(&format!("failed to create {label} directory"), dir)?;
        }
        Ok(())
    }

    fn managed(&self) -> [(&'static str, &Path); 3] {
        [
            ("repo", self.paths.repo()),
            ("releases", self.paths.releases()),
            ("shared", self.paths.shared()),
        ]
    }
}
