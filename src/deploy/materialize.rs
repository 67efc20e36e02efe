// ABOUTME: Copies the working checkout into a new timestamped release directory.
// ABOUTME: Copies into a hidden staging directory, renames it into place, then records the pointer.

use std::path::PathBuf;

use super::{DeployError, StorageContext};
use crate::config::{ConfigStore, DeployPaths, without_trailing_separator};
use crate::diagnostics::{Diagnostics, Warning};
use crate::output::Output;
use crate::process::{Cmd, CommandExec};
use crate::release::Release;
use crate::types::ReleaseId;

/// Creates release directories from the checkout.
pub struct ReleaseMaterializer<'a> {
    runner: &'a dyn CommandExec,
    output: &'a Output,
    paths: &'a DeployPaths,
    use_sudo: bool,
}

impl<'a> ReleaseMaterializer<'a> {
    pub fn new(
        runner: &'a dyn CommandExec,
        output: &'a Output,
        paths: &'a DeployPaths,
        use_sudo: bool,
    ) -> Self {
        Self {
            runner,
            output,
            paths,
            use_sudo,
        }
    }

    /// Materialize a release named after the current time.
    pub async fn materialize(
        &self,
        store: &mut ConfigStore,
        diagnostics: &mut Diagnostics,
    ) -> Result<Release, DeployError> {
        self.materialize_as(ReleaseId::now(), store, diagnostics)
            .await
    }

    /// Materialize under `id`, appending `-NNN` if that directory is taken.
    ///
    /// The new release becomes the current pointer and the settings are
    /// persisted before returning.
    pub async fn materialize_as(
        &self,
        id: ReleaseId,
        store: &mut ConfigStore,
        diagnostics: &mut Diagnostics,
    ) -> Result<Release, DeployError> {
        let id = self.unused_id(id);
        let staging = self.staging_path(&id);
        let target = without_trailing_separator(&self.paths.release(&id));

        if staging.exists() {
            tracing::warn!("removing leftover staging directory {}", staging.display());
            std::fs::remove_dir_all(&staging)
                .storage_context("failed to remove staging directory", &staging)?;
            diagnostics.warn(Warning::staging_cleanup(format!(
                "removed leftover staging directory {}",
                staging.display()
            )));
        }
        std::fs::create_dir_all(&staging)
            .storage_context("failed to create staging directory", &staging)?;

        let cmd = Cmd::new("cp")
            .arg("-a")
            .arg(self.paths.repo().join("."))
            .arg(&staging)
            .sudo(self.use_sudo);
        self.output.command(&cmd.to_string());
        if let Err(e) = self.runner.run(&cmd).await {
            if let Err(cleanup) = std::fs::remove_dir_all(&staging) {
                tracing::warn!(
                    "failed to remove staging directory {}: {}",
                    staging.display(),
                    cleanup
                );
                diagnostics.warn(Warning::staging_cleanup(format!(
                    "{} was left behind: {}",
                    staging.display(),
                    cleanup
                )));
            }
            return Err(e.into());
        }

        std::fs::rename(&staging, &target)
            .storage_context("failed to move release into place", &target)?;
        tracing::debug!("materialized release {}", id);

        let release = Release::new(id.clone(), self.paths.release(&id));
        store.set_current(id);
        store.persist()?;
        Ok(release)
    }

    fn unused_id(&self, base: ReleaseId) -> ReleaseId {
        let taken = |id: &ReleaseId| {
            without_trailing_separator(&self.paths.release(id)).exists()
        };
        if !taken(&base) {
            return base;
        }
        let mut n = 1;
        loop {
            let candidate = base.with_suffix(n);
            if !taken(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }

    fn staging_path(&self, id: &ReleaseId) -> PathBuf {
        self.paths.releases().join(format!(".{id}.partial"))
    }
}
