// ABOUTME: Reaps releases beyond the retention window.
// ABOUTME: Pre permission rules are re-applied before removal so runtime-owned files can be deleted.

use super::{DeployError, PermissionApplier};
use crate::output::Output;
use crate::process::{Cmd, CommandExec};
use crate::release::{Release, ReleaseStore, RetentionPolicy};
use crate::types::{Phase, ReleaseId};

pub struct ReleaseCleaner<'a> {
    runner: &'a dyn CommandExec,
    output: &'a Output,
    permissions: &'a PermissionApplier<'a>,
    use_sudo: bool,
}

impl<'a> ReleaseCleaner<'a> {
    pub fn new(
        runner: &'a dyn CommandExec,
        output: &'a Output,
        permissions: &'a PermissionApplier<'a>,
        use_sudo: bool,
    ) -> Self {
        Self {
            runner,
            output,
            permissions,
            use_sudo,
        }
    }

    /// Remove every stale release, never touching anything in `protect`.
    /// Returns the removed releases, newest first.
    pub async fn clean(
        &self,
        store: &ReleaseStore,
        policy: RetentionPolicy,
        protect: &[ReleaseId],
    ) -> Result<Vec<Release>, DeployError> {
        let stale = store.find_stale(policy, protect)?;
        for release in &stale {
            self.remove(release).await?;
        }
        Ok(stale)
    }

    /// Remove a single release directory.
    pub async fn remove(&self, release: &Release) -> Result<(), DeployError> {
        tracing::info!("removing release {}", release.id());
        self.output.progress(&format!("Removing release {}", release.id()));
        self.permissions.apply(Phase::Pre, release).await?;

        let cmd = Cmd::new("rm")
            .arg("-rf")
            .arg(release.path())
            .sudo(self.use_sudo);
        self.output.command(&cmd.to_string());
        self.runner.run(&cmd).await?;
        Ok(())
    }
}
