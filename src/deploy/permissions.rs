// ABOUTME: Applies the configured chown and chmod rules to a release.
// ABOUTME: Directories are changed recursively; failures propagate and abort the run.

use std::path::Path;

use super::DeployError;
use crate::config::{ChmodRule, ChownRule, PermissionChange, PhaseRules};
use crate::output::Output;
use crate::process::{Cmd, CommandExec};
use crate::release::Release;
use crate::types::Phase;

pub struct PermissionApplier<'a> {
    runner: &'a dyn CommandExec,
    output: &'a Output,
    chown: &'a PhaseRules<ChownRule>,
    chmod: &'a PhaseRules<ChmodRule>,
    use_sudo: bool,
}

impl<'a> PermissionApplier<'a> {
    pub fn new(
        runner: &'a dyn CommandExec,
        output: &'a Output,
        chown: &'a PhaseRules<ChownRule>,
        chmod: &'a PhaseRules<ChmodRule>,
        use_sudo: bool,
    ) -> Self {
        Self {
            runner,
            output,
            chown,
            chmod,
            use_sudo,
        }
    }

    /// Ownership rules of `phase` first, then mode rules.
    pub async fn apply(&self, phase: Phase, release: &Release) -> Result<(), DeployError> {
        let chown = self.chown.get(phase);
        if let Some(change) = chown.change() {
            self.apply_change(change, &chown.paths, release).await?;
        }

        let chmod = self.chmod.get(phase);
        if let Some(change) = chmod.change() {
            self.apply_change(change, &chmod.paths, release).await?;
        }
        Ok(())
    }

    async fn apply_change(
        &self,
        change: PermissionChange<'_>,
        paths: &[String],
        release: &Release,
    ) -> Result<(), DeployError> {
        for relative in paths {
            let target = release.join(relative);
            let cmd = permission_command(change, &target).sudo(self.use_sudo);
            self.output.command(&cmd.to_string());
            self.runner.run(&cmd).await?;
        }
        Ok(())
    }
}

fn permission_command(change: PermissionChange<'_>, target: &Path) -> Cmd {
    let (program, value) = match change {
        PermissionChange::Owner(owner) => ("chown", owner),
        PermissionChange::Mode(mode) => ("chmod", mode),
    };
    let mut cmd = Cmd::new(program);
    if target.is_dir() {
        cmd = cmd.arg("-R");
    }
    cmd.arg(value).arg(target)
}
