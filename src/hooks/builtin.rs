// ABOUTME: Hooks shipped with releaser: schema migrations, dependency install, and project scripts.
// ABOUTME: Each runs inside the release directory through the shared command runner.

use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};

use super::{ExtensionHook, HookContext};
use crate::deploy::DeployError;
use crate::process::Cmd;

/// Prefix selecting a project script relative to the release directory.
pub const SCRIPT_PREFIX: &str = "script:";

/// Runs pending Doctrine migrations.
#[derive(Debug, Clone, Copy, Default)]
pub struct DoctrineMigrations;

impl DoctrineMigrations {
    pub const NAME: &'static str = "doctrine-migrations";
}

#[async_trait]
impl ExtensionHook for DoctrineMigrations {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn execute(&self, ctx: &HookContext<'_>) -> Result<(), DeployError> {
        let cmd = Cmd::new("php")
            .args([
                "bin/console",
                "doctrine:migrations:migrate",
                "--no-interaction",
                "--allow-no-migration",
            ])
            .current_dir(ctx.release_path(self.name())?);
        ctx.output.command(&cmd.to_string());
        ctx.runner.run(&cmd).await?;
        Ok(())
    }
}

/// Installs production dependencies with Composer.
#[derive(Debug, Clone, Copy, Default)]
pub struct ComposerInstall;

impl ComposerInstall {
    pub const NAME: &'static str = "composer-install";
}

#[async_trait]
impl ExtensionHook for ComposerInstall {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn execute(&self, ctx: &HookContext<'_>) -> Result<(), DeployError> {
        let cmd = Cmd::new("composer")
            .args([
                "install",
                "--no-dev",
                "--no-interaction",
                "--optimize-autoloader",
            ])
            .current_dir(ctx.release_path(self.name())?);
        ctx.output.command(&cmd.to_string());
        ctx.runner.run(&cmd).await?;
        Ok(())
    }
}

/// Executes a script from the release with `RELEASER_*` variables set.
#[derive(Debug, Clone)]
pub struct ScriptHook {
    name: String,
    script: PathBuf,
}

impl ScriptHook {
    /// `script` must be relative and stay inside the release.
    pub fn new(script: &str) -> Result<Self, DeployError> {
        let path = Path::new(script.trim());
        if path.as_os_str().is_empty() {
            return Err(DeployError::config_error("script hook needs a path"));
        }
        let escapes = path
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes {
            return Err(DeployError::config_error(format!(
                "script hook path must be relative to the release: {script}"
            )));
        }

        Ok(Self {
            name: format!("{SCRIPT_PREFIX}{}", script.trim()),
            script: path.to_path_buf(),
        })
    }

    pub fn script(&self) -> &Path {
        &self.script
    }
}

#[async_trait]
impl ExtensionHook for ScriptHook {
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&self, ctx: &HookContext<'_>) -> Result<(), DeployError> {
        let release_path = ctx.release_path(self.name())?;
        let script = release_path.join(&self.script);
        if !script.is_file() {
            return Err(DeployError::missing(format!(
                "hook script not found: {}",
                script.display()
            )));
        }

        let mut cmd = Cmd::new(&script).current_dir(release_path);
        for (key, value) in ctx.to_env() {
            cmd = cmd.env(key, value);
        }
        ctx.output.command(&cmd.to_string());
        ctx.runner.run(&cmd).await?;
        Ok(())
    }
}
