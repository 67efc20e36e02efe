// ABOUTME: Extension hooks bound to pipeline slots.
// ABOUTME: Hooks are resolved by name from a registry populated at startup, then executed in order.

mod builtin;
mod registry;

pub use builtin::{ComposerInstall, DoctrineMigrations, SCRIPT_PREFIX, ScriptHook};
pub use registry::{HookFactory, HookRegistry};

use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use crate::config::{Config, DeployPaths};
use crate::deploy::DeployError;
use crate::output::Output;
use crate::process::CommandExec;
use crate::release::Release;
use crate::types::Phase;

/// Pipeline stage a hook slot belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookStage {
    Deploy,
    Rollback,
    Live,
    Cleanup,
}

impl HookStage {
    pub const ALL: [HookStage; 4] = [
        HookStage::Deploy,
        HookStage::Rollback,
        HookStage::Live,
        HookStage::Cleanup,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HookStage::Deploy => "deploy",
            HookStage::Rollback => "rollback",
            HookStage::Live => "live",
            HookStage::Cleanup => "cleanup",
        }
    }
}

/// One of the eight hook slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HookSlot {
    pub stage: HookStage,
    pub phase: Phase,
}

impl HookSlot {
    pub const fn new(stage: HookStage, phase: Phase) -> Self {
        Self { stage, phase }
    }
}

impl fmt::Display for HookSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.stage.as_str(), self.phase.as_str())
    }
}

/// Collaborators handed to every hook: the same settings, paths, runner,
/// and output the built-in stages use.
pub struct HookContext<'a> {
    pub config: &'a Config,
    pub paths: &'a DeployPaths,
    /// Absent for slots that run before the release is materialized.
    pub release: Option<&'a Release>,
    pub runner: &'a dyn CommandExec,
    pub output: &'a Output,
}

impl HookContext<'_> {
    /// Directory of the release being deployed, or a configuration error
    /// for slots that run before one exists.
    pub fn release_path(&self, hook: &str) -> Result<&Path, DeployError> {
        self.release.map(Release::path).ok_or_else(|| {
            DeployError::config_error(format!(
                "hook '{hook}' needs a release directory and cannot run before materialization"
            ))
        })
    }

    /// Environment variables exported to script hooks.
    pub fn to_env(&self) -> HashMap<String, String> {
        let mut env = HashMap::new();
        if let Some(release) = self.release {
            env.insert("RELEASER_RELEASE".to_string(), release.id().to_string());
            env.insert(
                "RELEASER_RELEASE_PATH".to_string(),
                release.path().to_string_lossy().into_owned(),
            );
        }
        env.insert(
            "RELEASER_ROOT".to_string(),
            self.paths.root().to_string_lossy().into_owned(),
        );
        env.insert(
            "RELEASER_SHARED".to_string(),
            self.paths.shared().to_string_lossy().into_owned(),
        );
        env.insert(
            "RELEASER_ENVIRONMENT".to_string(),
            self.config.environment.name.clone(),
        );
        env
    }
}

/// A unit of work run at a hook slot. Hooks hold no persistent state.
#[async_trait]
pub trait ExtensionHook: Send + Sync {
    fn name(&self) -> &str;

    async fn execute(&self, ctx: &HookContext<'_>) -> Result<(), DeployError>;
}

/// Run every hook configured for `slot`.
///
/// All names are resolved before the first hook executes, so an unknown
/// name aborts the slot without side effects.
pub async fn run_slot(
    registry: &HookRegistry,
    slot: HookSlot,
    ctx: &HookContext<'_>,
) -> Result<(), DeployError> {
    let names = ctx.config.processes.hooks(slot.stage, slot.phase);
    if names.is_empty() {
        return Ok(());
    }

    let hooks = registry.resolve_all(names)?;
    ctx.output.header(&format!("Hooks: {slot}"));
    for hook in &hooks {
        tracing::info!("running {} hook {}", slot, hook.name());
        ctx.output.progress(&format!("Running {}", hook.name()));
        hook.execute(ctx).await?;
    }
    Ok(())
}
