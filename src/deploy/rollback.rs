// ABOUTME: Rollback entry point: repoint the live alias at an earlier release.
// ABOUTME: Runs under the deploy lock, persists the pointer, and can reap the abandoned release.

use std::path::{Path, PathBuf};

use super::pipeline::load_store;
use super::{DeployError, DeployLock, LivePromoter, PermissionApplier, ReleaseCleaner};
use crate::diagnostics::{Diagnostics, Warning};
use crate::hooks::{HookContext, HookRegistry, HookSlot, HookStage, run_slot};
use crate::output::Output;
use crate::process::CommandExec;
use crate::release::{Release, ReleaseStore};
use crate::types::{Phase, ReleaseId};

/// Interactive pick among rollback candidates. `None` cancels.
pub trait ReleaseChooser: Send + Sync {
    fn choose(&self, candidates: &[Release]) -> Result<Option<Release>, DeployError>;
}

/// Which release to roll back to.
pub enum RollbackTarget<'a> {
    Release(ReleaseId),
    Interactive(&'a dyn ReleaseChooser),
}

#[derive(Debug)]
pub enum RollbackOutcome {
    RolledBack {
        from: Option<ReleaseId>,
        to: ReleaseId,
        discarded: Option<ReleaseId>,
        diagnostics: Diagnostics,
    },
    /// The chosen release is already live; nothing changed.
    AlreadyLive(ReleaseId),
    /// The operator cancelled the selection.
    Cancelled,
}

/// Every release except `current`, newest first.
pub fn rollback_candidates(releases: &[Release], current: Option<&ReleaseId>) -> Vec<Release> {
    let mut candidates: Vec<Release> = releases
        .iter()
        .filter(|r| Some(r.id()) != current)
        .cloned()
        .collect();
    candidates.sort_by(|a, b| b.id().cmp(a.id()));
    candidates
}

pub struct Rollback<'a> {
    config_path: PathBuf,
    runner: &'a dyn CommandExec,
    output: &'a Output,
    hooks: &'a HookRegistry,
    force_lock: bool,
    discard: bool,
}

impl<'a> Rollback<'a> {
    pub fn new(
        config_path: &Path,
        runner: &'a dyn CommandExec,
        output: &'a Output,
        hooks: &'a HookRegistry,
    ) -> Self {
        Self {
            config_path: config_path.to_path_buf(),
            runner,
            output,
            hooks,
            force_lock: false,
            discard: false,
        }
    }

    pub fn force_lock(mut self, force: bool) -> Self {
        self.force_lock = force;
        self
    }

    /// Remove the release that was live before the rollback.
    pub fn discard(mut self, discard: bool) -> Self {
        self.discard = discard;
        self
    }

    pub async fn run(&self, target: RollbackTarget<'_>) -> Result<RollbackOutcome, DeployError> {
        let mut diagnostics = Diagnostics::default();
        let lock = DeployLock::acquire(&self.config_path, self.force_lock, &mut diagnostics)?;

        let result = self.run_locked(target, &mut diagnostics).await;

        if let Err(e) = lock.release() {
            diagnostics.warn(Warning::lock_release(e.to_string()));
        }

        match result {
            Ok(RollbackOutcome::RolledBack {
                from,
                to,
                discarded,
                diagnostics: mut inner,
            }) => {
                diagnostics.drain_into(&mut inner);
                Ok(RollbackOutcome::RolledBack {
                    from,
                    to,
                    discarded,
                    diagnostics: inner,
                })
            }
            other => other,
        }
    }

    async fn run_locked(
        &self,
        target: RollbackTarget<'_>,
        diagnostics: &mut Diagnostics,
    ) -> Result<RollbackOutcome, DeployError> {
        let mut store = load_store(&self.config_path)?;
        let config = store.config().clone();
        let paths = store.paths();
        let releases = ReleaseStore::new(paths.clone());
        let current = store.current().cloned();
        let live = releases.live();

        if let (Some(current), Some(live)) = (&current, &live) {
            if current != live {
                diagnostics.warn(Warning::live_mismatch(format!(
                    "current release is {current} but the live alias points at {live}"
                )));
            }
        }

        let chosen = match target {
            // Only the alias decides; the pointer may be ahead of it after
            // an aborted deploy.
            RollbackTarget::Release(id) => releases.get(&id)?,
            RollbackTarget::Interactive(chooser) => {
                let candidates = rollback_candidates(&releases.list()?, current.as_ref());
                if candidates.is_empty() {
                    return Err(DeployError::missing("no earlier release to roll back to"));
                }
                match chooser.choose(&candidates)? {
                    Some(release) => release,
                    None => return Ok(RollbackOutcome::Cancelled),
                }
            }
        };
        if live.as_ref() == Some(chosen.id()) {
            return Ok(RollbackOutcome::AlreadyLive(chosen.id().clone()));
        }

        let hook_ctx = HookContext {
            config: &config,
            paths: &paths,
            release: Some(&chosen),
            runner: self.runner,
            output: self.output,
        };
        run_slot(
            self.hooks,
            HookSlot::new(HookStage::Rollback, Phase::Pre),
            &hook_ctx,
        )
        .await?;

        self.output.header("Promote");
        LivePromoter::new(&paths).promote(&chosen)?;
        store.set_current(chosen.id().clone());
        store.persist()?;
        self.output
            .progress(&format!("{} is now live", chosen.id()));

        let abandoned = live.or(current.clone());
        let mut discarded = None;
        if self.discard {
            if let Some(old) = abandoned.filter(|old| old != chosen.id()) {
                if releases.exists(&old) {
                    let use_sudo = config.environment.use_sudo;
                    let permissions = PermissionApplier::new(
                        self.runner,
                        self.output,
                        &config.chown,
                        &config.chmod,
                        use_sudo,
                    );
                    let cleaner =
                        ReleaseCleaner::new(self.runner, self.output, &permissions, use_sudo);
                    cleaner.remove(&releases.get(&old)?).await?;
                    discarded = Some(old);
                }
            }
        }

        run_slot(
            self.hooks,
            HookSlot::new(HookStage::Rollback, Phase::Post),
            &hook_ctx,
        )
        .await?;

        Ok(RollbackOutcome::RolledBack {
            from: current,
            to: chosen.id().clone(),
            discarded,
            diagnostics: Diagnostics::default(),
        })
    }
}
