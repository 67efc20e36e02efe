// ABOUTME: The deploy pipeline: fetch, materialize, link, prune, hooks, retention, promote.
// ABOUTME: Runs strictly in order under the deploy lock and reports the last state reached on failure.

use std::path::{Path, PathBuf};

use super::{
    DeployError, DeployLock, DirectoryStructure, LivePromoter, PermissionApplier, PipelineFailure,
    PipelineState, Pruner, ReleaseCleaner, ReleaseMaterializer, SharedLinker, SourceFetcher,
};
use crate::config::{Config, ConfigStore, DeployPaths};
use crate::diagnostics::{Diagnostics, Warning};
use crate::hooks::{HookContext, HookRegistry, HookSlot, HookStage, run_slot};
use crate::output::Output;
use crate::process::CommandExec;
use crate::release::{Release, ReleaseStore, RetentionPolicy};
use crate::types::{GitRef, Phase, RefSelection, ReleaseId};

/// Interactive choice of what to check out, asked after fetching.
pub trait RefChooser: Send + Sync {
    /// `None` moves on to branches.
    fn choose_tag(&self, tags: &[String]) -> Result<Option<String>, DeployError>;

    /// `None` falls back to the configured default branch.
    fn choose_branch(&self, branches: &[String]) -> Result<Option<String>, DeployError>;
}

/// How the ref to deploy is picked.
pub enum RefRequest<'a> {
    Fixed(RefSelection),
    Interactive(&'a dyn RefChooser),
}

/// What a successful deploy did.
#[derive(Debug)]
pub struct DeployReport {
    pub release: Release,
    pub git_ref: GitRef,
    pub previous: Option<ReleaseId>,
    pub removed: Vec<ReleaseId>,
    pub diagnostics: Diagnostics,
}

/// One deploy run against the settings document at `config_path`.
pub struct DeployPipeline<'a> {
    config_path: PathBuf,
    runner: &'a dyn CommandExec,
    output: &'a Output,
    hooks: &'a HookRegistry,
    force_lock: bool,
}

/// Stage inputs fixed once the settings are loaded.
struct RunContext<'r> {
    config: &'r Config,
    paths: &'r DeployPaths,
}

impl<'a> DeployPipeline<'a> {
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
        }
    }

    /// Break a lock held by another run.
    pub fn force_lock(mut self, force: bool) -> Self {
        self.force_lock = force;
        self
    }

    /// Run every stage. On failure nothing is rolled back; the returned
    /// error names the last state reached.
    pub async fn run(&self, request: RefRequest<'_>) -> Result<DeployReport, PipelineFailure> {
        let mut state = PipelineState::Init;
        let mut diagnostics = Diagnostics::default();

        let lock = DeployLock::acquire(&self.config_path, self.force_lock, &mut diagnostics)
            .map_err(|source| PipelineFailure { state, source })?;
        state = PipelineState::Locked;
        tracing::debug!("state: {}", state);

        let result = self.run_locked(request, &mut state, &mut diagnostics).await;

        if let Err(e) = lock.release() {
            diagnostics.warn(Warning::lock_release(e.to_string()));
        }

        match result {
            Ok(mut report) => {
                diagnostics.drain_into(&mut report.diagnostics);
                Ok(report)
            }
            Err(source) => {
                tracing::debug!("aborted after {}: {}", state, source);
                Err(PipelineFailure { state, source })
            }
        }
    }

    async fn run_locked(
        &self,
        request: RefRequest<'_>,
        state: &mut PipelineState,
        diagnostics: &mut Diagnostics,
    ) -> Result<DeployReport, DeployError> {
        let mut store = load_store(&self.config_path)?;
        let config = store.config().clone();
        let paths = store.paths();
        let previous = store.current().cloned();
        advance(state, PipelineState::ConfigLoaded);

        let ctx = RunContext {
            config: &config,
            paths: &paths,
        };
        let use_sudo = config.environment.use_sudo;

        self.output.header("Verify directory structure");
        DirectoryStructure::new(paths.clone()).verify()?;
        advance(state, PipelineState::DirectoryStructureVerified);

        self.slot(&ctx, None, HookStage::Deploy, Phase::Pre, state)
            .await?;

        self.output.header("Fetch");
        let fetcher = SourceFetcher::new(self.runner, self.output, paths.repo(), use_sudo);
        fetcher
            .ensure(config.git.repo.as_deref(), &config.git.remote)
            .await?;
        let git_ref = match request {
            RefRequest::Fixed(selection) => {
                fetcher
                    .fetch_and_checkout(&selection, &config.git.branch)
                    .await?
            }
            RefRequest::Interactive(chooser) => {
                fetcher.fetch().await?;
                let selection =
                    choose_ref(&fetcher, chooser, config.git.tag_filter.as_deref()).await?;
                let git_ref = selection.resolve()?;
                fetcher.checkout(&git_ref, &config.git.branch).await?;
                git_ref
            }
        };
        advance(state, PipelineState::Fetched);

        self.output.header("Materialize release");
        let release = ReleaseMaterializer::new(self.runner, self.output, &paths, use_sudo)
            .materialize(&mut store, diagnostics)
            .await?;
        self.output
            .progress(&format!("Release {} created from {}", release.id(), git_ref));
        advance(state, PipelineState::Materialized);

        let permissions = PermissionApplier::new(
            self.runner,
            self.output,
            &config.chown,
            &config.chmod,
            use_sudo,
        );
        self.output.header("Permissions (pre)");
        permissions.apply(Phase::Pre, &release).await?;
        advance(state, PipelineState::PermissionsPre);

        self.output.header("Shared files");
        SharedLinker::new(&paths).link(&release, &config.shared)?;
        advance(state, PipelineState::SharedLinked);

        self.output.header("Remove files");
        let pruned = Pruner.remove(&release, &config.remove)?;
        tracing::debug!("pruned {} files", pruned);
        advance(state, PipelineState::Pruned);

        for (stage, phase) in [
            (HookStage::Deploy, Phase::Post),
            (HookStage::Rollback, Phase::Pre),
            (HookStage::Rollback, Phase::Post),
            (HookStage::Cleanup, Phase::Pre),
        ] {
            self.slot(&ctx, Some(&release), stage, phase, state).await?;
        }

        self.output.header("Remove stale releases");
        let releases = ReleaseStore::new(paths.clone());
        let mut protect = vec![release.id().clone()];
        protect.extend(releases.live());
        let cleaner = ReleaseCleaner::new(self.runner, self.output, &permissions, use_sudo);
        let removed = cleaner
            .clean(
                &releases,
                RetentionPolicy::new(config.environment.max_releases),
                &protect,
            )
            .await?;
        advance(state, PipelineState::StaleReleasesRemoved);

        self.slot(&ctx, Some(&release), HookStage::Cleanup, Phase::Post, state)
            .await?;
        self.slot(&ctx, Some(&release), HookStage::Live, Phase::Pre, state)
            .await?;

        self.output.header("Permissions (post)");
        permissions.apply(Phase::Post, &release).await?;
        advance(state, PipelineState::PermissionsPost);

        self.output.header("Promote");
        LivePromoter::new(&paths).promote(&release)?;
        self.output
            .progress(&format!("{} is now live", release.id()));
        advance(state, PipelineState::Promoted);

        self.slot(&ctx, Some(&release), HookStage::Live, Phase::Post, state)
            .await?;
        advance(state, PipelineState::Complete);

        Ok(DeployReport {
            release,
            git_ref,
            previous,
            removed: removed.into_iter().map(|r| r.id().clone()).collect(),
            diagnostics: Diagnostics::default(),
        })
    }

    async fn slot(
        &self,
        ctx: &RunContext<'_>,
        release: Option<&Release>,
        stage: HookStage,
        phase: Phase,
        state: &mut PipelineState,
    ) -> Result<(), DeployError> {
        let slot = HookSlot::new(stage, phase);
        let hook_ctx = HookContext {
            config: ctx.config,
            paths: ctx.paths,
            release,
            runner: self.runner,
            output: self.output,
        };
        run_slot(self.hooks, slot, &hook_ctx).await?;
        advance(state, PipelineState::HookSlotDone(slot));
        Ok(())
    }
}

fn advance(state: &mut PipelineState, next: PipelineState) {
    tracing::debug!("state: {}", next);
    *state = next;
}

/// Load the settings document for a locked run.
pub(crate) fn load_store(path: &Path) -> Result<ConfigStore, DeployError> {
    ConfigStore::open(path).map_err(|e| match e {
        crate::error::Error::Deploy(inner) => inner,
        other => DeployError::config_error(other.to_string()),
    })
}

async fn choose_ref(
    fetcher: &SourceFetcher<'_>,
    chooser: &dyn RefChooser,
    tag_filter: Option<&str>,
) -> Result<RefSelection, DeployError> {
    let tags = fetcher.list_tags(tag_filter).await?;
    if !tags.is_empty() {
        if let Some(tag) = chooser.choose_tag(&tags)? {
            return Ok(RefSelection::Tag(tag));
        }
    }

    let branches = fetcher.list_branches().await?;
    match chooser.choose_branch(&branches)? {
        Some(branch) => Ok(RefSelection::Branch(branch)),
        None => Ok(RefSelection::Default),
    }
}
