// ABOUTME: Integration tests for extension hooks.
// ABOUTME: Tests registry resolution, built-in commands, script hooks, and custom registration.

mod support;

use async_trait::async_trait;
use releaser::config::{Config, DeployPaths};
use releaser::deploy::{DeployError, DeployErrorKind};
use releaser::hooks::{ExtensionHook, HookContext, HookRegistry, HookSlot, HookStage, run_slot};
use releaser::release::Release;
use releaser::types::{Phase, ReleaseId};
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use support::{RecordingRunner, quiet};
use tempfile::TempDir;

fn create_script(release_dir: &Path, name: &str, script: &str) {
    let path = release_dir.join(name);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, script).unwrap();

    // Make executable
    let mut perms = fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).unwrap();
}

struct Fixture {
    _dir: TempDir,
    config: Config,
    paths: DeployPaths,
    release: Release,
}

fn fixture(processes: &str) -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::from_yaml(processes).unwrap();
    let paths = DeployPaths::resolve(&config.paths, dir.path());
    let id = ReleaseId::new("2024-01-01-00-00-00").unwrap();
    fs::create_dir_all(paths.release(&id)).unwrap();
    let release = Release::new(id.clone(), paths.release(&id));
    Fixture {
        _dir: dir,
        config,
        paths,
        release,
    }
}

#[tokio::test]
async fn builtins_run_inside_release() {
    let fx = fixture(
        "processes:\n  live:\n    pre: [doctrine-migrations, composer-install]\n",
    );
    let mut runner = RecordingRunner::new();
    // php and composer are not installed in tests; record them instead.
    runner.record_only.extend(["php".to_string(), "composer".to_string()]);
    let output = quiet();
    let registry = HookRegistry::with_builtins();

    let ctx = HookContext {
        config: &fx.config,
        paths: &fx.paths,
        release: Some(&fx.release),
        runner: &runner,
        output: &output,
    };
    run_slot(&registry, HookSlot::new(HookStage::Live, Phase::Pre), &ctx)
        .await
        .unwrap();

    let calls = runner.calls();
    assert_eq!(calls.len(), 2);
    assert!(calls[0].to_string().starts_with("php bin/console doctrine:migrations:migrate"));
    assert!(calls[1].to_string().starts_with("composer install --no-dev"));
    assert_eq!(calls[0].working_dir(), Some(fx.release.path()));
}

#[tokio::test]
async fn script_hook_receives_environment() {
    let fx = fixture("processes:\n  deploy:\n    post: [\"script:bin/post-deploy.sh\"]\n");
    create_script(
        fx.release.path(),
        "bin/post-deploy.sh",
        "#!/bin/sh\necho \"$RELEASER_RELEASE $RELEASER_ENVIRONMENT\" > hook.out\n",
    );
    let runner = RecordingRunner::new();
    let output = quiet();
    let registry = HookRegistry::with_builtins();

    let ctx = HookContext {
        config: &fx.config,
        paths: &fx.paths,
        release: Some(&fx.release),
        runner: &runner,
        output: &output,
    };
    run_slot(&registry, HookSlot::new(HookStage::Deploy, Phase::Post), &ctx)
        .await
        .unwrap();

    let written = fs::read_to_string(fx.release.join("hook.out")).unwrap();
    assert_eq!(written.trim(), "2024-01-01-00-00-00 prod");
}

#[tokio::test]
async fn failing_script_propagates_process_error() {
    let fx = fixture("processes:\n  cleanup:\n    pre: [\"script:fail.sh\"]\n");
    create_script(fx.release.path(), "fail.sh", "#!/bin/sh\necho nope >&2\nexit 4\n");
    let runner = RecordingRunner::new();
    let output = quiet();
    let registry = HookRegistry::with_builtins();

    let ctx = HookContext {
        config: &fx.config,
        paths: &fx.paths,
        release: Some(&fx.release),
        runner: &runner,
        output: &output,
    };
    let err = run_slot(&registry, HookSlot::new(HookStage::Cleanup, Phase::Pre), &ctx)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), DeployErrorKind::Process);
}

#[tokio::test]
async fn slot_with_unknown_name_runs_nothing() {
    let fx = fixture("processes:\n  live:\n    post: [\"script:ok.sh\", unknown-hook]\n");
    create_script(fx.release.path(), "ok.sh", "#!/bin/sh\ntouch ran\n");
    let runner = RecordingRunner::new();
    let output = quiet();
    let registry = HookRegistry::with_builtins();

    let ctx = HookContext {
        config: &fx.config,
        paths: &fx.paths,
        release: Some(&fx.release),
        runner: &runner,
        output: &output,
    };
    let err = run_slot(&registry, HookSlot::new(HookStage::Live, Phase::Post), &ctx)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), DeployErrorKind::Configuration);
    assert!(runner.calls().is_empty());
    assert!(!fx.release.join("ran").exists());
}

#[tokio::test]
async fn release_bound_hook_before_materialization_is_configuration_error() {
    let fx = fixture("processes:\n  deploy:\n    pre: [composer-install]\n");
    let runner = RecordingRunner::new();
    let output = quiet();
    let registry = HookRegistry::with_builtins();

    let ctx = HookContext {
        config: &fx.config,
        paths: &fx.paths,
        release: None,
        runner: &runner,
        output: &output,
    };
    let err = run_slot(&registry, HookSlot::new(HookStage::Deploy, Phase::Pre), &ctx)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), DeployErrorKind::Configuration);
}

struct Marker;

#[async_trait]
impl ExtensionHook for Marker {
    fn name(&self) -> &str {
        "marker"
    }

    async fn execute(&self, ctx: &HookContext<'_>) -> Result<(), DeployError> {
        let path = ctx.release_path(self.name())?.join("marker");
        fs::write(path, "ok").map_err(|e| DeployError::config_error(e.to_string()))
    }
}

#[tokio::test]
async fn custom_hooks_can_be_registered() {
    let fx = fixture("processes:\n  rollback:\n    post: [marker]\n");
    let runner = RecordingRunner::new();
    let output = quiet();
    let mut registry = HookRegistry::with_builtins();
    registry.register("marker", || Box::new(Marker));

    let ctx = HookContext {
        config: &fx.config,
        paths: &fx.paths,
        release: Some(&fx.release),
        runner: &runner,
        output: &output,
    };
    run_slot(&registry, HookSlot::new(HookStage::Rollback, Phase::Post), &ctx)
        .await
        .unwrap();

    assert!(fx.release.join("marker").is_file());
}
