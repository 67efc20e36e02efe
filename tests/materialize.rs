// ABOUTME: Integration tests for release materialization.
// ABOUTME: Checks the copy, the persisted pointer, and id collision handling.

mod support;

use releaser::deploy::ReleaseMaterializer;
use releaser::diagnostics::{Diagnostics, WarningKind};
use releaser::types::ReleaseId;
use support::{RecordingRunner, Target, quiet};

#[tokio::test]
async fn materialize_copies_checkout_and_persists_pointer() {
    let target = Target::new("");
    let paths = target.paths();
    let mut store = target.store();
    let runner = RecordingRunner::new();
    let output = quiet();

    let release = ReleaseMaterializer::new(&runner, &output, &paths, false)
        .materialize(&mut store, &mut Diagnostics::default())
        .await
        .unwrap();

    assert!(release.join("index.php").is_file());
    assert!(release.join(".git").is_dir());
    assert_eq!(target.store().current(), Some(release.id()));
    assert!(release.id().timestamp().is_some());
}

#[tokio::test]
async fn colliding_id_gets_suffix() {
    let target = Target::new("");
    target.add_release("2024-01-01-00-00-00");
    target.add_release("2024-01-01-00-00-00-001");
    let paths = target.paths();
    let mut store = target.store();
    let runner = RecordingRunner::new();
    let output = quiet();

    let release = ReleaseMaterializer::new(&runner, &output, &paths, false)
        .materialize_as(
            ReleaseId::new("2024-01-01-00-00-00").unwrap(),
            &mut store,
            &mut Diagnostics::default(),
        )
        .await
        .unwrap();

    assert_eq!(release.id().as_str(), "2024-01-01-00-00-00-002");
    assert!(release.path().ends_with("2024-01-01-00-00-00-002"));
}

#[tokio::test]
async fn copy_runs_under_sudo_when_configured() {
    let target = Target::new("");
    let paths = target.paths();
    let mut store = target.store();
    let mut runner = RecordingRunner::new();
    runner.record_only.push("cp".to_string());
    let output = quiet();

    // cp is recorded but not executed, so the empty staging dir is renamed.
    let release = ReleaseMaterializer::new(&runner, &output, &paths, true)
        .materialize(&mut store, &mut Diagnostics::default())
        .await
        .unwrap();
    assert!(release.path().is_dir());

    let cp = runner.calls_to("cp");
    assert_eq!(cp.len(), 1);
    assert!(cp[0].uses_sudo());
    assert!(cp[0].to_string().starts_with("sudo cp -a "));
}

#[tokio::test]
async fn leftover_staging_is_replaced_with_warning() {
    let target = Target::new("");
    let leftover = target.paths().releases().join(".2024-02-02-00-00-00.partial");
    std::fs::create_dir_all(&leftover).unwrap();
    std::fs::write(leftover.join("stale.txt"), "old").unwrap();
    let paths = target.paths();
    let mut store = target.store();
    let runner = RecordingRunner::new();
    let output = quiet();
    let mut diagnostics = Diagnostics::default();

    let release = ReleaseMaterializer::new(&runner, &output, &paths, false)
        .materialize_as(
            ReleaseId::new("2024-02-02-00-00-00").unwrap(),
            &mut store,
            &mut diagnostics,
        )
        .await
        .unwrap();

    assert!(!leftover.exists());
    assert!(!release.join("stale.txt").exists());
    assert!(release.join("index.php").is_file());
    assert_eq!(diagnostics.warnings().len(), 1);
    assert_eq!(diagnostics.warnings()[0].kind, WarningKind::StagingCleanup);
}
