// ABOUTME: Integration tests for the release store and retention selection.
// ABOUTME: Covers listing rules, stale selection scenarios, and the retention invariant.

mod support;

use proptest::prelude::*;
use releaser::deploy::DeployErrorKind;
use releaser::release::{ReleaseStore, RetentionPolicy, stale_among};
use releaser::types::ReleaseId;
use std::num::NonZeroUsize;
use support::Target;

fn policy(n: usize) -> RetentionPolicy {
    RetentionPolicy::new(NonZeroUsize::new(n).unwrap())
}

fn id(value: &str) -> ReleaseId {
    ReleaseId::new(value).unwrap()
}

fn ids(store: &ReleaseStore) -> Vec<String> {
    store
        .list()
        .unwrap()
        .iter()
        .map(|r| r.id().to_string())
        .collect()
}

#[test]
fn list_is_newest_first_and_skips_dotfiles_and_files() {
    let target = Target::new("");
    target.add_release("2024-01-01-00-00-00");
    target.add_release("2024-01-03-00-00-00");
    target.add_release("2024-01-02-00-00-00");
    target.add_release(".2024-01-04-00-00-00.partial");
    std::fs::write(target.root().join("releases/notes.txt"), "x").unwrap();

    let store = ReleaseStore::new(target.paths());

    assert_eq!(
        ids(&store),
        vec![
            "2024-01-03-00-00-00",
            "2024-01-02-00-00-00",
            "2024-01-01-00-00-00"
        ]
    );
}

#[test]
fn release_paths_end_with_separator() {
    let target = Target::new("");
    target.add_release("2024-01-01-00-00-00");
    let store = ReleaseStore::new(target.paths());

    let release = store.get(&id("2024-01-01-00-00-00")).unwrap();
    assert!(release.path().to_string_lossy().ends_with("/2024-01-01-00-00-00/"));
    assert!(store.exists(release.id()));
    assert!(!store.exists(&id("2023-12-31-00-00-00")));
}

#[test]
fn unknown_release_is_storage_error() {
    let target = Target::new("");
    let store = ReleaseStore::new(target.paths());
    let err = store.get(&id("2024-01-01-00-00-00")).unwrap_err();
    assert_eq!(err.kind(), DeployErrorKind::Storage);
}

#[test]
fn unreadable_releases_root_is_storage_error() {
    let target = Target::new("");
    std::fs::remove_dir_all(target.root().join("releases")).unwrap();
    let store = ReleaseStore::new(target.paths());

    let err = store.find_stale(policy(1), &[]).unwrap_err();
    assert_eq!(err.kind(), DeployErrorKind::Storage);
}

#[test]
fn find_stale_returns_oldest_beyond_window() {
    let target = Target::new("");
    let a = "2024-01-01-00-00-00";
    let b = "2024-01-02-00-00-00";
    let c = "2024-01-03-00-00-00";
    for r in [a, b, c] {
        target.add_release(r);
    }
    let store = ReleaseStore::new(target.paths());

    let stale = store.find_stale(policy(2), &[id(c)]).unwrap();
    let stale: Vec<_> = stale.iter().map(|r| r.id().to_string()).collect();
    assert_eq!(stale, vec![a]);
}

#[test]
fn find_stale_protects_live_release_outside_window() {
    let target = Target::new("");
    let a = "2024-01-01-00-00-00";
    for r in [a, "2024-01-02-00-00-00", "2024-01-03-00-00-00"] {
        target.add_release(r);
    }
    let store = ReleaseStore::new(target.paths());

    assert!(store.find_stale(policy(2), &[id(a)]).unwrap().is_empty());
}

#[test]
fn find_stale_is_empty_within_window() {
    let target = Target::new("");
    target.add_release("2024-01-01-00-00-00");
    let store = ReleaseStore::new(target.paths());
    assert!(store.find_stale(policy(5), &[]).unwrap().is_empty());
}

#[test]
fn live_reads_alias_target() {
    let target = Target::new("");
    let path = target.add_release("2024-01-01-00-00-00");
    std::os::unix::fs::symlink(&path, target.root().join("current")).unwrap();

    let store = ReleaseStore::new(target.paths());
    assert_eq!(store.live(), Some(id("2024-01-01-00-00-00")));
}

proptest! {
    #[test]
    fn retention_invariant(count in 0usize..30, keep in 1usize..10, protect_index in 0usize..30) {
        // Newest first: index 0 has the largest id.
        let all: Vec<ReleaseId> = (0..count)
            .rev()
            .map(|n| id(&format!("2024-01-01-00-00-{n:02}")))
            .collect();
        let protect: Vec<ReleaseId> = all.get(protect_index).cloned().into_iter().collect();

        let stale = stale_among(&all, policy(keep), &protect, |r| r);

        let expected = count.saturating_sub(keep)
            - usize::from(protect_index >= keep && protect_index < count);
        prop_assert_eq!(stale.len(), expected);
        for s in &stale {
            prop_assert!(!protect.contains(s));
            // Every stale id is older than every kept id in the window.
            prop_assert!(all[..keep.min(count)].iter().all(|kept| kept > *s));
        }
    }
}
