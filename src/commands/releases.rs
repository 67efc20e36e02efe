// ABOUTME: Releases command implementation.
// ABOUTME: Lists releases newest first, marking the current pointer and the live alias target.

use serde::Serialize;
use std::path::Path;

use releaser::config::ConfigStore;
use releaser::error::Result;
use releaser::output::Output;
use releaser::prompt::release_label;
use releaser::release::ReleaseStore;

#[derive(Serialize)]
struct ReleaseEntry<'a> {
    id: &'a str,
    date: Option<String>,
    current: bool,
    live: bool,
}

pub fn releases(config_path: &Path, output: Output) -> Result<()> {
    let store = ConfigStore::open(config_path)?;
    let releases = ReleaseStore::new(store.paths());
    let live = releases.live();
    let listed = releases.list()?;

    if listed.is_empty() {
        output.progress("No releases");
        return Ok(());
    }

    for release in &listed {
        let current = store.current() == Some(release.id());
        let is_live = live.as_ref() == Some(release.id());
        let marker = if current { "*" } else { " " };
        let suffix = if is_live { "  [live]" } else { "" };

        output.data(
            &format!("{marker} {}{suffix}", release_label(release)),
            &ReleaseEntry {
                id: release.id().as_str(),
                date: release.id().display_date(),
                current,
                live: is_live,
            },
        );
    }
    Ok(())
}
