// ABOUTME: Config command implementations: template scaffolding and display.
// ABOUTME: `show` prints the effective settings with defaults and resolved paths applied.

use serde::Serialize;
use std::path::Path;

use releaser::config::{self, ConfigStore};
use releaser::error::Result;
use releaser::output::Output;

pub fn init(
    dir: &Path,
    root: Option<&Path>,
    repo: Option<&str>,
    force: bool,
    output: Output,
) -> Result<()> {
    let path = config::init_config(dir, root, repo, force)?;
    output.success(&format!("Created {}", path.display()));
    Ok(())
}

#[derive(Serialize)]
struct ResolvedPaths {
    root: String,
    repo: String,
    releases: String,
    shared: String,
    live: String,
}

pub fn show_config(config_path: &Path, output: Output) -> Result<()> {
    let store = ConfigStore::open(config_path)?;
    let paths = store.paths();
    let resolved = ResolvedPaths {
        root: paths.root().display().to_string(),
        repo: paths.repo().display().to_string(),
        releases: paths.releases().display().to_string(),
        shared: paths.shared().display().to_string(),
        live: paths.live_alias().display().to_string(),
    };

    let mut effective = store.config().clone();
    effective.current = store.current().cloned();
    let yaml = effective.to_yaml()?;
    output.data(&format!("# {}\n{yaml}", store.path().display()), &effective);
    output.data(
        &format!(
            "# resolved paths\n# root:     {}\n# repo:     {}\n# releases: {}\n# shared:   {}\n# live:     {}",
            resolved.root, resolved.repo, resolved.releases, resolved.shared, resolved.live
        ),
        &resolved,
    );
    Ok(())
}
