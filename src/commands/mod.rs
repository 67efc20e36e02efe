// ABOUTME: Command module aggregator for the releaser CLI.
// ABOUTME: Re-exports deploy, rollback, releases, and config command handlers.

mod config;
mod deploy;
mod releases;
mod rollback;

pub use config::{init, show_config};
pub use deploy::deploy;
pub use releases::releases;
pub use rollback::rollback;

use releaser::config::ConfigStore;
use releaser::error::Result;
use releaser::hooks::HookRegistry;
use releaser::output::Output;
use releaser::process::LocalRunner;
use std::path::Path;

/// Runner and hook table shared by deploy and rollback.
fn collaborators(
    config_path: &Path,
    output: &Output,
) -> Result<(ConfigStore, LocalRunner, HookRegistry)> {
    let store = ConfigStore::open(config_path)?;
    let runner = LocalRunner::new(store.config().environment.process_timeout, output.clone());
    Ok((store, runner, HookRegistry::with_builtins()))
}
