// ABOUTME: Rollback command implementation.
// ABOUTME: Repoints the live alias at a chosen earlier release.

use std::path::Path;

use releaser::deploy::{Rollback, RollbackOutcome, RollbackTarget};
use releaser::error::{Error, Result};
use releaser::output::Output;
use releaser::prompt::TerminalPrompt;
use releaser::types::ReleaseId;

pub async fn rollback(
    config_path: &Path,
    release: Option<String>,
    discard: bool,
    force_lock: bool,
    mut output: Output,
) -> Result<()> {
    output.start_timer();
    let (store, runner, hooks) = super::collaborators(config_path, &output)?;
    let prompt = TerminalPrompt::new(&store.config().git.branch);

    let target = match release {
        Some(id) => RollbackTarget::Release(
            ReleaseId::new(&id).map_err(|e| Error::InvalidConfig(e.to_string()))?,
        ),
        None => RollbackTarget::Interactive(&prompt),
    };

    let outcome = Rollback::new(config_path, &runner, &output, &hooks)
        .force_lock(force_lock)
        .discard(discard)
        .run(target)
        .await?;

    match outcome {
        RollbackOutcome::RolledBack {
            from,
            to,
            discarded,
            diagnostics,
        } => {
            if let Some(old) = discarded {
                output.progress(&format!("Removed release {old}"));
            }
            for warning in diagnostics.warnings() {
                output.warning(&warning.message);
            }
            let from = from.map(|id| id.to_string()).unwrap_or_else(|| "none".to_string());
            output.success(&format!("Rolled back from {from} to {to}"));
        }
        RollbackOutcome::AlreadyLive(id) => {
            output.warning(&format!("Selected release {id} is already live"));
        }
        RollbackOutcome::Cancelled => {
            output.progress("Rollback cancelled");
        }
    }
    Ok(())
}
