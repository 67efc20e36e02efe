// ABOUTME: Deploy command implementation.
// ABOUTME: Builds the ref request from flags and runs the deploy pipeline.

use std::path::Path;

use crate::cli::DeployArgs;
use releaser::deploy::{DeployPipeline, RefRequest};
use releaser::error::Result;
use releaser::output::Output;
use releaser::prompt::TerminalPrompt;
use releaser::types::RefSelection;

pub async fn deploy(config_path: &Path, args: DeployArgs, mut output: Output) -> Result<()> {
    output.start_timer();
    let (store, runner, hooks) = super::collaborators(config_path, &output)?;
    let prompt = TerminalPrompt::new(&store.config().git.branch);

    let request = if args.interactive {
        RefRequest::Interactive(&prompt)
    } else if let Some(tag) = args.tag {
        RefRequest::Fixed(RefSelection::Tag(tag))
    } else if let Some(branch) = args.branch {
        RefRequest::Fixed(RefSelection::Branch(branch))
    } else {
        RefRequest::Fixed(RefSelection::Default)
    };

    output.progress(&format!(
        "Deploying {} ({})",
        store.paths().root().display(),
        store.config().environment.name
    ));

    let report = DeployPipeline::new(config_path, &runner, &output, &hooks)
        .force_lock(args.force_lock)
        .run(request)
        .await?;

    for id in &report.removed {
        output.progress(&format!("Removed stale release {id}"));
    }
    for warning in report.diagnostics.warnings() {
        output.warning(&warning.message);
    }

    output.success(&format!(
        "Release {} ({}) is live",
        report.release.id(),
        report.git_ref
    ));
    Ok(())
}
