// ABOUTME: Terminal prompts for choosing a ref to deploy or a release to roll back to.
// ABOUTME: Backed by dialoguer; the first entry of every list declines the choice.

use dialoguer::Select;

use crate::deploy::{DeployError, RefChooser, ReleaseChooser};
use crate::release::Release;

/// Select-list prompts on the controlling terminal.
#[derive(Debug, Clone)]
pub struct TerminalPrompt {
    default_branch: String,
}

impl TerminalPrompt {
    pub fn new(default_branch: &str) -> Self {
        Self {
            default_branch: default_branch.to_string(),
        }
    }

    /// Show `first` followed by `items`; `None` when `first` is picked or
    /// the prompt is dismissed.
    fn select(
        &self,
        prompt: &str,
        first: &str,
        items: &[String],
    ) -> Result<Option<usize>, DeployError> {
        let mut entries = Vec::with_capacity(items.len() + 1);
        entries.push(first.to_string());
        entries.extend(items.iter().cloned());

        let picked = Select::new()
            .with_prompt(prompt)
            .items(&entries)
            .default(0)
            .interact_opt()
            .map_err(|e| DeployError::config_error(format!("prompt failed: {e}")))?;

        Ok(picked.and_then(|index| index.checked_sub(1)))
    }
}

impl RefChooser for TerminalPrompt {
    fn choose_tag(&self, tags: &[String]) -> Result<Option<String>, DeployError> {
        let index = self.select("Select a tag to deploy", "none (choose a branch)", tags)?;
        Ok(index.map(|i| tags[i].clone()))
    }

    fn choose_branch(&self, branches: &[String]) -> Result<Option<String>, DeployError> {
        let first = format!("default branch ({})", self.default_branch);
        let index = self.select("Select a branch to deploy", &first, branches)?;
        Ok(index.map(|i| branches[i].clone()))
    }
}

impl ReleaseChooser for TerminalPrompt {
    fn choose(&self, candidates: &[Release]) -> Result<Option<Release>, DeployError> {
        let labels: Vec<String> = candidates.iter().map(release_label).collect();
        let index = self.select("Select a release to roll back to", "Cancel", &labels)?;
        Ok(index.map(|i| candidates[i].clone()))
    }
}

/// `id (Mon DDth, YYYY hh:mm:ss am)`, or the bare id when it carries no date.
pub fn release_label(release: &Release) -> String {
    match release.id().display_date() {
        Some(date) => format!("{} ({date})", release.id()),
        None => release.id().to_string(),
    }
}
