// ABOUTME: Keeps the working checkout in sync with the remote repository.
// ABOUTME: Initializes the checkout, fetches all refs, and checks out the selected tag or branch.

use std::path::{Path, PathBuf};

use super::{DeployError, StorageContext};
use crate::output::Output;
use crate::process::{Cmd, CommandExec, CommandOutput};
use crate::types::{GitRef, RefSelection};

/// Number of tags offered when choosing a ref.
pub const TAG_LIST_LIMIT: usize = 10;

/// Git operations on the working checkout.
pub struct SourceFetcher<'a> {
    runner: &'a dyn CommandExec,
    output: &'a Output,
    repo: PathBuf,
    use_sudo: bool,
}

impl<'a> SourceFetcher<'a> {
    pub fn new(
        runner: &'a dyn CommandExec,
        output: &'a Output,
        repo: &Path,
        use_sudo: bool,
    ) -> Self {
        Self {
            runner,
            output,
            repo: repo.to_path_buf(),
            use_sudo,
        }
    }

    /// Initialize the checkout if it has no git metadata, and register
    /// `remote_name` when it is missing.
    pub async fn ensure(
        &self,
        remote_url: Option<&str>,
        remote_name: &str,
    ) -> Result<(), DeployError> {
        if !self.repo.join(".git").exists() {
            std::fs::create_dir_all(&self.repo)
                .storage_context("failed to create repository directory", &self.repo)?;
            self.git(["init"]).await?;
        } else {
            let remotes = self.git(["remote"]).await?;
            if remotes.lines().any(|r| r == remote_name) {
                return Ok(());
            }
        }

        let Some(url) = remote_url else {
            return Err(DeployError::config_error(format!(
                "git.repo is not set and remote '{remote_name}' is not registered"
            )));
        };
        self.git(["remote", "add", remote_name, url]).await?;
        Ok(())
    }

    pub async fn fetch(&self) -> Result<(), DeployError> {
        self.git(["fetch", "--all"]).await?;
        Ok(())
    }

    /// Check out an already validated ref.
    pub async fn checkout(
        &self,
        git_ref: &GitRef,
        default_branch: &str,
    ) -> Result<(), DeployError> {
        tracing::debug!("checking out {}", git_ref);
        match git_ref {
            GitRef::Tag(tag) => self.git(["checkout", tag.as_str()]).await?,
            GitRef::Branch { remote, branch } => {
                self.git(["pull", remote.as_str(), branch.as_str()]).await?
            }
            GitRef::Default => self.git(["checkout", default_branch]).await?,
        };
        Ok(())
    }

    /// Validate `selection`, fetch every remote, then check it out.
    ///
    /// A malformed selection fails before any command is issued.
    pub async fn fetch_and_checkout(
        &self,
        selection: &RefSelection,
        default_branch: &str,
    ) -> Result<GitRef, DeployError> {
        let git_ref = selection.resolve()?;
        self.fetch().await?;
        self.checkout(&git_ref, default_branch).await?;
        Ok(git_ref)
    }

    /// Most recent tags by version order, optionally filtered by a glob.
    pub async fn list_tags(&self, filter: Option<&str>) -> Result<Vec<String>, DeployError> {
        let mut args = vec!["tag", "-l"];
        if let Some(filter) = filter {
            args.push(filter);
        }
        args.push("--sort=-v:refname");

        let output = self.git(args).await?;
        Ok(output
            .lines()
            .take(TAG_LIST_LIMIT)
            .map(str::to_string)
            .collect())
    }

    /// Remote-tracking branches as `remote/branch`, without the HEAD alias.
    pub async fn list_branches(&self) -> Result<Vec<String>, DeployError> {
        let output = self.git(["branch", "-r"]).await?;
        Ok(output
            .lines()
            .filter(|line| !line.contains("->"))
            .map(str::to_string)
            .collect())
    }

    async fn git<I, S>(&self, args: I) -> Result<CommandOutput, DeployError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<std::ffi::OsStr>,
    {
        let cmd = Cmd::git(&self.repo, args).sudo(self.use_sudo);
        self.output.command(&cmd.to_string());
        Ok(self.runner.run(&cmd).await?)
    }
}
