// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines all subcommands and their arguments.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "releaser")]
#[command(about = "Timestamped release deployment with shared files, retention and rollback")]
#[command(version)]
pub struct Cli {
    /// Settings document (default: releaser.yml in the current directory)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print warnings and the final result
    #[arg(short, long, global = true, conflicts_with = "json")]
    pub quiet: bool,

    /// Print JSON lines
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a releaser.yml template and create the directory layout
    Init {
        /// Deploy root (default: the current directory)
        #[arg(long)]
        root: Option<PathBuf>,

        /// Git URL of the repository to deploy
        #[arg(long)]
        repo: Option<String>,

        /// Overwrite an existing settings document
        #[arg(long)]
        force: bool,
    },

    /// Fetch, build a new release, and make it live
    Deploy(DeployArgs),

    /// Point the live alias back at an earlier release
    Rollback {
        /// Release id to roll back to (prompts when omitted)
        #[arg(short, long)]
        release: Option<String>,

        /// Remove the release that was live before the rollback
        #[arg(long)]
        discard: bool,

        /// Break a deploy lock held by another run
        #[arg(long)]
        force_lock: bool,
    },

    /// List releases, newest first
    Releases,

    /// Inspect the settings document
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Args)]
pub struct DeployArgs {
    /// Tag to check out
    #[arg(short, long, conflicts_with_all = ["branch", "interactive"])]
    pub tag: Option<String>,

    /// Remote branch to pull, as remote/branch
    #[arg(short, long, conflicts_with = "interactive")]
    pub branch: Option<String>,

    /// Choose a tag or branch from a list
    #[arg(short, long)]
    pub interactive: bool,

    /// Break a deploy lock held by another run
    #[arg(long)]
    pub force_lock: bool,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Print the effective settings with defaults and resolved paths
    Show,
}
