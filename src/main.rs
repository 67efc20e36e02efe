// ABOUTME: Entry point for the releaser CLI application.
// ABOUTME: Parses arguments, sets up tracing, and dispatches to command handlers.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands, ConfigCommand};
use releaser::config::Config;
use releaser::error::Result;
use releaser::output::{Output, OutputMode};
use std::env;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing subscriber based on verbose flag
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let mode = if cli.json {
        OutputMode::Json
    } else if cli.quiet {
        OutputMode::Quiet
    } else {
        OutputMode::Normal
    };
    let output = Output::new(mode);

    if let Err(e) = run(cli, output.clone()).await {
        output.error(&e.to_string());
        std::process::exit(1);
    }
}

async fn run(cli: Cli, output: Output) -> Result<()> {
    let cwd = env::current_dir()?;

    match cli.command {
        Commands::Init { root, repo, force } => {
            commands::init(&cwd, root.as_deref(), repo.as_deref(), force, output)
        }
        Commands::Deploy(args) => {
            let config_path = config_path(cli.config, &cwd)?;
            commands::deploy(&config_path, args, output).await
        }
        Commands::Rollback {
            release,
            discard,
            force_lock,
        } => {
            let config_path = config_path(cli.config, &cwd)?;
            commands::rollback(&config_path, release, discard, force_lock, output).await
        }
        Commands::Releases => {
            let config_path = config_path(cli.config, &cwd)?;
            commands::releases(&config_path, output)
        }
        Commands::Config {
            command: ConfigCommand::Show,
        } => {
            let config_path = config_path(cli.config, &cwd)?;
            commands::show_config(&config_path, output)
        }
    }
}

/// The `--config` path if given, otherwise the document found in `cwd`.
fn config_path(explicit: Option<PathBuf>, cwd: &std::path::Path) -> Result<PathBuf> {
    match explicit {
        Some(path) if path.is_absolute() => Ok(path),
        Some(path) => Ok(cwd.join(path)),
        None => Config::discover_path(cwd),
    }
}
