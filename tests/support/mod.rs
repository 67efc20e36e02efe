// ABOUTME: Test support utilities.
// ABOUTME: Provides a recording command runner that fakes git and a deploy target builder.

use async_trait::async_trait;
use releaser::config::{ConfigStore, DeployPaths};
use releaser::deploy::DirectoryStructure;
use releaser::output::{Output, OutputMode};
use releaser::process::{Cmd, CommandExec, CommandOutput, LocalRunner, ProcessError};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, Once};
use std::time::Duration;
use tempfile::TempDir;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for tests. Safe to call multiple times.
#[allow(dead_code)]
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;
        let filter = EnvFilter::from_default_env()
            .add_directive("releaser=debug".parse().unwrap());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

#[allow(dead_code)]
pub fn quiet() -> Output {
    Output::new(OutputMode::Quiet)
}

/// Records every command. Git is answered from canned output and never
/// executed; programs in `record_only` (by default `chown` and `chmod`) are
/// not run; anything else runs locally.
#[allow(dead_code)]
pub struct RecordingRunner {
    calls: Mutex<Vec<Cmd>>,
    local: LocalRunner,
    pub remotes: Vec<String>,
    pub tags: Vec<String>,
    pub branches: Vec<String>,
    /// Program names that fail with a non-zero exit.
    pub failing: Vec<String>,
    pub record_only: Vec<String>,
}

#[allow(dead_code)]
impl RecordingRunner {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            local: LocalRunner::new(Duration::from_secs(30), quiet()),
            remotes: vec!["origin".to_string()],
            tags: Vec::new(),
            branches: Vec::new(),
            failing: Vec::new(),
            record_only: vec!["chown".to_string(), "chmod".to_string()],
        }
    }

    pub fn calls(&self) -> Vec<Cmd> {
        self.calls.lock().unwrap().clone()
    }

    /// Rendered command lines, in order.
    pub fn lines(&self) -> Vec<String> {
        self.calls().iter().map(|c| c.to_string()).collect()
    }

    /// Commands whose program is `program`.
    pub fn calls_to(&self, program: &str) -> Vec<Cmd> {
        self.calls()
            .into_iter()
            .filter(|c| c.program() == program)
            .collect()
    }

    fn git(&self, cmd: &Cmd) -> CommandOutput {
        let args: Vec<String> = cmd
            .arguments()
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        let stdout = match args.first().map(String::as_str) {
            Some("init") => {
                if let Some(dir) = cmd.working_dir() {
                    std::fs::create_dir_all(dir.join(".git")).unwrap();
                }
                String::new()
            }
            Some("remote") if args.len() == 1 => self.remotes.join("\n"),
            Some("tag") => self.tags.join("\n"),
            Some("branch") => self.branches.join("\n"),
            _ => String::new(),
        };
        CommandOutput {
            stdout,
            stderr: String::new(),
        }
    }
}

#[async_trait]
impl CommandExec for RecordingRunner {
    async fn run(&self, cmd: &Cmd) -> Result<CommandOutput, ProcessError> {
        self.calls.lock().unwrap().push(cmd.clone());
        let program = cmd.program().to_string_lossy().into_owned();

        if self.failing.contains(&program) {
            return self.local.run(&Cmd::new("sh").args(["-c", "exit 3"])).await;
        }
        if program == "git" {
            return Ok(self.git(cmd));
        }
        if self.record_only.contains(&program) {
            return Ok(CommandOutput::default());
        }
        self.local.run(cmd).await
    }
}

/// A deploy target in a temp directory: settings document, layout, and a
/// checkout with a few files.
#[allow(dead_code)]
pub struct Target {
    pub dir: TempDir,
    pub config_path: PathBuf,
}

#[allow(dead_code)]
impl Target {
    pub fn new(yaml: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("releaser.yml");
        std::fs::write(&config_path, yaml).unwrap();

        let target = Self { dir, config_path };
        DirectoryStructure::new(target.paths()).create().unwrap();

        let repo = target.paths().repo().to_path_buf();
        std::fs::create_dir_all(repo.join(".git")).unwrap();
        std::fs::create_dir_all(repo.join("config")).unwrap();
        std::fs::write(repo.join("index.php"), "<?php echo 'hi';").unwrap();
        std::fs::write(repo.join(".env.dist"), "APP_ENV=prod").unwrap();
        std::fs::write(repo.join("README.md"), "docs").unwrap();
        target
    }

    pub fn store(&self) -> ConfigStore {
        ConfigStore::open(&self.config_path).unwrap()
    }

    pub fn paths(&self) -> DeployPaths {
        self.store().paths()
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Create an empty release directory.
    pub fn add_release(&self, id: &str) -> PathBuf {
        let path = self.root().join("releases").join(id);
        std::fs::create_dir_all(&path).unwrap();
        std::fs::write(path.join("index.php"), id).unwrap();
        path
    }
}
