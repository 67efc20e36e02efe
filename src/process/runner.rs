// ABOUTME: Local subprocess execution with timeout and line forwarding.
// ABOUTME: Every deploy stage issues its commands through the CommandExec trait.

use async_trait::async_trait;
use snafu::ResultExt;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};

use super::command::Cmd;
use super::error::{IoSnafu, ProcessError, SpawnSnafu};
use crate::output::Output;

/// Captured result of a successful command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// Non-empty, trimmed stdout lines.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.stdout.lines().map(str::trim).filter(|l| !l.is_empty())
    }
}

/// Executes external commands on behalf of the deploy stages.
///
/// `run` blocks the calling task until the command exits. A non-zero exit or
/// an elapsed timeout is returned as an error; there is no retry.
#[async_trait]
pub trait CommandExec: Send + Sync {
    async fn run(&self, cmd: &Cmd) -> Result<CommandOutput, ProcessError>;
}

/// Runs commands on the local host with `tokio::process`.
#[derive(Debug, Clone)]
pub struct LocalRunner {
    timeout: Option<Duration>,
    output: Output,
}

impl LocalRunner {
    /// A zero timeout disables the limit.
    pub fn new(timeout: Duration, output: Output) -> Self {
        Self {
            timeout: if timeout.is_zero() { None } else { Some(timeout) },
            output,
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    async fn forward<R: AsyncRead + Unpin>(&self, reader: Option<R>) -> std::io::Result<String> {
        let Some(reader) = reader else {
            return Ok(String::new());
        };

        let mut collected = String::new();
        let mut lines = BufReader::new(reader).lines();
        while let Some(line) = lines.next_line().await? {
            let trimmed = line.trim();
            if !trimmed.is_empty() {
                tracing::debug!(target: "releaser::process", ">> {}", trimmed);
                self.output.process_line(trimmed);
            }
            collected.push_str(&line);
            collected.push('\n');
        }
        Ok(collected)
    }
}

#[async_trait]
impl CommandExec for LocalRunner {
    async fn run(&self, cmd: &Cmd) -> Result<CommandOutput, ProcessError> {
        let command = cmd.to_string();
        tracing::debug!("running: {}", command);

        let mut child = cmd
            .to_tokio()
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .context(SpawnSnafu {
                command: command.clone(),
            })?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        let completion = async {
            let (out, err) = tokio::join!(self.forward(stdout), self.forward(stderr));
            let status = child.wait().await;
            (out, err, status)
        };

        let (out, err, status) = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, completion).await {
                Ok(result) => result,
                Err(_) => {
                    return Err(ProcessError::Timeout {
                        command,
                        timeout: limit,
                    });
                }
            },
            None => completion.await,
        };

        let stdout = out.context(IoSnafu {
            command: command.clone(),
        })?;
        let stderr = err.context(IoSnafu {
            command: command.clone(),
        })?;
        let status = status.context(IoSnafu {
            command: command.clone(),
        })?;

        if !status.success() {
            return Err(ProcessError::Exit {
                command,
                code: status.code(),
                stderr,
            });
        }

        Ok(CommandOutput { stdout, stderr })
    }
}
