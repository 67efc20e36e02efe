// ABOUTME: Subprocess error types with SNAFU pattern.
// ABOUTME: A timeout fails the same way a non-zero exit does.

use snafu::Snafu;
use std::time::Duration;

/// Failure of one external command.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ProcessError {
    #[snafu(display("failed to start `{command}`: {source}"))]
    Spawn {
        command: String,
        source: std::io::Error,
    },

    #[snafu(display("`{command}` failed with exit code {}", code.map_or_else(|| "none (killed by signal)".to_string(), |c| c.to_string())))]
    Exit {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    #[snafu(display("`{command}` timed out after {timeout:?}"))]
    Timeout { command: String, timeout: Duration },

    #[snafu(display("failed to read output of `{command}`: {source}"))]
    Io {
        command: String,
        source: std::io::Error,
    },
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessErrorKind {
    /// The program could not be started.
    Spawn,
    /// The program exited unsuccessfully.
    Exit,
    /// The program exceeded the configured timeout and was killed.
    Timeout,
    /// Reading the program's output failed.
    Io,
}

impl ProcessError {
    pub fn kind(&self) -> ProcessErrorKind {
        match self {
            ProcessError::Spawn { .. } => ProcessErrorKind::Spawn,
            ProcessError::Exit { .. } => ProcessErrorKind::Exit,
            ProcessError::Timeout { .. } => ProcessErrorKind::Timeout,
            ProcessError::Io { .. } => ProcessErrorKind::Io,
        }
    }

    /// The command line that failed, as it was logged.
    pub fn command(&self) -> &str {
        match self {
            ProcessError::Spawn { command, .. }
            | ProcessError::Exit { command, .. }
            | ProcessError::Timeout { command, .. }
            | ProcessError::Io { command, .. } => command,
        }
    }

    /// Captured stderr of a command that exited unsuccessfully.
    pub fn stderr(&self) -> Option<&str> {
        match self {
            ProcessError::Exit { stderr, .. } => Some(stderr),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_display_includes_code() {
        let err = ProcessError::Exit {
            command: "git fetch --all".to_string(),
            code: Some(128),
            stderr: "fatal".to_string(),
        };
        assert_eq!(err.to_string(), "`git fetch --all` failed with exit code 128");
        assert_eq!(err.kind(), ProcessErrorKind::Exit);
        assert_eq!(err.stderr(), Some("fatal"));
    }

    #[test]
    fn signal_exit_has_no_code() {
        let err = ProcessError::Exit {
            command: "cp".to_string(),
            code: None,
            stderr: String::new(),
        };
        assert!(err.to_string().contains("killed by signal"));
    }

    #[test]
    fn timeout_reports_command() {
        let err = ProcessError::Timeout {
            command: "sleep 10".to_string(),
            timeout: Duration::from_secs(1),
        };
        assert_eq!(err.command(), "sleep 10");
        assert_eq!(err.kind(), ProcessErrorKind::Timeout);
    }
}
