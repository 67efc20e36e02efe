// ABOUTME: External command execution for deploy stages.
// ABOUTME: Structured argv commands, a runner trait, and the local tokio implementation.

mod command;
mod error;
mod runner;

pub use command::Cmd;
pub use error::{ProcessError, ProcessErrorKind};
pub use runner::{CommandExec, CommandOutput, LocalRunner};
