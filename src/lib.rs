// ABOUTME: Library root for releaser - exposes every pipeline component for testing.
// ABOUTME: The main binary is in main.rs.

pub mod config;
pub mod deploy;
pub mod diagnostics;
pub mod error;
pub mod hooks;
pub mod output;
pub mod process;
pub mod prompt;
pub mod release;
pub mod types;
