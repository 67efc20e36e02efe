// ABOUTME: Error types for deployment operations.
// ABOUTME: Configuration, storage, process, promotion, and lock failures; all are fatal.

use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

use super::state::PipelineState;
use crate::process::ProcessError;
use crate::types::GitRefError;

/// Errors raised by pipeline stages. Every variant aborts the run.
#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    /// Missing or invalid setting, malformed ref, unseeded shared file,
    /// unknown hook name.
    #[error("configuration error: {0}")]
    Config(String),

    /// A filesystem path could not be read or written.
    #[error("{context} ({}): {source}", path.display())]
    Storage {
        context: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An expected directory or release is absent.
    #[error("{0}")]
    Missing(String),

    /// An external command exited non-zero or timed out.
    #[error(transparent)]
    Process(#[from] ProcessError),

    /// The live alias could not be repointed.
    #[error("failed to promote release: {0}")]
    Promotion(String),

    /// Another run holds the deploy lock.
    #[error("deploy lock held by {holder} (pid {pid}) since {started_at}")]
    LockHeld {
        holder: String,
        pid: u32,
        started_at: DateTime<Utc>,
    },

    /// The deploy lock could not be created, read, or removed.
    #[error("deploy lock error: {0}")]
    Lock(String),
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployErrorKind {
    Configuration,
    Storage,
    Process,
    Promotion,
    Lock,
}

/// Who holds a contested deploy lock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockHolderInfo {
    pub holder: String,
    pub pid: u32,
    pub started_at: DateTime<Utc>,
}

impl DeployError {
    pub fn kind(&self) -> DeployErrorKind {
        match self {
            DeployError::Config(_) => DeployErrorKind::Configuration,
            DeployError::Storage { .. } | DeployError::Missing(_) => DeployErrorKind::Storage,
            DeployError::Process(_) => DeployErrorKind::Process,
            DeployError::Promotion(_) => DeployErrorKind::Promotion,
            DeployError::LockHeld { .. } | DeployError::Lock(_) => DeployErrorKind::Lock,
        }
    }

    pub fn config_error(message: impl Into<String>) -> Self {
        DeployError::Config(message.into())
    }

    pub fn storage(context: impl Into<String>, path: &Path, source: std::io::Error) -> Self {
        DeployError::Storage {
            context: context.into(),
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn missing(message: impl Into<String>) -> Self {
        DeployError::Missing(message.into())
    }

    pub fn promotion(message: impl Into<String>) -> Self {
        DeployError::Promotion(message.into())
    }

    pub fn lock_held(holder: String, pid: u32, started_at: DateTime<Utc>) -> Self {
        DeployError::LockHeld {
            holder,
            pid,
            started_at,
        }
    }

    pub fn lock_error(message: impl Into<String>) -> Self {
        DeployError::Lock(message.into())
    }

    /// Lock holder details when this is a lock-held error.
    pub fn lock_holder_info(&self) -> Option<LockHolderInfo> {
        match self {
            DeployError::LockHeld {
                holder,
                pid,
                started_at,
            } => Some(LockHolderInfo {
                holder: holder.clone(),
                pid: *pid,
                started_at: *started_at,
            }),
            _ => None,
        }
    }
}

impl From<GitRefError> for DeployError {
    fn from(err: GitRefError) -> Self {
        DeployError::Config(err.to_string())
    }
}

/// Helper for attaching path context to `std::io` results.
pub(crate) trait StorageContext<T> {
    fn storage_context(self, context: &str, path: &Path) -> Result<T, DeployError>;
}

impl<T> StorageContext<T> for std::io::Result<T> {
    fn storage_context(self, context: &str, path: &Path) -> Result<T, DeployError> {
        self.map_err(|e| DeployError::storage(context, path, e))
    }
}

/// A pipeline run that aborted, with the last state it reached.
#[derive(Debug, thiserror::Error)]
#[error("deploy aborted after {state}: {source}")]
pub struct PipelineFailure {
    pub state: PipelineState,
    #[source]
    pub source: DeployError,
}
