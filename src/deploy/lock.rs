// ABOUTME: Advisory deploy lock preventing concurrent runs against one release tree.
// ABOUTME: Uses atomic file creation with lock info stored next to the settings document.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use super::DeployError;
use crate::diagnostics::{Diagnostics, Warning};

/// File name of the lock, created beside the settings document.
pub const LOCK_FILENAME: &str = ".releaser.lock";

/// Information about who holds a deploy lock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockInfo {
    /// Hostname of the machine that holds the lock.
    pub holder: String,
    /// Process ID of the lock holder.
    pub pid: u32,
    /// When the lock was acquired.
    pub started_at: DateTime<Utc>,
    /// Settings document the run was started with.
    pub config: String,
}

impl LockInfo {
    /// Create new lock info for the current process.
    pub fn new(config: &Path) -> Self {
        Self {
            holder: gethostname::gethostname().to_string_lossy().into_owned(),
            pid: std::process::id(),
            started_at: Utc::now(),
            config: config.display().to_string(),
        }
    }

    /// Check if this lock is stale (older than 1 hour).
    pub fn is_stale(&self) -> bool {
        let age = Utc::now() - self.started_at;
        age.num_hours() >= 1
    }

    /// Path to the lock file guarding the settings document at `config`.
    pub fn lock_path(config: &Path) -> PathBuf {
        match config.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.join(LOCK_FILENAME),
            _ => PathBuf::from(LOCK_FILENAME),
        }
    }
}

/// A held deploy lock that releases on drop.
#[derive(Debug)]
pub struct DeployLock {
    path: PathBuf,
    released: bool,
}

impl DeployLock {
    /// Acquire the lock guarding the settings document at `config`.
    ///
    /// Fails with a lock error if another run holds it. Stale locks (>1 hour)
    /// and, with `force`, live locks are broken with a warning.
    pub fn acquire(
        config: &Path,
        force: bool,
        diagnostics: &mut Diagnostics,
    ) -> Result<Self, DeployError> {
        let path = LockInfo::lock_path(config);
        let lock_json = serde_json::to_string(&LockInfo::new(config))
            .map_err(|e| DeployError::lock_error(format!("failed to serialize lock: {e}")))?;

        if Self::try_create(&path, &lock_json)? {
            return Ok(Self::held(path));
        }

        match Self::read_existing(&path) {
            Some(existing) if force || existing.is_stale() => {
                let reason = if force { "Breaking" } else { "Auto-breaking stale" };
                diagnostics.warn(Warning::stale_lock(format!(
                    "{reason} lock held by {} (pid {}) since {}",
                    existing.holder, existing.pid, existing.started_at
                )));
            }
            Some(existing) => {
                return Err(DeployError::lock_held(
                    existing.holder,
                    existing.pid,
                    existing.started_at,
                ));
            }
            None => {
                diagnostics.warn(Warning::stale_lock(format!(
                    "Lock info at {} unreadable, breaking lock",
                    path.display()
                )));
            }
        }

        tracing::debug!("Removing stale/forced lock at {}", path.display());
        if let Err(e) = std::fs::remove_file(&path) {
            if e.kind() != ErrorKind::NotFound {
                return Err(DeployError::lock_error(format!(
                    "failed to remove {}: {e}",
                    path.display()
                )));
            }
        }

        if !Self::try_create(&path, &lock_json)? {
            return Err(DeployError::lock_error(
                "lock acquired by another process during break".to_string(),
            ));
        }
        Ok(Self::held(path))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Release the lock.
    pub fn release(mut self) -> Result<(), DeployError> {
        self.released = true;
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(DeployError::lock_error(format!(
                "failed to remove {}: {e}",
                self.path.display()
            ))),
        }
    }

    fn held(path: PathBuf) -> Self {
        tracing::debug!("acquired deploy lock {}", path.display());
        Self {
            path,
            released: false,
        }
    }

    /// `Ok(false)` when the file already exists.
    fn try_create(path: &Path, contents: &str) -> Result<bool, DeployError> {
        let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => return Ok(false),
            Err(e) => {
                return Err(DeployError::lock_error(format!(
                    "failed to create {}: {e}",
                    path.display()
                )));
            }
        };
        file.write_all(contents.as_bytes())
            .map_err(|e| DeployError::lock_error(format!("failed to write lock: {e}")))?;
        Ok(true)
    }

    fn read_existing(path: &Path) -> Option<LockInfo> {
        let contents = std::fs::read_to_string(path).ok()?;
        serde_json::from_str(&contents).ok()
    }
}

impl Drop for DeployLock {
    fn drop(&mut self) {
        if !self.released {
            let _ = std::fs::remove_file(&self.path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lock_info_creates_with_current_host_and_pid() {
        let info = LockInfo::new(Path::new("/srv/app/releaser.yml"));

        assert_eq!(info.config, "/srv/app/releaser.yml");
        assert_eq!(info.pid, std::process::id());
        assert!(!info.holder.is_empty());
    }

    #[test]
    fn lock_path_is_beside_config() {
        assert_eq!(
            LockInfo::lock_path(Path::new("/srv/app/releaser.yml")),
            PathBuf::from("/srv/app/.releaser.lock")
        );
        assert_eq!(
            LockInfo::lock_path(Path::new("releaser.yml")),
            PathBuf::from(".releaser.lock")
        );
    }

    #[test]
    fn fresh_lock_is_not_stale() {
        let info = LockInfo::new(Path::new("releaser.yml"));
        assert!(!info.is_stale());
    }

    #[test]
    fn old_lock_is_stale() {
        let mut info = LockInfo::new(Path::new("releaser.yml"));
        // Set to 2 hours ago
        info.started_at = Utc::now() - chrono::Duration::hours(2);
        assert!(info.is_stale());
    }
}
