// ABOUTME: Diagnostics accumulator for non-fatal warnings during a run.
// ABOUTME: Collects warnings that shouldn't fail a deploy but should be shown before the banner.

/// Collects non-fatal warnings during deploy and rollback.
#[derive(Debug, Default)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    /// Record a warning, auto-logging it via tracing.
    pub fn warn(&mut self, warning: Warning) {
        tracing::warn!("{}", warning.message);
        self.warnings.push(warning);
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Move every collected warning into `other`.
    pub fn drain_into(&mut self, other: &mut Diagnostics) {
        other.warnings.append(&mut self.warnings);
    }
}

/// A non-fatal warning.
#[derive(Debug, Clone)]
pub struct Warning {
    pub kind: WarningKind,
    pub message: String,
}

impl Warning {
    pub fn lock_release(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::LockRelease,
            message: message.into(),
        }
    }

    pub fn stale_lock(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::StaleLock,
            message: message.into(),
        }
    }

    pub fn staging_cleanup(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::StagingCleanup,
            message: message.into(),
        }
    }

    pub fn live_mismatch(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::LiveMismatch,
            message: message.into(),
        }
    }
}

/// Categories of warnings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    /// Failed to remove the deploy lock file (it may remain).
    LockRelease,
    /// An existing lock was broken because it was stale or forced.
    StaleLock,
    /// A leftover staging directory or temp link could not be removed.
    StagingCleanup,
    /// The live alias does not point at the current pointer's release.
    LiveMismatch,
}
