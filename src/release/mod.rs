// ABOUTME: Release directory model: timestamp-keyed directories under the releases root.
// ABOUTME: Listing, lookup, and retention selection of stale releases.

mod retention;
mod store;

pub use retention::{RetentionPolicy, stale_among};
pub use store::ReleaseStore;

use std::path::{Path, PathBuf};

use crate::types::ReleaseId;

/// One materialized release on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Release {
    id: ReleaseId,
    path: PathBuf,
}

impl Release {
    pub fn new(id: ReleaseId, path: PathBuf) -> Self {
        Self { id, path }
    }

    pub fn id(&self) -> &ReleaseId {
        &self.id
    }

    /// Absolute directory, ending with a separator.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `path` joined with a relative entry.
    pub fn join(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.path.join(relative)
    }
}
