// ABOUTME: Deployment stages and the pipeline that sequences them.
// ABOUTME: Exports each stage component, the lock, rollback, and the error taxonomy.

mod cleanup;
mod error;
mod fetch;
mod lock;
mod materialize;
mod permissions;
mod pipeline;
mod promote;
mod prune;
mod rollback;
mod shared;
mod state;
mod structure;

pub use cleanup::ReleaseCleaner;
pub(crate) use error::StorageContext;
pub use error::{DeployError, DeployErrorKind, LockHolderInfo, PipelineFailure};
pub use fetch::{SourceFetcher, TAG_LIST_LIMIT};
pub use lock::{DeployLock, LOCK_FILENAME, LockInfo};
pub use materialize::ReleaseMaterializer;
pub use permissions::PermissionApplier;
pub use pipeline::{DeployPipeline, DeployReport, RefChooser, RefRequest};
pub use promote::LivePromoter;
pub use prune::Pruner;
pub use rollback::{
    ReleaseChooser, Rollback, RollbackOutcome, RollbackTarget, rollback_candidates,
};
pub use shared::SharedLinker;
pub use state::PipelineState;
pub use structure::DirectoryStructure;
