// ABOUTME: Validated domain types shared across the crate.
// ABOUTME: Release identifiers, version-control refs, and the pre/post phase marker.

mod git_ref;
mod phase;
mod release_id;

pub use git_ref::{GitRef, GitRefError, RefSelection};
pub use phase::Phase;
pub use release_id::{RELEASE_ID_FORMAT, ReleaseId, ReleaseIdError};
