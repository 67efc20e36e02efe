// ABOUTME: Retention policy selecting releases beyond the keep window.
// ABOUTME: Protected releases are never selected, whatever their position.

use std::num::NonZeroUsize;

use crate::types::ReleaseId;

/// How many releases to keep on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionPolicy {
    pub max_releases: NonZeroUsize,
}

impl RetentionPolicy {
    pub fn new(max_releases: NonZeroUsize) -> Self {
        Self { max_releases }
    }
}

/// Pick stale entries from a newest-first list.
///
/// The first `max_releases` are kept; of the rest, anything in `protect`
/// is kept as well. Output preserves input order.
pub fn stale_among<'a, T, F>(
    newest_first: &'a [T],
    policy: RetentionPolicy,
    protect: &[ReleaseId],
    id_of: F,
) -> Vec<&'a T>
where
    F: Fn(&T) -> &ReleaseId,
{
    newest_first
        .iter()
        .skip(policy.max_releases.get())
        .filter(|item| !protect.contains(id_of(item)))
        .collect()
}
