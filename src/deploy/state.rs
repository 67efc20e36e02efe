// ABOUTME: States of the deploy pipeline, in the order they are reached.
// ABOUTME: A failed run reports the last state it completed.

use std::fmt;

use crate::hooks::HookSlot;

/// Progress marker for one deploy run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Init,
    Locked,
    ConfigLoaded,
    DirectoryStructureVerified,
    /// Every hook of the slot has executed.
    HookSlotDone(HookSlot),
    Fetched,
    Materialized,
    PermissionsPre,
    SharedLinked,
    Pruned,
    StaleReleasesRemoved,
    PermissionsPost,
    Promoted,
    Complete,
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineState::Init => f.write_str("Init"),
            PipelineState::Locked => f.write_str("Locked"),
            PipelineState::ConfigLoaded => f.write_str("ConfigLoaded"),
            PipelineState::DirectoryStructureVerified => {
                f.write_str("DirectoryStructureVerified")
            }
            PipelineState::HookSlotDone(slot) => write!(f, "Hook:{slot}"),
            PipelineState::Fetched => f.write_str("Fetched"),
            PipelineState::Materialized => f.write_str("Materialized"),
            PipelineState::PermissionsPre => f.write_str("PermissionsPre"),
            PipelineState::SharedLinked => f.write_str("SharedLinked"),
            PipelineState::Pruned => f.write_str("Pruned"),
            PipelineState::StaleReleasesRemoved => f.write_str("StaleReleasesRemoved"),
            PipelineState::PermissionsPost => f.write_str("PermissionsPost"),
            PipelineState::Promoted => f.write_str("Promoted"),
            PipelineState::Complete => f.write_str("Complete"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::HookStage;
    use crate::types::Phase;

    #[test]
    fn hook_states_name_their_slot() {
        let state = PipelineState::HookSlotDone(HookSlot::new(HookStage::Live, Phase::Pre));
        assert_eq!(state.to_string(), "Hook:live/pre");
        assert_eq!(PipelineState::Promoted.to_string(), "Promoted");
    }
}
