// ABOUTME: Extension hook names bound to each pipeline slot.
// ABOUTME: Lookup is an exhaustive match over stage and phase.

use serde::{Deserialize, Serialize};

use crate::hooks::HookStage;
use crate::types::Phase;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookNames {
    #[serde(default)]
    pub pre: Vec<String>,
    #[serde(default)]
    pub post: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessesConfig {
    #[serde(default)]
    pub deploy: HookNames,
    #[serde(default)]
    pub rollback: HookNames,
    #[serde(default)]
    pub live: HookNames,
    #[serde(default)]
    pub cleanup: HookNames,
}

impl ProcessesConfig {
    /// Hook names configured for one slot, in execution order.
    pub fn hooks(&self, stage: HookStage, phase: Phase) -> &[String] {
        let names = match stage {
            HookStage::Deploy => &self.deploy,
            HookStage::Rollback => &self.rollback,
            HookStage::Live => &self.live,
            HookStage::Cleanup => &self.cleanup,
        };
        match phase {
            Phase::Pre => &names.pre,
            Phase::Post => &names.post,
        }
    }
}
