// ABOUTME: Ownership and mode rule sets applied to release paths.
// ABOUTME: One chown and one chmod rule per phase, four rule sets in total.

use serde::{Deserialize, Serialize};

use crate::types::Phase;

/// Ownership change for a set of release-relative paths.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChownRule {
    /// Owner argument passed to `chown` (e.g. `www-data` or `deploy:www-data`).
    /// No command is issued while unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,

    #[serde(default)]
    pub paths: Vec<String>,
}

/// Mode change for a set of release-relative paths.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChmodRule {
    /// Mode argument passed to `chmod` (e.g. `775` or `g+w`).
    /// No command is issued while unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permission: Option<String>,

    #[serde(default)]
    pub paths: Vec<String>,
}

/// A rule per phase.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseRules<T> {
    #[serde(default)]
    pub pre: T,
    #[serde(default)]
    pub post: T,
}

impl<T> PhaseRules<T> {
    pub fn get(&self, phase: Phase) -> &T {
        match phase {
            Phase::Pre => &self.pre,
            Phase::Post => &self.post,
        }
    }
}

/// A single ownership or mode change derived from a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionChange<'a> {
    Owner(&'a str),
    Mode(&'a str),
}

impl ChownRule {
    pub fn change(&self) -> Option<PermissionChange<'_>> {
        self.group.as_deref().map(PermissionChange::Owner)
    }
}

impl ChmodRule {
    pub fn change(&self) -> Option<PermissionChange<'_>> {
        self.permission.as_deref().map(PermissionChange::Mode)
    }
}
