// ABOUTME: Version-control section of the settings document.
// ABOUTME: Remote URL and name, default branch, and the tag listing filter.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitConfig {
    /// URL registered as the remote of the checkout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo: Option<String>,

    #[serde(default = "default_remote")]
    pub remote: String,

    /// Branch checked out when no tag or remote branch is selected.
    #[serde(default = "default_branch")]
    pub branch: String,

    /// Glob passed to `git tag -l` when offering tags.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_filter: Option<String>,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            repo: None,
            remote: default_remote(),
            branch: default_branch(),
            tag_filter: None,
        }
    }
}

fn default_remote() -> String {
    "origin".to_string()
}

fn default_branch() -> String {
    "master".to_string()
}
