// ABOUTME: Version-control refs a deploy can check out.
// ABOUTME: Validates `remote/branch` strings before any git command runs.

use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GitRefError {
    #[error("tag name cannot be empty")]
    EmptyTag,

    #[error("invalid remote branch '{0}': expected <remote>/<branch>")]
    MalformedBranch(String),
}

/// A validated ref to check out in the repository checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitRef {
    /// A tag, checked out directly.
    Tag(String),
    /// A remote branch, pulled from its remote.
    Branch { remote: String, branch: String },
    /// The configured default branch.
    Default,
}

impl GitRef {
    pub fn tag(name: &str) -> Result<Self, GitRefError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(GitRefError::EmptyTag);
        }
        Ok(GitRef::Tag(name.to_string()))
    }

    /// Parse `remote/branch`. The split happens at the first `/`, so
    /// `origin/feature/login` names branch `feature/login` on `origin`.
    pub fn remote_branch(value: &str) -> Result<Self, GitRefError> {
        let value = value.trim();
        let value = value.strip_prefix("remotes/").unwrap_or(value);
        match value.split_once('/') {
            Some((remote, branch)) if !remote.is_empty() && !branch.is_empty() => {
                Ok(GitRef::Branch {
                    remote: remote.to_string(),
                    branch: branch.to_string(),
                })
            }
            _ => Err(GitRefError::MalformedBranch(value.to_string())),
        }
    }
}

impl fmt::Display for GitRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GitRef::Tag(tag) => write!(f, "tag {tag}"),
            GitRef::Branch { remote, branch } => write!(f, "branch {remote}/{branch}"),
            GitRef::Default => write!(f, "default branch"),
        }
    }
}

/// Unvalidated ref request as supplied by the operator.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RefSelection {
    Tag(String),
    Branch(String),
    #[default]
    Default,
}

impl RefSelection {
    pub fn resolve(&self) -> Result<GitRef, GitRefError> {
        match self {
            RefSelection::Tag(tag) => GitRef::tag(tag),
            RefSelection::Branch(branch) => GitRef::remote_branch(branch),
            RefSelection::Default => Ok(GitRef::Default),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_remote_and_branch() {
        assert_eq!(
            GitRef::remote_branch("origin/main").unwrap(),
            GitRef::Branch {
                remote: "origin".to_string(),
                branch: "main".to_string()
            }
        );
    }

    #[test]
    fn keeps_slashes_in_branch_name() {
        assert_eq!(
            GitRef::remote_branch("upstream/feature/login").unwrap(),
            GitRef::Branch {
                remote: "upstream".to_string(),
                branch: "feature/login".to_string()
            }
        );
    }

    #[test]
    fn strips_remotes_prefix_from_branch_listing() {
        assert_eq!(
            GitRef::remote_branch("remotes/origin/dev").unwrap(),
            GitRef::Branch {
                remote: "origin".to_string(),
                branch: "dev".to_string()
            }
        );
    }

    #[test]
    fn rejects_missing_segments() {
        for bad in ["origin", "origin/", "/main", ""] {
            assert!(
                matches!(GitRef::remote_branch(bad), Err(GitRefError::MalformedBranch(_))),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn rejects_blank_tag() {
        assert_eq!(GitRef::tag("  "), Err(GitRefError::EmptyTag));
        assert_eq!(GitRef::tag("v1.2.0").unwrap(), GitRef::Tag("v1.2.0".to_string()));
    }

    #[test]
    fn selection_defaults_to_default_branch() {
        assert_eq!(RefSelection::default().resolve().unwrap(), GitRef::Default);
    }
}
