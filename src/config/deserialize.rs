// ABOUTME: Custom serde deserializers and validators for config types.
// ABOUTME: Handles the retention count and release-relative path lists.

use serde::Deserialize;
use std::num::NonZeroUsize;
use std::path::{Component, Path};

pub fn deserialize_max_releases<'de, D>(deserializer: D) -> Result<NonZeroUsize, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = usize::deserialize(deserializer)?;
    NonZeroUsize::new(value)
        .ok_or_else(|| serde::de::Error::custom("max_releases must be at least 1"))
}

/// Check that `path` stays inside the directory it is joined onto.
pub fn validate_relative(section: &str, path: &str) -> Result<(), String> {
    if path.trim().is_empty() {
        return Err(format!("{section}: path cannot be empty"));
    }

    let parsed = Path::new(path);
    let mut named = false;
    for component in parsed.components() {
        match component {
            Component::Normal(_) => named = true,
            Component::CurDir => {}
            Component::ParentDir => {
                return Err(format!("{section}: path '{path}' cannot contain '..'"));
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(format!("{section}: path '{path}' must be relative"));
            }
        }
    }
    // "." would resolve to the release directory itself.
    if !named {
        return Err(format!("{section}: path '{path}' must name an entry"));
    }
    Ok(())
}
