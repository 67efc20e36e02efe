// ABOUTME: Owner of the loaded settings document and its single mutation.
// ABOUTME: CurrentPointer changes go to the state file at pipeline checkpoints.

use std::path::{Path, PathBuf};

use super::{Config, DeployPaths, ReleaseState};
use crate::deploy::DeployError;
use crate::error::Result;
use crate::types::ReleaseId;

/// Settings document loaded once per run, plus the run state beside it.
///
/// Components read through [`config`](ConfigStore::config); the only write
/// is [`set_current`](ConfigStore::set_current) followed by
/// [`persist`](ConfigStore::persist). Persisting touches the state file
/// only, never the operator's document.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
    base_dir: PathBuf,
    config: Config,
    state_path: PathBuf,
    state: ReleaseState,
}

impl ConfigStore {
    pub fn open(path: &Path) -> Result<Self> {
        let config = Config::load(path)?;
        let mut store = Self::new(path, config);
        store.state = ReleaseState::load(&store.state_path)?;
        Ok(store)
    }

    pub fn new(path: &Path, config: Config) -> Self {
        Self {
            base_dir: base_dir_for(path),
            path: path.to_path_buf(),
            config,
            state_path: ReleaseState::path_for(path),
            state: ReleaseState::default(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory relative paths and the default root resolve against.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn paths(&self) -> DeployPaths {
        DeployPaths::resolve(&self.config.paths, &self.base_dir)
    }

    pub fn state_path(&self) -> &Path {
        &self.state_path
    }

    /// The state file wins; a `current` key in the document seeds it.
    pub fn current(&self) -> Option<&ReleaseId> {
        self.state
            .current
            .as_ref()
            .or(self.config.current.as_ref())
    }

    pub fn set_current(&mut self, id: ReleaseId) {
        tracing::debug!("current release -> {}", id);
        self.state.current = Some(id);
    }

    pub fn persist(&self) -> std::result::Result<(), DeployError> {
        self.state.save(&self.state_path)
    }
}

/// The directory holding the document, or the project directory when the
/// document lives in `.releaser/`.
fn base_dir_for(path: &Path) -> PathBuf {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    if parent.file_name().is_some_and(|n| n == ".releaser") {
        return parent
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
    }
    parent
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_dir_is_document_directory() {
        assert_eq!(
            base_dir_for(Path::new("/srv/app/releaser.yml")),
            PathBuf::from("/srv/app")
        );
        assert_eq!(base_dir_for(Path::new("releaser.yml")), PathBuf::from("."));
    }

    #[test]
    fn hidden_config_dir_resolves_to_project() {
        assert_eq!(
            base_dir_for(Path::new("/srv/app/.releaser/config.yml")),
            PathBuf::from("/srv/app")
        );
    }

    #[test]
    fn persist_round_trips_current_pointer() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("releaser.yml");
        std::fs::write(&path, "environment:\n  max_releases: 3\n").unwrap();

        let mut store = ConfigStore::open(&path).unwrap();
        let id = ReleaseId::new("2024-01-02-03-04-05").unwrap();
        store.set_current(id.clone());
        store.persist().unwrap();

        let reloaded = ConfigStore::open(&path).unwrap();
        assert_eq!(reloaded.current(), Some(&id));
        assert_eq!(reloaded.config().environment.max_releases.get(), 3);
        assert!(dir.path().join(".releaser.state.yml").is_file());
    }

    #[test]
    fn state_file_overrides_document_pointer() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("releaser.yml");
        std::fs::write(&path, "current: 2024-01-01-00-00-00\n").unwrap();

        let mut store = ConfigStore::open(&path).unwrap();
        assert_eq!(store.current().unwrap().as_str(), "2024-01-01-00-00-00");

        store.set_current(ReleaseId::new("2024-02-01-00-00-00").unwrap());
        store.persist().unwrap();
        let reloaded = ConfigStore::open(&path).unwrap();
        assert_eq!(reloaded.current().unwrap().as_str(), "2024-02-01-00-00-00");
    }
}
