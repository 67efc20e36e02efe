// ABOUTME: Config scaffolding for new deploy targets.
// ABOUTME: Writes a releaser.yml template and creates the release directory layout.

use std::path::{Path, PathBuf};

use crate::deploy::DirectoryStructure;
use crate::error::{Error, Result};

use super::{CONFIG_FILENAME, Config, ConfigStore};

/// Write a template into `dir` and create the repo, releases, and shared
/// directories it points at. Returns the written document path.
pub fn init_config(
    dir: &Path,
    root: Option<&Path>,
    repo_url: Option<&str>,
    force: bool,
) -> Result<PathBuf> {
    let config_path = dir.join(CONFIG_FILENAME);

    if config_path.exists() && !force {
        return Err(Error::AlreadyExists(config_path));
    }

    let yaml = generate_template_yaml(root, repo_url);
    // The template must load cleanly before it is written.
    let config = Config::from_yaml(&yaml)?;
    std::fs::write(&config_path, yaml)?;

    let store = ConfigStore::new(&config_path, config);
    DirectoryStructure::new(store.paths()).create()?;

    Ok(config_path)
}

fn generate_template_yaml(root: Option<&Path>, repo_url: Option<&str>) -> String {
    let root_line = match root {
        Some(root) => format!("  root: {}\n", yaml_string(&root.to_string_lossy())),
        None => "  # root: /var/www/app   (defaults to this directory)\n".to_string(),
    };
    let repo_line = match repo_url {
        Some(url) => format!("  repo: {}\n", yaml_string(url)),
        None => "  # repo: git@github.com:org/app.git\n".to_string(),
    };

    format!(
        r#"environment:
  name: prod
  max_releases: 5
  use_sudo: false
  process_timeout: 120s

paths:
{root_line}  # repo, releases and shared default to <root>/repo, <root>/releases, <root>/shared

git:
{repo_line}  remote: origin
  branch: master
  # tag_filter: "v*"

# Files kept across releases, symlinked into each release from the shared root
shared: []

# Files deleted from each release after it is copied
remove: []

chown:
  pre:
    # group: deploy
    paths: []
  post:
    # group: www-data
    paths: []

chmod:
  pre:
    # permission: "775"
    paths: []
  post:
    # permission: "755"
    paths: []

# Extension hooks per slot: doctrine-migrations, composer-install, script:<path>
processes:
  deploy: {{ pre: [], post: [] }}
  rollback: {{ pre: [], post: [] }}
  live: {{ pre: [], post: [] }}
  cleanup: {{ pre: [], post: [] }}
"#
    )
}

/// Quote a scalar for YAML using JSON string syntax, which YAML accepts.
fn yaml_string(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| format!("'{}'", value.replace('\'', "''")))
}
