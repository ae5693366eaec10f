//! Workspace directories and per-workspace option persistence.
//!
//! Workspaces live under `<home>/workspaces/<name>/`; explicitly assigned
//! global options are stored per workspace as `options.toml` so selecting a
//! workspace restores its configuration.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Subdirectory of the engine home holding workspaces.
pub const WORKSPACES_DIR: &str = "workspaces";
/// Workspace used when none is named.
pub const DEFAULT_WORKSPACE: &str = "default";

const OPTIONS_FILE: &str = "options.toml";

/// Directory of one workspace.
pub fn workspace_dir(home: &Path, name: &str) -> PathBuf {
    home.join(WORKSPACES_DIR).join(name)
}

/// Workspace names are path components; keep them boring.
pub fn validate_name(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("workspace name cannot be empty".to_string());
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(format!(
            "invalid workspace name `{name}`: use letters, digits, `-` and `_`"
        ));
    }
    Ok(())
}

/// Create (if needed) the named workspace and return its directory.
pub fn init(home: &Path, name: &str) -> Result<PathBuf, String> {
    validate_name(name)?;
    let dir = workspace_dir(home, name);
    fs::create_dir_all(&dir).map_err(|e| format!("failed to create workspace {name}: {e}"))?;
    Ok(dir)
}

/// Names of all existing workspaces, sorted.
pub fn list(home: &Path) -> io::Result<Vec<String>> {
    let root = home.join(WORKSPACES_DIR);
    let mut names = Vec::new();
    match fs::read_dir(&root) {
        Ok(entries) => {
            for entry in entries {
                let entry = entry?;
                if entry.file_type()?.is_dir() {
                    if let Some(name) = entry.file_name().to_str() {
                        names.push(name.to_string());
                    }
                }
            }
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(e),
    }
    names.sort();
    Ok(names)
}

/// Load the workspace's persisted option assignments (absent file → empty).
pub fn load_saved_options(home: &Path, name: &str) -> Result<BTreeMap<String, String>, String> {
    let path = workspace_dir(home, name).join(OPTIONS_FILE);
    let text = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
        Err(e) => return Err(format!("failed to read {}: {e}", path.display())),
    };
    toml::from_str(&text).map_err(|e| format!("failed to parse {}: {e}", path.display()))
}

/// Persist the workspace's option assignments.
pub fn store_options(
    home: &Path,
    name: &str,
    options: &BTreeMap<String, String>,
) -> Result<(), String> {
    let dir = init(home, name)?;
    let path = dir.join(OPTIONS_FILE);
    let text = toml::to_string(options).map_err(|e| format!("failed to encode options: {e}"))?;
    fs::write(&path, text).map_err(|e| format!("failed to write {}: {e}", path.display()))
}
