//! Installed-module manifests, search/resolution, and the run seam.
//!
//! A module is a TOML manifest under `<home>/modules/` declaring its
//! canonical path, metadata, and options. Collection logic itself is bound
//! by embedders through [`ModuleRunner`] registrations; the console
//! validates options and dispatches, nothing more.

use crate::engine::options::OptionRegistry;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Subdirectory of the engine home holding module manifests.
pub const MODULES_DIR: &str = "modules";
/// Cached remote module index (refreshed when marketplace is enabled).
pub const REMOTE_INDEX_FILE: &str = "modules.index.json";

/// One option declared by a module manifest.
#[derive(Debug, Clone, Deserialize)]
pub struct ModuleOptionSpec {
    pub name: String,
    pub value: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub description: String,
}

/// Parsed module manifest.
#[derive(Debug, Clone, Deserialize)]
pub struct ModuleManifest {
    /// Canonical module path, e.g. `recon/domains-hosts/resolve`.
    pub path: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub options: Vec<ModuleOptionSpec>,
}

impl ModuleManifest {
    /// Build the module's option registry from its declarations.
    pub fn option_registry(&self) -> OptionRegistry {
        let mut registry = OptionRegistry::new();
        for spec in &self.options {
            registry.register(
                &spec.name,
                spec.value.as_deref(),
                spec.required,
                &spec.description,
            );
        }
        registry
    }

    /// Leading path segment, used for banner counts.
    pub fn category(&self) -> &str {
        self.path.split('/').next().unwrap_or(&self.path)
    }
}

/// Entry of the cached remote index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteModule {
    pub path: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub description: String,
}

/// Outcome of resolving a user-supplied module query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Found(String),
    NotFound,
    Ambiguous(Vec<String>),
}

/// Installed modules plus the cached remote index.
#[derive(Debug, Clone, Default)]
pub struct ModuleIndex {
    installed: BTreeMap<String, ModuleManifest>,
    available: Vec<RemoteModule>,
}

impl ModuleIndex {
    /// Scan `<home>/modules/` for manifests and load the remote cache.
    pub fn load(home: &Path) -> Self {
        let mut index = Self::default();
        let root = home.join(MODULES_DIR);
        index.scan_dir(&root);
        index.load_remote_cache(&home.join(REMOTE_INDEX_FILE));
        index
    }

    fn scan_dir(&mut self, dir: &Path) {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return,
            Err(e) => {
                tracing::debug!(dir = %dir.display(), error = %e, "module scan failed");
                return;
            }
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                self.scan_dir(&path);
            } else if path.extension().is_some_and(|ext| ext == "toml") {
                self.load_manifest(&path);
            }
        }
    }

    fn load_manifest(&mut self, path: &Path) {
        let parsed = fs::read_to_string(path)
            .map_err(|e| e.to_string())
            .and_then(|text| toml::from_str::<ModuleManifest>(&text).map_err(|e| e.to_string()));
        match parsed {
            Ok(manifest) => {
                self.installed.insert(manifest.path.clone(), manifest);
            }
            Err(e) => {
                tracing::warn!(manifest = %path.display(), error = %e, "skipping unreadable module manifest");
            }
        }
    }

    fn load_remote_cache(&mut self, path: &Path) {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(_) => return,
        };
        match serde_json::from_str::<Vec<RemoteModule>>(&text) {
            Ok(remote) => self.available = remote,
            Err(e) => tracing::debug!(error = %e, "ignoring malformed remote index cache"),
        }
    }

    /// Replace and persist the remote index cache.
    pub fn store_remote_cache(&mut self, home: &Path, remote: Vec<RemoteModule>) -> io::Result<()> {
        let text = serde_json::to_string_pretty(&remote)?;
        fs::write(home.join(REMOTE_INDEX_FILE), text)?;
        self.available = remote;
        Ok(())
    }

    /// Installed manifest for an exact path.
    pub fn get(&self, path: &str) -> Option<&ModuleManifest> {
        self.installed.get(path)
    }

    /// Installed module paths containing `filter` (empty matches all).
    pub fn search(&self, filter: &str) -> Vec<&ModuleManifest> {
        self.installed
            .values()
            .filter(|m| m.path.contains(filter))
            .collect()
    }

    /// Remote-index entries not installed locally, matching `filter`.
    pub fn search_available(&self, filter: &str) -> Vec<&RemoteModule> {
        self.available
            .iter()
            .filter(|m| m.path.contains(filter) && !self.installed.contains_key(m.path.as_str()))
            .collect()
    }

    /// Resolve a query to an installed path: exact match first, then a
    /// unique partial match.
    pub fn resolve(&self, query: &str) -> Resolution {
        if self.installed.contains_key(query) {
            return Resolution::Found(query.to_string());
        }
        let matches: Vec<&str> = self
            .installed
            .keys()
            .filter(|path| path.contains(query))
            .map(String::as_str)
            .collect();
        match matches.as_slice() {
            [] => Resolution::NotFound,
            [only] => Resolution::Found((*only).to_string()),
            many => Resolution::Ambiguous(many.iter().map(|s| s.to_string()).collect()),
        }
    }

    /// Installed module count per leading category, sorted by count
    /// descending then name.
    pub fn category_counts(&self) -> Vec<(String, usize)> {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for manifest in self.installed.values() {
            *counts.entry(manifest.category()).or_default() += 1;
        }
        let mut counts: Vec<(String, usize)> = counts
            .into_iter()
            .map(|(name, count)| (name.to_string(), count))
            .collect();
        counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        counts
    }

    /// Number of installed modules.
    pub fn installed_count(&self) -> usize {
        self.installed.len()
    }
}

/// Everything a module run gets to see.
pub struct ModuleRun<'a> {
    /// Canonical module path.
    pub module: &'a str,
    /// Assigned option values (module scope merged over its defaults).
    pub options: BTreeMap<String, String>,
    /// Directory of the active workspace, for module outputs.
    pub workspace_dir: PathBuf,
}

/// Embedder-provided execution behind a loaded module's `run`.
pub trait ModuleRunner {
    fn run(&self, run: &ModuleRun<'_>) -> Result<(), String>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testsupport::TestTempDir;

    fn manifest(path: &str) -> String {
        format!(
            "path = \"{path}\"\nauthor = \"tester\"\nversion = \"1.0\"\n\n[[options]]\nname = \"SOURCE\"\nrequired = true\ndescription = \"input source\"\n"
        )
    }

    fn fixture_with_modules(paths: &[&str]) -> TestTempDir {
        let fixture = TestTempDir::new("modules");
        for (i, path) in paths.iter().enumerate() {
            fixture.write_text(&format!("modules/m{i}.toml"), &manifest(path));
        }
        fixture
    }

    #[test]
    fn scan_finds_nested_manifests() {
        let fixture = TestTempDir::new("modules");
        fixture.write_text(
            "modules/recon/hosts/resolve.toml",
            &manifest("recon/domains-hosts/resolve"),
        );
        let index = ModuleIndex::load(fixture.path());
        assert_eq!(index.installed_count(), 1);
        assert!(index.get("recon/domains-hosts/resolve").is_some());
    }

    #[test]
    fn malformed_manifests_are_skipped() {
        let fixture = TestTempDir::new("modules");
        fixture.write_text("modules/good.toml", &manifest("recon/good"));
        fixture.write_text("modules/bad.toml", "path = [broken");
        let index = ModuleIndex::load(fixture.path());
        assert_eq!(index.installed_count(), 1);
    }

    #[test]
    fn resolve_prefers_exact_then_unique_partial() {
        let fixture =
            fixture_with_modules(&["recon/domains-hosts/resolve", "recon/hosts-ports/scan"]);
        let index = ModuleIndex::load(fixture.path());
        assert_eq!(
            index.resolve("recon/domains-hosts/resolve"),
            Resolution::Found("recon/domains-hosts/resolve".to_string())
        );
        assert_eq!(
            index.resolve("scan"),
            Resolution::Found("recon/hosts-ports/scan".to_string())
        );
        assert_eq!(index.resolve("nope"), Resolution::NotFound);
        match index.resolve("recon") {
            Resolution::Ambiguous(paths) => assert_eq!(paths.len(), 2),
            other => panic!("expected ambiguity, got {other:?}"),
        }
    }

    #[test]
    fn search_filters_by_substring() {
        let fixture =
            fixture_with_modules(&["recon/domains-hosts/resolve", "reporting/export"]);
        let index = ModuleIndex::load(fixture.path());
        assert_eq!(index.search("").len(), 2);
        assert_eq!(index.search("reporting").len(), 1);
        assert!(index.search("ghost").is_empty());
    }

    #[test]
    fn manifest_options_build_a_registry() {
        let fixture = fixture_with_modules(&["recon/one"]);
        let index = ModuleIndex::load(fixture.path());
        let registry = index.get("recon/one").unwrap().option_registry();
        assert!(registry.contains("SOURCE"));
        assert_eq!(registry.missing_required(), vec!["SOURCE".to_string()]);
    }

    #[test]
    fn remote_cache_round_trips_and_excludes_installed() {
        let fixture = fixture_with_modules(&["recon/one"]);
        let mut index = ModuleIndex::load(fixture.path());
        index
            .store_remote_cache(
                fixture.path(),
                vec![
                    RemoteModule {
                        path: "recon/one".to_string(),
                        version: "1.1".to_string(),
                        description: String::new(),
                    },
                    RemoteModule {
                        path: "recon/two".to_string(),
                        version: "1.0".to_string(),
                        description: String::new(),
                    },
                ],
            )
            .expect("should store");

        let reloaded = ModuleIndex::load(fixture.path());
        let available = reloaded.search_available("");
        assert_eq!(available.len(), 1);
        assert_eq!(available[0].path, "recon/two");
    }

    #[test]
    fn category_counts_order_by_size() {
        let fixture =
            fixture_with_modules(&["recon/a", "recon/b", "reporting/x"]);
        let index = ModuleIndex::load(fixture.path());
        assert_eq!(
            index.category_counts(),
            vec![("recon".to_string(), 2), ("reporting".to_string(), 1)]
        );
    }
}
