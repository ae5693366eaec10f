//! The bundled console engine.
//!
//! `Engine` implements the [`Framework`] capability surface over an
//! on-disk home directory (`$LOOKOUT_HOME`, defaulting to `~/.lookout`):
//! global options, workspaces, installed-module manifests, and the
//! interactive command dispatch. Reconnaissance collection itself is not
//! part of the engine; embedders bind behavior to module paths through
//! [`ModuleRunner`] registrations.

pub mod banner;
mod console;
pub mod modules;
pub mod options;
pub mod workspace;

pub use console::Console;
pub use modules::{ModuleRun, ModuleRunner};

use crate::context::{ConsoleContext, Framework, FrameworkInfo};
use crate::error::ContextError;
use crate::flags::ReconciledFlags;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Environment variable selecting a custom home directory.
pub const HOME_ENV: &str = "LOOKOUT_HOME";
/// Default home directory name under `$HOME`.
pub const DEFAULT_HOME_DIR: &str = ".lookout";
/// Optional engine manifest inside the home directory.
const MANIFEST_FILE: &str = "engine.toml";

/// Installation metadata, read from `<home>/engine.toml` when present.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineManifest {
    /// Installed framework version.
    pub version: String,
    /// Whether sessions must run with elevated privileges.
    pub requires_elevated: bool,
    /// Endpoint returning the latest released version as plain text.
    pub update_url: Option<String>,
    /// Endpoint receiving the anonymous launch ping.
    pub telemetry_url: Option<String>,
    /// Endpoint returning the remote module index as JSON.
    pub index_url: Option<String>,
}

impl Default for EngineManifest {
    fn default() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            requires_elevated: false,
            update_url: None,
            telemetry_url: None,
            index_url: None,
        }
    }
}

/// Framework handle over one home directory.
pub struct Engine {
    home: PathBuf,
    runners: BTreeMap<String, Rc<dyn ModuleRunner>>,
}

impl Engine {
    /// Locate the engine home: `$LOOKOUT_HOME`, else `~/.lookout`.
    pub fn discover() -> Result<Self, ContextError> {
        if let Some(custom) = env::var_os(HOME_ENV) {
            return Ok(Self::with_home(PathBuf::from(custom)));
        }
        dirs::home_dir()
            .map(|home| Self::with_home(home.join(DEFAULT_HOME_DIR)))
            .ok_or_else(|| ContextError::failed("could not determine a home directory"))
    }

    /// Use an explicit home directory.
    pub fn with_home(home: impl AsRef<Path>) -> Self {
        Self {
            home: home.as_ref().to_path_buf(),
            runners: BTreeMap::new(),
        }
    }

    /// Engine home directory.
    pub fn home(&self) -> &Path {
        &self.home
    }

    /// Command-history file inside the home directory.
    pub fn history_path(&self) -> PathBuf {
        self.home.join("history")
    }

    /// Bind run behavior to a module path.
    pub fn register_runner(&mut self, module: &str, runner: Rc<dyn ModuleRunner>) {
        self.runners.insert(module.to_string(), runner);
    }

    fn load_manifest(&self) -> Result<EngineManifest, ContextError> {
        let path = self.home.join(MANIFEST_FILE);
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Ok(EngineManifest::default())
            }
            Err(e) => {
                return Err(ContextError::failed(format!(
                    "failed to read {}: {e}",
                    path.display()
                )))
            }
        };
        toml::from_str(&text).map_err(|e| {
            ContextError::failed(format!("failed to parse {}: {e}", path.display()))
        })
    }
}

impl Framework for Engine {
    fn probe(&self) -> Result<FrameworkInfo, ContextError> {
        if self.home.exists() && !self.home.is_dir() {
            return Err(ContextError::failed(format!(
                "home path {} is not a directory",
                self.home.display()
            )));
        }
        let manifest = self.load_manifest()?;
        Ok(FrameworkInfo {
            version: manifest.version,
            requires_elevated: manifest.requires_elevated,
        })
    }

    fn construct(&self, flags: ReconciledFlags) -> Result<Box<dyn ConsoleContext>, ContextError> {
        let manifest = self.load_manifest()?;
        Ok(Box::new(Console::new(
            self.home.clone(),
            flags,
            manifest,
            self.runners.clone(),
        )))
    }
}
