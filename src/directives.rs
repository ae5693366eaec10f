//! The resolved, typed input to session orchestration.
//!
//! A `DirectiveSet` is produced once by argument resolution and is read-only
//! for the rest of the run; the orchestrator mutates only the console it
//! drives, never the directives.

use crate::error::DirectiveError;
use crate::flags::FeatureToggles;
use std::fs;
use std::path::{Path, PathBuf};

/// One `NAME=VALUE` option assignment, in resolution order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionAssignment {
    pub name: String,
    pub value: String,
}

impl OptionAssignment {
    /// Parse a raw `NAME=VALUE` argument.
    pub fn parse(raw: &str) -> Result<Self, DirectiveError> {
        match raw.split_once('=') {
            Some((name, value)) if !name.trim().is_empty() => Ok(Self {
                name: name.trim().to_string(),
                value: value.to_string(),
            }),
            _ => Err(DirectiveError::MalformedOption(raw.to_string())),
        }
    }

    /// The space-joined `NAME VALUE` form the console's option setter takes.
    pub fn to_spec(&self) -> String {
        format!("{} {}", self.name, self.value)
    }
}

/// Immutable directive set driving one orchestrator run.
#[derive(Debug, Clone, Default)]
pub struct DirectiveSet {
    /// Workspace to create/load.
    pub workspace: Option<String>,
    /// Commands run in the global context, in order, before any module load.
    pub global_commands: Vec<String>,
    /// Commands run in the loaded module's context, pre-run.
    pub module_commands: Vec<String>,
    /// Option assignments applied to the global context, in order.
    pub global_options: Vec<OptionAssignment>,
    /// Option assignments applied to the module context, in order.
    pub module_options: Vec<OptionAssignment>,
    /// Module path to load.
    pub module: Option<String>,
    /// Invoke the loaded module's run action.
    pub run_module: bool,
    /// Display global options and exit.
    pub show_global_options: bool,
    /// Display the module list and exit.
    pub show_modules: bool,
    /// Display the loaded module's options and exit.
    pub show_module_options: bool,
    /// Validated script file to execute against the global context.
    pub script_file: Option<PathBuf>,
    /// Feature toggles prior to stealth reconciliation.
    pub toggles: FeatureToggles,
    /// Stealth override: force off everything that phones home.
    pub stealth: bool,
    /// Optional log file to attach as a secondary sink.
    pub log_file: Option<PathBuf>,
}

/// Validate a script path at resolution time: it must exist, be a regular
/// file, and be non-empty. The orchestrator assumes these all hold.
pub fn validate_script_path(path: &Path) -> Result<PathBuf, DirectiveError> {
    let meta = fs::metadata(path).map_err(|e| DirectiveError::ScriptFile {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    if !meta.is_file() {
        return Err(DirectiveError::ScriptFile {
            path: path.to_path_buf(),
            reason: "not a regular file".to_string(),
        });
    }
    if meta.len() == 0 {
        return Err(DirectiveError::ScriptFile {
            path: path.to_path_buf(),
            reason: "file is empty".to_string(),
        });
    }
    Ok(path.to_path_buf())
}
