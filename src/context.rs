//! Capability traits for the console the launcher drives.
//!
//! The orchestrator never touches the console implementation directly; it
//! consumes this minimal surface so tests can substitute recording fakes and
//! embedders can bind their own framework.

use crate::error::ContextError;
use crate::flags::ReconciledFlags;
use std::fmt;

/// How the session was launched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionMode {
    /// Interactive console launcher; the banner is shown at startup.
    Console,
    /// Scripted/one-shot CLI launcher.
    Cli,
}

impl fmt::Display for SessionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Console => write!(f, "console"),
            Self::Cli => write!(f, "cli"),
        }
    }
}

/// What a framework probe reports about the installed console.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameworkInfo {
    /// Framework version, `major.minor[.patch]`.
    pub version: String,
    /// Whether the framework declares it must run elevated.
    pub requires_elevated: bool,
}

/// Factory surface for the underlying console framework.
pub trait Framework {
    /// Check that the framework is reachable and report its metadata.
    fn probe(&self) -> Result<FrameworkInfo, ContextError>;

    /// Construct a global console context from reconciled flags.
    fn construct(&self, flags: ReconciledFlags) -> Result<Box<dyn ConsoleContext>, ContextError>;
}

/// The global console session: command execution, options, workspaces,
/// module search and load.
pub trait ConsoleContext {
    /// Begin a session, optionally pinned to a workspace.
    fn start(&mut self, mode: SessionMode, workspace: Option<&str>) -> Result<(), ContextError>;

    /// Switch to (creating if needed) the named workspace. Idempotent.
    fn init_workspace(&mut self, name: &str) -> Result<(), ContextError>;

    /// Execute one command line.
    fn execute(&mut self, command: &str) -> Result<(), ContextError>;

    /// Display the global option table.
    fn list_options(&mut self) -> Result<(), ContextError>;

    /// Apply one option assignment; `spec` is `NAME VALUE`.
    fn set_option(&mut self, spec: &str) -> Result<(), ContextError>;

    /// Display modules whose path contains `filter` (empty lists all).
    fn search_modules(&mut self, filter: &str) -> Result<(), ContextError>;

    /// Load a module by path. `Ok(None)` means the load failed (unknown or
    /// ambiguous path).
    fn load_module(&mut self, path: &str)
        -> Result<Option<Box<dyn ModuleContext>>, ContextError>;

    /// Prompt text for the interactive loop.
    fn prompt(&self) -> String;
}

/// A console narrowed to one loaded module.
pub trait ModuleContext {
    /// Execute one command line in the module's scope.
    fn execute(&mut self, command: &str) -> Result<(), ContextError>;

    /// Display the module's option table.
    fn list_options(&mut self) -> Result<(), ContextError>;

    /// Apply one option assignment; `spec` is `NAME VALUE`.
    fn set_option(&mut self, spec: &str) -> Result<(), ContextError>;

    /// Invoke the module's run action.
    fn run(&mut self) -> Result<(), ContextError>;
}
