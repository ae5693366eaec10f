//! Unified error types for the launcher.

use std::fmt;
use std::io;
use std::path::PathBuf;

// ---------------------------------------------------------------------------
// ContextError
// ---------------------------------------------------------------------------

/// Errors surfacing from console/module context calls.
///
/// The collaborator surface is opaque to the orchestrator: apart from
/// interruption, which maps to its own exit code, every failure is carried
/// as a message and handled at the top level of the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContextError {
    /// The call was aborted by an external interrupt signal.
    Interrupted,
    /// Any other collaborator failure.
    Failed(String),
}

impl ContextError {
    /// Build an opaque failure from a message.
    pub fn failed(msg: impl Into<String>) -> Self {
        Self::Failed(msg.into())
    }

    /// Whether this error represents an external interrupt.
    pub fn is_interrupted(&self) -> bool {
        matches!(self, Self::Interrupted)
    }
}

impl fmt::Display for ContextError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Interrupted => write!(f, "interrupted"),
            Self::Failed(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for ContextError {}

impl From<io::Error> for ContextError {
    fn from(e: io::Error) -> Self {
        if e.kind() == io::ErrorKind::Interrupted {
            Self::Interrupted
        } else {
            Self::Failed(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// PreflightError
// ---------------------------------------------------------------------------

/// Pre-flight validation failures. All are fatal and occur before any side
/// effect is applied to the console.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreflightError {
    /// The underlying console framework could not be reached at all.
    EnvironmentUnavailable(String),
    /// The framework version is below the supported floor.
    UnsupportedRuntime { found: String, minimum: String },
    /// The framework requires elevated privileges the process lacks.
    InsufficientPrivilege,
}

impl fmt::Display for PreflightError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EnvironmentUnavailable(detail) => {
                write!(f, "console framework unavailable: {detail}")
            }
            Self::UnsupportedRuntime { found, minimum } => write!(
                f,
                "framework version `{found}` is below the supported minimum `{minimum}`"
            ),
            Self::InsufficientPrivilege => {
                write!(f, "the framework requires elevated privileges; re-run as root")
            }
        }
    }
}

impl std::error::Error for PreflightError {}

// ---------------------------------------------------------------------------
// DirectiveError
// ---------------------------------------------------------------------------

/// Errors while resolving command-line input into a directive set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectiveError {
    /// An option argument was not of the form `NAME=VALUE`.
    MalformedOption(String),
    /// The script file failed its resolution-time constraints.
    ScriptFile { path: PathBuf, reason: String },
}

impl fmt::Display for DirectiveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedOption(raw) => {
                write!(f, "invalid option `{raw}`: expected NAME=VALUE")
            }
            Self::ScriptFile { path, reason } => {
                write!(f, "invalid script file {}: {reason}", path.display())
            }
        }
    }
}

impl std::error::Error for DirectiveError {}

// ---------------------------------------------------------------------------
// ScriptError
// ---------------------------------------------------------------------------

/// Failures while executing a command script against the global context.
#[derive(Debug)]
pub enum ScriptError {
    /// The script file could not be read mid-run.
    Read { path: PathBuf, source: io::Error },
    /// A command line failed; `line` is 1-indexed against the raw file.
    Command {
        line: usize,
        command: String,
        source: ContextError,
    },
}

impl ScriptError {
    /// Whether the underlying failure was an external interrupt.
    pub fn is_interrupted(&self) -> bool {
        match self {
            Self::Read { source, .. } => source.kind() == io::ErrorKind::Interrupted,
            Self::Command { source, .. } => source.is_interrupted(),
        }
    }
}

impl fmt::Display for ScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read { path, source } => {
                write!(f, "failed to read script {}: {source}", path.display())
            }
            Self::Command {
                line,
                command,
                source,
            } => write!(f, "script line {line} (`{command}`) failed: {source}"),
        }
    }
}

impl std::error::Error for ScriptError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interrupted_io_maps_to_interrupted() {
        let io_err = io::Error::new(io::ErrorKind::Interrupted, "signal");
        assert_eq!(ContextError::from(io_err), ContextError::Interrupted);
    }

    #[test]
    fn other_io_maps_to_failed() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "missing");
        let err = ContextError::from(io_err);
        assert!(!err.is_interrupted());
        assert!(err.to_string().contains("missing"));
    }

    #[test]
    fn preflight_display_variants() {
        let err = PreflightError::UnsupportedRuntime {
            found: "0.9".into(),
            minimum: "1.0".into(),
        };
        assert!(err.to_string().contains("`0.9`"));
        assert!(err.to_string().contains("`1.0`"));
        assert!(PreflightError::InsufficientPrivilege
            .to_string()
            .contains("elevated"));
    }

    #[test]
    fn script_error_reports_line_and_command() {
        let err = ScriptError::Command {
            line: 5,
            command: "baz".into(),
            source: ContextError::failed("boom"),
        };
        let s = err.to_string();
        assert!(s.contains("line 5"), "got: {s}");
        assert!(s.contains("`baz`"), "got: {s}");
    }

    #[test]
    fn script_error_interrupt_detection() {
        let err = ScriptError::Command {
            line: 1,
            command: "x".into(),
            source: ContextError::Interrupted,
        };
        assert!(err.is_interrupted());
    }

    #[test]
    fn directive_error_display() {
        let err = DirectiveError::MalformedOption("THREADS".into());
        assert!(err.to_string().contains("NAME=VALUE"));
    }
}
