//! Session orchestration: the ordered state machine behind both launchers.
//!
//! One run takes an immutable [`DirectiveSet`] and drives the console
//! through a fixed sequence: logging, preflight validation, terminal
//! affordances, flag reconciliation, context construction, startup, script
//! execution, global commands and options, display-and-exit branches,
//! module handling, and the interactive fallback notice. Failures inside
//! the sequence are not individually recovered — a single failure aborts
//! the remainder of the run; only log-file attachment and history
//! acquisition degrade gracefully.

use crate::context::{ConsoleContext, Framework, SessionMode};
use crate::directives::DirectiveSet;
use crate::error::{ContextError, ScriptError};
use crate::flags::reconcile;
use crate::history::History;
use crate::logging;
use crate::preflight;
use crate::render::RenderSink;
use crate::script;
use std::path::{Path, PathBuf};

/// Process exit code for a successful or display-and-exit run.
pub const EXIT_OK: i32 = 0;
/// Process exit code for any validation, construction, or execution failure.
pub const EXIT_FAILURE: i32 = 1;
/// Process exit code when an external interrupt aborted the run.
pub const EXIT_INTERRUPTED: i32 = 130;

/// Which launcher variant is driving the state machine.
///
/// Both variants share one machine; the console variant prunes the sequence
/// to startup, script execution, and the interactive fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchProfile {
    /// Full orchestration: commands, options, show branches, module load/run.
    Cli,
    /// Interactive console launcher: workspace + script + interactive start.
    Console,
}

impl LaunchProfile {
    fn session_mode(self) -> SessionMode {
        match self {
            Self::Cli => SessionMode::Cli,
            Self::Console => SessionMode::Console,
        }
    }
}

/// Result of one orchestrator run.
///
/// The exit status is the contract; the remaining fields hand the borrowed
/// collaborators back to the bootstrap code so it can continue the session
/// interactively when asked to.
pub struct SessionOutcome {
    /// Process exit status: 0, 1, or 130.
    pub exit_code: i32,
    /// The constructed console, when the run got that far.
    pub console: Option<Box<dyn ConsoleContext>>,
    /// Command history guard; flushes on drop.
    pub history: Option<History>,
    /// Whether the launcher should hand off to an interactive loop.
    pub interactive: bool,
}

impl SessionOutcome {
    fn failure(exit_code: i32) -> Self {
        Self {
            exit_code,
            console: None,
            history: None,
            interactive: false,
        }
    }
}

/// Early-return disposition of the ordered sequence.
enum Flow {
    /// A display-and-exit branch terminated the run.
    Done,
    /// The sequence ran to completion; carries the fallback decision.
    Completed { module_loaded: bool },
}

/// Sequences one session against a framework.
pub struct Orchestrator<'a> {
    framework: &'a dyn Framework,
    renderer: &'a dyn RenderSink,
    profile: LaunchProfile,
    history_path: Option<PathBuf>,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        framework: &'a dyn Framework,
        renderer: &'a dyn RenderSink,
        profile: LaunchProfile,
    ) -> Self {
        Self {
            framework,
            renderer,
            profile,
            history_path: None,
        }
    }

    /// Enable command-history persistence at the given path.
    pub fn with_history_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.history_path = Some(path.into());
        self
    }

    /// Run the full sequence for one directive set.
    pub fn run(&self, directives: &DirectiveSet) -> SessionOutcome {
        // Sequence walkthrough:
        // 1) logging setup (non-fatal on log-file trouble),
        // 2) environment preflight,
        // 3) terminal affordances (best-effort history),
        // 4) flag reconciliation,
        // 5) console construction,
        // then the command sequence with its early-return branches.
        if let Some(warning) = logging::init(directives.toggles.debug, directives.log_file.as_deref())
        {
            self.renderer.warn(&warning);
        }

        if let Err(e) = preflight::validate(self.framework) {
            self.renderer.error(&e.to_string());
            return SessionOutcome::failure(EXIT_FAILURE);
        }

        let history = self.acquire_history();

        let flags = reconcile(directives.toggles, directives.stealth);
        let mut console = match self.framework.construct(flags) {
            Ok(console) => console,
            Err(e) => {
                self.renderer
                    .error(&format!("failed to construct console context: {e}"));
                return SessionOutcome::failure(EXIT_FAILURE);
            }
        };

        let (exit_code, interactive) = match self.drive(console.as_mut(), directives) {
            Ok(Flow::Done) => (EXIT_OK, false),
            Ok(Flow::Completed { module_loaded }) => {
                let fallback = self.fallback_to_interactive(directives, module_loaded);
                if fallback {
                    self.renderer
                        .hint("no action requested; interactive session started (type `help` for commands)");
                }
                let interactive = match self.profile {
                    LaunchProfile::Console => true,
                    LaunchProfile::Cli => fallback,
                };
                (EXIT_OK, interactive)
            }
            Err(e) => (self.report_failure(&e), false),
        };

        SessionOutcome {
            exit_code,
            console: Some(console),
            history,
            interactive,
        }
    }

    /// Steps 6–12: startup through module handling. Collaborator errors
    /// propagate out of here and are mapped once, at the top level.
    fn drive(
        &self,
        console: &mut dyn ConsoleContext,
        directives: &DirectiveSet,
    ) -> Result<Flow, RunError> {
        console.start(self.profile.session_mode(), directives.workspace.as_deref())?;
        if let Some(workspace) = &directives.workspace {
            // Startup may or may not have activated the workspace; the
            // explicit re-init is idempotent and keeps that contract visible.
            console.init_workspace(workspace)?;
            self.renderer
                .status(&format!("workspace initialized: {workspace}"));
        }

        if let Some(path) = &directives.script_file {
            self.run_script(console, path)?;
        }

        if self.profile == LaunchProfile::Console {
            return Ok(Flow::Completed {
                module_loaded: false,
            });
        }

        for command in &directives.global_commands {
            tracing::debug!(command = %command, "global command");
            console.execute(command)?;
        }
        for option in &directives.global_options {
            console.set_option(&option.to_spec())?;
        }

        if directives.show_global_options {
            console.list_options()?;
            return Ok(Flow::Done);
        }
        if directives.show_modules {
            console.search_modules("")?;
            return Ok(Flow::Done);
        }

        let mut module_loaded = false;
        if let Some(path) = &directives.module {
            let Some(mut module) = console.load_module(path)? else {
                self.renderer
                    .error(&format!("failed to load module `{path}`"));
                return Err(RunError::ModuleLoad);
            };
            module_loaded = true;
            for command in &directives.module_commands {
                tracing::debug!(command = %command, module = %path, "module command");
                module.execute(command)?;
            }
            for option in &directives.module_options {
                module.set_option(&option.to_spec())?;
            }
            if directives.show_module_options {
                module.list_options()?;
                return Ok(Flow::Done);
            }
            if directives.run_module {
                module.run()?;
            }
        }

        Ok(Flow::Completed { module_loaded })
    }

    /// Step 7: execute a validated script file against the global context.
    fn run_script(
        &self,
        console: &mut dyn ConsoleContext,
        path: &Path,
    ) -> Result<(), ScriptError> {
        let lines = script::read_script(path).map_err(|source| ScriptError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        for line in lines {
            tracing::debug!(line = line.number, command = %line.command, "script command");
            console
                .execute(&line.command)
                .map_err(|source| ScriptError::Command {
                    line: line.number,
                    command: line.command.clone(),
                    source,
                })?;
        }
        Ok(())
    }

    /// Step 13's condition: nothing was requested that produces output or
    /// loads a module, and no workspace was named.
    fn fallback_to_interactive(&self, directives: &DirectiveSet, module_loaded: bool) -> bool {
        !module_loaded
            && !directives.show_global_options
            && !directives.show_modules
            && directives.script_file.is_none()
            && directives.global_commands.is_empty()
            && directives.workspace.is_none()
    }

    fn acquire_history(&self) -> Option<History> {
        let path = self.history_path.as_ref()?;
        match History::acquire(path) {
            Ok(history) => Some(history),
            Err(e) => {
                self.renderer.warn(&format!(
                    "command history unavailable ({e}); continuing without it"
                ));
                None
            }
        }
    }

    /// Map a sequence failure to its exit code, reporting it once.
    fn report_failure(&self, error: &RunError) -> i32 {
        match error {
            RunError::Script(e) if e.is_interrupted() => {
                self.renderer.error("interrupted");
                EXIT_INTERRUPTED
            }
            RunError::Script(e) => {
                self.renderer.error(&e.to_string());
                EXIT_FAILURE
            }
            RunError::Context(ContextError::Interrupted) => {
                self.renderer.error("interrupted");
                EXIT_INTERRUPTED
            }
            RunError::Context(ContextError::Failed(msg)) => {
                tracing::error!(error = %msg, "session aborted by console failure");
                self.renderer.error(&format!("unexpected console error: {msg}"));
                EXIT_FAILURE
            }
            RunError::ModuleLoad => EXIT_FAILURE,
        }
    }
}

/// Internal failure classification for one run.
enum RunError {
    Script(ScriptError),
    Context(ContextError),
    /// Already reported where it was detected.
    ModuleLoad,
}

impl From<ScriptError> for RunError {
    fn from(e: ScriptError) -> Self {
        Self::Script(e)
    }
}

impl From<ContextError> for RunError {
    fn from(e: ContextError) -> Self {
        Self::Context(e)
    }
}
