//! CLI argument surfaces for the two launcher variants, and their
//! resolution into an immutable [`DirectiveSet`].
//!
//! Resolution is where script files are validated and `NAME=VALUE` pairs
//! are parsed; the orchestrator receives only well-formed directives.

use crate::directives::{validate_script_path, DirectiveSet, OptionAssignment};
use crate::error::DirectiveError;
use crate::flags::FeatureToggles;
use clap::Parser;
use std::path::PathBuf;

/// Shared feature-toggle flags, identical across both launchers.
#[derive(Debug, Clone, clap::Args)]
pub struct ToggleArgs {
    /// Disable the version check at startup.
    #[arg(long = "no-check")]
    pub no_check: bool,

    /// Disable the anonymous usage ping.
    #[arg(long = "no-analytics")]
    pub no_analytics: bool,

    /// Disable the remote module index refresh.
    #[arg(long = "no-marketplace")]
    pub no_marketplace: bool,

    /// Disable all outbound auxiliary requests at once.
    #[arg(long = "stealth")]
    pub stealth: bool,

    /// Use screen-reader friendly output.
    #[arg(long = "accessible")]
    pub accessible: bool,

    /// Disable color output.
    #[arg(long = "no-colors")]
    pub no_colors: bool,

    /// Raise log verbosity to debug.
    #[arg(long = "debug")]
    pub debug: bool,

    /// Also write logs to this file.
    #[arg(long = "log-file", value_name = "FILE")]
    pub log_file: Option<PathBuf>,
}

impl ToggleArgs {
    fn to_toggles(&self) -> FeatureToggles {
        FeatureToggles {
            check: !self.no_check,
            analytics: !self.no_analytics,
            marketplace: !self.no_marketplace,
            accessible: self.accessible,
            colors: !self.no_colors,
            debug: self.debug,
        }
    }
}

/// The rich orchestration launcher.
#[derive(Debug, Parser)]
#[command(name = "lookout-cli", version)]
pub struct CliArgs {
    /// Workspace to create or load.
    #[arg(short = 'w', long = "workspace", value_name = "NAME")]
    pub workspace: Option<String>,

    /// Command to run in the global context before any module load
    /// (repeatable, runs in order).
    #[arg(short = 'C', long = "global-command", value_name = "COMMAND")]
    pub global_commands: Vec<String>,

    /// Global option to set, as NAME=VALUE (repeatable).
    #[arg(short = 'g', long = "global-option", value_name = "NAME=VALUE")]
    pub global_options: Vec<String>,

    /// Show global options and exit.
    #[arg(short = 'G', long = "show-global-options")]
    pub show_global_options: bool,

    /// Show available modules and exit.
    #[arg(short = 'M', long = "show-modules")]
    pub show_modules: bool,

    /// Module to load.
    #[arg(short = 'm', long = "module", value_name = "PATH")]
    pub module: Option<String>,

    /// Command to run in the loaded module's context (repeatable).
    #[arg(short = 'c', long = "module-command", value_name = "COMMAND")]
    pub module_commands: Vec<String>,

    /// Module option to set, as NAME=VALUE (repeatable).
    #[arg(short = 'o', long = "module-option", value_name = "NAME=VALUE")]
    pub module_options: Vec<String>,

    /// Show the loaded module's options and exit.
    #[arg(short = 'O', long = "show-module-options")]
    pub show_module_options: bool,

    /// Run the loaded module.
    #[arg(short = 'x', long = "run")]
    pub run_module: bool,

    /// Script file of commands to run against the global context.
    #[arg(short = 'r', long = "script", value_name = "FILE")]
    pub script: Option<PathBuf>,

    #[command(flatten)]
    pub toggles: ToggleArgs,
}

impl CliArgs {
    /// Resolve parsed arguments into an immutable directive set.
    pub fn into_directives(self) -> Result<DirectiveSet, DirectiveError> {
        let script_file = self
            .script
            .as_deref()
            .map(validate_script_path)
            .transpose()?;
        Ok(DirectiveSet {
            workspace: self.workspace,
            global_commands: self.global_commands,
            module_commands: self.module_commands,
            global_options: parse_assignments(&self.global_options)?,
            module_options: parse_assignments(&self.module_options)?,
            module: self.module,
            run_module: self.run_module,
            show_global_options: self.show_global_options,
            show_modules: self.show_modules,
            show_module_options: self.show_module_options,
            script_file,
            toggles: self.toggles.to_toggles(),
            stealth: self.toggles.stealth,
            log_file: self.toggles.log_file.clone(),
        })
    }
}

/// The interactive console launcher.
#[derive(Debug, Parser)]
#[command(name = "lookout", version)]
pub struct ConsoleArgs {
    /// Workspace to create or load.
    #[arg(short = 'w', long = "workspace", value_name = "NAME")]
    pub workspace: Option<String>,

    /// Script file of commands to run before the interactive session.
    #[arg(short = 'r', long = "script", value_name = "FILE")]
    pub script: Option<PathBuf>,

    #[command(flatten)]
    pub toggles: ToggleArgs,
}

impl ConsoleArgs {
    /// Resolve parsed arguments into an immutable directive set.
    pub fn into_directives(self) -> Result<DirectiveSet, DirectiveError> {
        let script_file = self
            .script
            .as_deref()
            .map(validate_script_path)
            .transpose()?;
        Ok(DirectiveSet {
            workspace: self.workspace,
            script_file,
            toggles: self.toggles.to_toggles(),
            stealth: self.toggles.stealth,
            log_file: self.toggles.log_file.clone(),
            ..DirectiveSet::default()
        })
    }
}

fn parse_assignments(raw: &[String]) -> Result<Vec<OptionAssignment>, DirectiveError> {
    raw.iter()
        .map(|entry| OptionAssignment::parse(entry))
        .collect()
}
