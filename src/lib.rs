//! Lookout — launcher and session orchestrator for a reconnaissance console.
//!
//! This crate turns a resolved set of invocation directives into a
//! deterministic sequence of actions against a two-level console: a global
//! context and, optionally, a loaded module's context. The console itself is
//! reached through the narrow capability traits in [`context`]; a bundled
//! implementation lives in [`engine`].
//!
//! # Quick start
//!
//! ```no_run
//! use lookout::directives::DirectiveSet;
//! use lookout::engine::Engine;
//! use lookout::orchestrator::{LaunchProfile, Orchestrator};
//! use lookout::render::Renderer;
//!
//! let engine = Engine::discover().unwrap();
//! let renderer = Renderer::new(true);
//! let orchestrator = Orchestrator::new(&engine, &renderer, LaunchProfile::Cli);
//! let outcome = orchestrator.run(&DirectiveSet::default());
//! std::process::exit(outcome.exit_code);
//! ```

pub mod cli;
pub mod context;
pub mod directives;
pub mod engine;
pub mod error;
pub mod flags;
pub mod history;
pub mod logging;
pub mod orchestrator;
pub mod preflight;
pub mod render;
pub mod repl;
pub mod script;
#[cfg(test)]
pub mod testsupport;
