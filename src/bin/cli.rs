//! Rich orchestration launcher: the full directive surface against one
//! session, with an interactive handoff only when nothing else was asked.

use clap::Parser;
use lookout::cli::CliArgs;
use lookout::engine::Engine;
use lookout::orchestrator::{LaunchProfile, Orchestrator, EXIT_FAILURE, EXIT_OK};
use lookout::render::{RenderSink, Renderer};
use lookout::repl;

fn main() {
    let args = CliArgs::parse();
    let renderer = Renderer::new(!args.toggles.no_colors);

    let directives = match args.into_directives() {
        Ok(directives) => directives,
        Err(e) => {
            renderer.error(&e.to_string());
            std::process::exit(EXIT_FAILURE);
        }
    };
    let engine = match Engine::discover() {
        Ok(engine) => engine,
        Err(e) => {
            renderer.error(&e.to_string());
            std::process::exit(EXIT_FAILURE);
        }
    };

    let history_path = engine.history_path();
    let mut outcome = Orchestrator::new(&engine, &renderer, LaunchProfile::Cli)
        .with_history_path(history_path)
        .run(&directives);

    let mut exit_code = outcome.exit_code;
    if exit_code == EXIT_OK && outcome.interactive {
        if let Some(console) = outcome.console.as_deref_mut() {
            exit_code = repl::interact(console, &renderer, outcome.history.as_mut());
        }
    }
    drop(outcome);
    std::process::exit(exit_code);
}
