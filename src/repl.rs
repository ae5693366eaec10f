//! The interactive command loop.
//!
//! Kept deliberately thin: read a line, record it, hand it to the console's
//! `execute`. Command failures are reported and the loop continues — only an
//! interrupt ends the session with its dedicated exit code. `exit`/`quit`
//! and end-of-input leave cleanly.

use crate::context::ConsoleContext;
use crate::history::History;
use crate::orchestrator::{EXIT_INTERRUPTED, EXIT_OK};
use crate::render::RenderSink;
use std::io::{self, BufRead, Write};

/// Drive an interactive session over stdin until exit or interrupt.
pub fn interact(
    console: &mut dyn ConsoleContext,
    renderer: &dyn RenderSink,
    mut history: Option<&mut History>,
) -> i32 {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print_prompt(&console.prompt());
        let line = match lines.next() {
            Some(Ok(line)) => line,
            Some(Err(e)) if e.kind() == io::ErrorKind::Interrupted => return EXIT_INTERRUPTED,
            Some(Err(e)) => {
                renderer.error(&format!("failed to read input: {e}"));
                return EXIT_OK;
            }
            None => return EXIT_OK,
        };
        let command = line.trim();
        if command.is_empty() {
            continue;
        }
        if command == "exit" || command == "quit" {
            return EXIT_OK;
        }
        if let Some(history) = history.as_deref_mut() {
            history.record(command);
        }
        match console.execute(command) {
            Ok(()) => {}
            Err(e) if e.is_interrupted() => return EXIT_INTERRUPTED,
            Err(e) => renderer.error(&e.to_string()),
        }
    }
}

fn print_prompt(prompt: &str) {
    let mut stderr = io::stderr();
    let _ = write!(stderr, "{prompt}");
    let _ = stderr.flush();
}
