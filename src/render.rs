//! Terminal output for launcher status and error lines.
//!
//! `RenderSink` is the output contract consumed by orchestration code so
//! tests can capture what was said without scraping stderr. `Renderer` is
//! the default terminal implementation. Data displays (option tables,
//! module lists) go to stdout inside the engine; everything here is
//! session chrome on stderr.

use crossterm::style::{Color, Stylize};

/// Injectable output interface used by orchestration code.
pub trait RenderSink {
    /// Progress/confirmation line.
    fn status(&self, msg: &str);
    /// Recoverable problem; execution continues.
    fn warn(&self, msg: &str);
    /// Fatal or user-facing failure.
    fn error(&self, msg: &str);
    /// Guidance line (e.g. the interactive-session notice).
    fn hint(&self, msg: &str);
}

/// Default stderr renderer with optional color.
#[derive(Debug, Clone, Copy)]
pub struct Renderer {
    color: bool,
}

impl Renderer {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    /// Whether color output is enabled.
    pub fn color(&self) -> bool {
        self.color
    }

    fn line(&self, marker: &str, marker_color: Color, msg: &str) {
        if self.color {
            eprintln!("{} {msg}", marker.with(marker_color).bold());
        } else {
            eprintln!("{marker} {msg}");
        }
    }
}

impl RenderSink for Renderer {
    fn status(&self, msg: &str) {
        self.line("[*]", Color::Blue, msg);
    }

    fn warn(&self, msg: &str) {
        self.line("[!]", Color::Yellow, msg);
    }

    fn error(&self, msg: &str) {
        self.line("[!]", Color::Red, msg);
    }

    fn hint(&self, msg: &str) {
        self.line("[*]", Color::Green, msg);
    }
}
