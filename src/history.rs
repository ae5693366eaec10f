//! Command-history persistence for the interactive loop.
//!
//! The history file is a scoped resource: acquired during terminal setup,
//! appended to while the session runs, and flushed when the guard drops —
//! which happens on every exit path, including failures. Acquisition is
//! best-effort; a session without history is still a session.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Maximum lines retained in the history file.
const MAX_HISTORY_LINES: usize = 1000;

/// Scoped command-history buffer backed by a file.
#[derive(Debug)]
pub struct History {
    path: PathBuf,
    entries: Vec<String>,
    dirty: bool,
}

impl History {
    /// Load (creating if needed) the history file at `path`.
    pub fn acquire(path: impl Into<PathBuf>) -> std::io::Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let entries = match fs::read_to_string(&path) {
            Ok(text) => text.lines().map(str::to_string).collect(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e),
        };
        Ok(Self {
            path,
            entries,
            dirty: false,
        })
    }

    /// Record one executed command line.
    pub fn record(&mut self, line: &str) {
        let line = line.trim();
        if line.is_empty() {
            return;
        }
        // Collapse immediate repeats, like readline's ignoredups.
        if self.entries.last().is_some_and(|last| last == line) {
            return;
        }
        self.entries.push(line.to_string());
        if self.entries.len() > MAX_HISTORY_LINES {
            let excess = self.entries.len() - MAX_HISTORY_LINES;
            self.entries.drain(..excess);
        }
        self.dirty = true;
    }

    /// Number of retained entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the history is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// File backing this history.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write retained entries back to disk.
    pub fn flush(&mut self) -> std::io::Result<()> {
        if !self.dirty {
            return Ok(());
        }
        let mut file = fs::File::create(&self.path)?;
        for entry in &self.entries {
            writeln!(file, "{entry}")?;
        }
        self.dirty = false;
        Ok(())
    }
}

impl Drop for History {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            tracing::debug!(error = %e, path = %self.path.display(), "history flush failed");
        }
    }
}
