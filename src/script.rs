//! Command-script parsing.
//!
//! Scripts are plain text, one command per line. Blank lines are skipped and
//! lines whose first non-whitespace character is `#` are comments. Line
//! numbers are 1-indexed against the raw file, comments and blanks included,
//! so error reports match what an editor shows.

use std::fs;
use std::io;
use std::path::Path;

/// One executable script line with its raw 1-indexed position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptLine {
    pub number: usize,
    pub command: String,
}

/// Extract executable lines from script text.
pub fn parse_lines(source: &str) -> Vec<ScriptLine> {
    source
        .lines()
        .enumerate()
        .filter_map(|(idx, raw)| {
            let trimmed = raw.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                return None;
            }
            Some(ScriptLine {
                number: idx + 1,
                command: trimmed.to_string(),
            })
        })
        .collect()
}

/// Read a script file and extract its executable lines.
pub fn read_script(path: &Path) -> io::Result<Vec<ScriptLine>> {
    Ok(parse_lines(&fs::read_to_string(path)?))
}
