//! README line patching.
//!
//! The README carries an install snippet pinned to a specific commit. A
//! release rewrites that line so it points at the commit being released.
//! Patching is pure and works on lines; reading and writing the file goes
//! through [`FileEditor`] so the workflow can be exercised without touching
//! disk.
use log::*;
use std::{fs, path::Path};

use crate::error::Result;

/// Line to locate in the README and the shape of its replacement.
///
/// A line matches when it starts with `prefix`. It is replaced wholesale by
/// `prefix + sha + suffix`, so patching an already patched line with the same
/// sha is a no-op.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PatchTarget {
    pub prefix: String,
    pub suffix: String,
}

impl PatchTarget {
    pub fn new(prefix: impl Into<String>, suffix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            suffix: suffix.into(),
        }
    }

    /// Whether `line` is the install snippet line.
    pub fn matches(&self, line: &str) -> bool {
        line.starts_with(&self.prefix)
    }

    /// The line pinned to `sha`.
    pub fn replacement(&self, sha: &str) -> String {
        format!("{}{}{}", self.prefix, sha.trim(), self.suffix)
            .trim()
            .to_string()
    }
}

/// Result of patching a README's lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadmePatch {
    /// All lines of the file after patching, in original order.
    pub lines: Vec<String>,
    /// Number of lines that matched the target.
    pub patched: usize,
}

impl ReadmePatch {
    pub fn found(&self) -> bool {
        self.patched > 0
    }

    /// File content to write back: lines joined by `\n` with a trailing
    /// newline.
    pub fn render(&self) -> String {
        render_lines(&self.lines)
    }
}

/// Replaces every line matching `target` with its replacement for `sha`.
///
/// Lines that do not match are carried over untouched. A matching line that
/// ends in `\r` keeps it, so CRLF files stay CRLF.
pub fn patch_lines(
    lines: &[String],
    target: &PatchTarget,
    sha: &str,
) -> ReadmePatch {
    let replacement = target.replacement(sha);
    let mut patched = 0;

    let lines = lines
        .iter()
        .map(|line| {
            if !target.matches(line) {
                return line.clone();
            }

            info!("Patching line:\n{}", line.trim_end_matches('\r'));
            info!("{replacement}");
            info!("^^^ patched line");
            patched += 1;

            if line.ends_with('\r') {
                format!("{replacement}\r")
            } else {
                replacement.clone()
            }
        })
        .collect::<Vec<_>>();

    if patched > 1 {
        warn!(
            "{patched} lines start with \"{}\": all of them were patched",
            target.prefix
        );
    }

    ReadmePatch { lines, patched }
}

/// Splits file content into lines with their `\n` terminators removed.
///
/// A final line without terminator is kept; carriage returns are left alone
/// so the file round-trips byte for byte.
pub fn split_lines(content: &str) -> Vec<String> {
    content.split_terminator('\n').map(String::from).collect()
}

/// Joins lines with `\n` and terminates the file with a newline.
pub fn render_lines(lines: &[String]) -> String {
    let mut content = lines.join("\n");
    content.push('\n');
    content
}

/// Reads and writes a text file line by line.
#[cfg_attr(test, mockall::automock)]
pub trait FileEditor {
    /// Reads `path` as UTF-8 and returns its lines without terminators.
    fn read_lines(&self, path: &Path) -> Result<Vec<String>>;

    /// Overwrites `path` with `lines`, newline terminated.
    fn write_lines(&self, path: &Path, lines: &[String]) -> Result<()>;
}

/// [`FileEditor`] backed by the local filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsFileEditor;

impl FileEditor for FsFileEditor {
    fn read_lines(&self, path: &Path) -> Result<Vec<String>> {
        debug!("reading {}", path.display());
        let content = fs::read_to_string(path)?;
        Ok(split_lines(&content))
    }

    fn write_lines(&self, path: &Path, lines: &[String]) -> Result<()> {
        debug!("writing {} lines to {}", lines.len(), path.display());
        fs::write(path, render_lines(lines))?;
        Ok(())
    }
}
