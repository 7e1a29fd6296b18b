//! Output assembly and persistence.

use alloc::borrow::Cow;
use std::fs;
use std::path::Path;

use crate::document::has_line_break;

/// A release entry synthesized in one block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patch {
    /// Top-level key the block belongs to, if known.
    pub package: Option<String>,
    /// Release the new entry was cloned from.
    pub source: String,
    /// Release name of the new entry.
    pub target: String,
}

/// The rewritten document: borrowed source lines interleaved with appended
/// clones. Source lines are never edited in place.
#[derive(Debug, Default)]
pub struct PatchedDocument<'a> {
    parts: Vec<Cow<'a, str>>,
    patches: Vec<Patch>,
}

impl<'a> PatchedDocument<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_untouched(&mut self, lines: &[&'a str]) {
        self.parts.extend(lines.iter().copied().map(Cow::Borrowed));
    }

    /// Append a block's lines followed by `clone`, separating them with a line
    /// break when the block's last line has none.
    pub fn push_block(&mut self, lines: &[&'a str], clone: Option<(Patch, Vec<Cow<'a, str>>)>) {
        self.push_untouched(lines);
        let Some((patch, clone)) = clone else {
            return;
        };
        if lines.last().is_some_and(|line| !has_line_break(line)) {
            self.parts.push(Cow::Borrowed("\n"));
        }
        self.parts.extend(clone);
        self.patches.push(patch);
    }

    pub fn patches(&self) -> &[Patch] {
        &self.patches
    }

    pub fn is_modified(&self) -> bool {
        !self.patches.is_empty()
    }

    /// Write the document to `path` if any clone was appended. Returns whether
    /// a write happened; an unmodified document never touches the file.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the file cannot be written.
    pub fn write_if_modified(&self, path: &Path) -> std::io::Result<bool> {
        if !self.is_modified() {
            return Ok(false);
        }
        fs::write(path, self.to_string())?;
        Ok(true)
    }
}

impl core::fmt::Display for PatchedDocument<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        self.parts.iter().try_for_each(|part| f.write_str(part))
    }
}
