//! Raw line model of a rosdep document.
//!
//! Lines keep their terminators so that concatenating them reproduces the
//! source bytes exactly.

/// A document split into raw lines borrowed from the source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document<'a> {
    lines: Vec<&'a str>,
}

impl<'a> Document<'a> {
    /// Split `source` after every `\n`. A `\r` preceding the `\n` stays on its
    /// line, and a final line without a terminator is kept as-is.
    pub fn parse(source: &'a str) -> Self {
        Self {
            lines: source.split_inclusive('\n').collect(),
        }
    }

    pub fn lines(&self) -> &[&'a str] {
        &self.lines
    }
}

/// Number of leading whitespace characters.
pub fn indentation(line: &str) -> usize {
    line.chars().take_while(|c| c.is_whitespace()).count()
}

/// Whether the line holds nothing but whitespace.
pub fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

pub fn has_line_break(line: &str) -> bool {
    line.ends_with('\n')
}
