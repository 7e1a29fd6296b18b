//! Locates the OS family sub-mappings (blocks) of a rosdep document.

use crate::document::{indentation, is_blank};

/// Indentation of the OS family key under a package key.
const MAPPING_INDENT: usize = 2;

/// The value lines of one OS family mapping, without its opening line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block<'d, 'a> {
    /// Top-level key the block is nested under, if one was seen.
    pub package: Option<&'a str>,
    pub lines: &'d [&'a str],
}

/// A run of untouched lines, optionally followed by the block they lead into.
///
/// When `block` is present, the last untouched line is the block's opener.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk<'d, 'a> {
    pub untouched: &'d [&'a str],
    pub block: Option<Block<'d, 'a>>,
}

/// Whether `line` opens a nested `mapping:` at indentation 2.
///
/// Only a bare key (optionally followed by a comment) qualifies; a key with an
/// inline value such as `  ubuntu: [pkg]` does not.
pub fn opens_block(line: &str, mapping: &str) -> bool {
    let line = line.trim_end_matches(['\r', '\n']);
    let Some(rest) = line
        .strip_prefix("  ")
        .and_then(|rest| rest.strip_prefix(mapping))
        .and_then(|rest| rest.strip_prefix(':'))
    else {
        return false;
    };
    let rest = rest.trim_start();
    rest.is_empty() || rest.starts_with('#')
}

/// Key of a top-level (unindented) mapping line, used to name packages.
fn top_level_key(line: &str) -> Option<&str> {
    if is_blank(line) || indentation(line) != 0 || line.starts_with('#') {
        return None;
    }
    let (key, _) = line.split_once(':')?;
    let key = key.trim_end();
    let key = key
        .strip_prefix(['\'', '"'])
        .and_then(|k| k.strip_suffix(['\'', '"']))
        .unwrap_or(key);
    (!key.is_empty()).then_some(key)
}

/// Lazily splits a document into [`Chunk`]s; every line appears in exactly one
/// chunk, in order.
pub struct BlockScanner<'d, 'a> {
    lines: &'d [&'a str],
    mapping: &'d str,
    pos: usize,
    package: Option<&'a str>,
}

impl<'d, 'a> BlockScanner<'d, 'a> {
    pub fn new(lines: &'d [&'a str], mapping: &'d str) -> Self {
        Self {
            lines,
            mapping,
            pos: 0,
            package: None,
        }
    }

    /// Advance past the block body starting at `self.pos`.
    fn consume_block(&mut self) {
        while let Some(line) = self.lines.get(self.pos) {
            if is_blank(line) || indentation(line) > MAPPING_INDENT {
                self.pos += 1;
            } else {
                break;
            }
        }
    }
}

impl<'d, 'a> Iterator for BlockScanner<'d, 'a> {
    type Item = Chunk<'d, 'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.lines.len() {
            return None;
        }
        let start = self.pos;
        while let Some(&line) = self.lines.get(self.pos) {
            self.pos += 1;
            if let Some(key) = top_level_key(line) {
                self.package = Some(key);
            }
            if opens_block(line, self.mapping) {
                let body_start = self.pos;
                self.consume_block();
                return Some(Chunk {
                    untouched: &self.lines[start..body_start],
                    block: Some(Block {
                        package: self.package,
                        lines: &self.lines[body_start..self.pos],
                    }),
                });
            }
        }
        Some(Chunk {
            untouched: &self.lines[start..],
            block: None,
        })
    }
}
