//! Groups the lines of a block into release entries.

use core::ops::Range;

use indexmap::IndexMap;

use crate::document::{indentation, is_blank};

/// One release entry: its key line followed by every deeper (or blank) line
/// attributed to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry<'a> {
    /// Byte range of the release name within the key line.
    token: Range<usize>,
    lines: Vec<&'a str>,
}

impl<'a> Entry<'a> {
    pub fn key_line(&self) -> &'a str {
        self.lines[0]
    }

    pub fn name(&self) -> &'a str {
        &self.key_line()[self.token.clone()]
    }

    /// Byte range of [`Entry::name`] within [`Entry::key_line`].
    pub fn token(&self) -> Range<usize> {
        self.token.clone()
    }

    pub fn lines(&self) -> &[&'a str] {
        &self.lines
    }
}

/// Entries of a block keyed by release name, in first-seen order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grouping<'a> {
    pub base_indent: usize,
    pub entries: IndexMap<&'a str, Entry<'a>>,
}

impl Grouping<'_> {
    pub fn contains(&self, release: &str) -> bool {
        self.entries.contains_key(release)
    }
}

fn is_token_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'*' || b == b'-'
}

/// Whether `name` can be written as a bare release key that
/// [`parse_key_line`] reads back as the same name. The `*` wildcard is not a
/// release.
pub fn is_release_name(name: &str) -> bool {
    !name.is_empty() && name.bytes().all(|b| is_token_byte(b) && b != b'*')
}

/// Parse a release key line such as `    focal: [x]`, `    '*': null` or
/// `    "jammy" :`, returning the byte range of the release name.
///
/// The line must be indented, and a quote opened before the name must be
/// closed by the same quote character.
pub fn parse_key_line(line: &str) -> Option<Range<usize>> {
    let body_start = line.len() - line.trim_start().len();
    if body_start == 0 {
        return None;
    }
    let rest = &line[body_start..];
    let quote = rest.chars().next().filter(|c| matches!(c, '\'' | '"'));
    let token_start = body_start + quote.map_or(0, char::len_utf8);
    let token_len = line.as_bytes()[token_start..]
        .iter()
        .take_while(|b| is_token_byte(**b))
        .count();
    if token_len == 0 {
        return None;
    }
    let token_end = token_start + token_len;

    let mut after = &line[token_end..];
    if let Some(q) = quote {
        after = after.strip_prefix(q)?;
    }
    after
        .trim_start()
        .starts_with(':')
        .then_some(token_start..token_end)
}

/// Partition block lines into entries.
///
/// The base indentation is that of the first non-blank line; `None` is
/// returned for an all-blank block. A base-indentation line that is not a
/// release key ends the current entry, so the deeper lines after it are left
/// unattributed. A repeated release name replaces the earlier entry.
pub fn group_entries<'a>(lines: &[&'a str]) -> Option<Grouping<'a>> {
    let base_indent = lines
        .iter()
        .find(|line| !is_blank(line))
        .map(|line| indentation(line))?;

    let mut entries: IndexMap<&'a str, Entry<'a>> = IndexMap::new();
    let mut current: Option<&'a str> = None;

    for &line in lines {
        if is_blank(line) {
            if let Some(key) = current
                && let Some(entry) = entries.get_mut(key)
            {
                entry.lines.push(line);
            }
            continue;
        }

        let indent = indentation(line);
        if indent == base_indent {
            current = parse_key_line(line).map(|token| {
                let name = &line[token.clone()];
                entries.insert(
                    name,
                    Entry {
                        token,
                        lines: vec![line],
                    },
                );
                name
            });
        } else if indent > base_indent
            && let Some(key) = current
            && let Some(entry) = entries.get_mut(key)
        {
            entry.lines.push(line);
        }
    }

    Some(Grouping {
        base_indent,
        entries,
    })
}
