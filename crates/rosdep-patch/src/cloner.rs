//! Clones a release entry under a new release name.

use alloc::borrow::Cow;

use crate::grouper::Entry;

/// Copy `entry` with its release name replaced by `release`.
///
/// Only the name token of the key line changes: indentation, quoting, the
/// colon and anything after it are kept, and the value lines are borrowed
/// unchanged.
pub fn clone_entry<'a>(entry: &Entry<'a>, release: &str) -> Vec<Cow<'a, str>> {
    let key_line = entry.key_line();
    let token = entry.token();
    let renamed = format!(
        "{}{release}{}",
        &key_line[..token.start],
        &key_line[token.end..]
    );

    core::iter::once(Cow::Owned(renamed))
        .chain(entry.lines()[1..].iter().copied().map(Cow::Borrowed))
        .collect()
}
