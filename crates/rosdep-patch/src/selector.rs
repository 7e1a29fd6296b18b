//! Decides whether a block needs a new release entry and which one to clone.

use crate::grouper::{Entry, Grouping};
use crate::ranking::ReleaseRanking;

/// Key that covers every release not listed explicitly.
pub const WILDCARD: &str = "*";

/// Outcome of inspecting one block's release keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection<'g, 'a> {
    /// The block has no release entries.
    Empty,
    /// A `*` entry already covers the target release.
    Wildcard,
    /// The target release is already present.
    AlreadyCurrent,
    /// None of the release keys appear in the ranking.
    NoRankedRelease,
    /// Clone this entry, the most recent ranked release in the block.
    Clone(&'g Entry<'a>),
}

impl Selection<'_, '_> {
    /// Short description of why nothing was cloned, for logging.
    pub fn skip_reason(&self) -> Option<&'static str> {
        match self {
            Self::Empty => Some("no release entries"),
            Self::Wildcard => Some("wildcard entry present"),
            Self::AlreadyCurrent => Some("target release present"),
            Self::NoRankedRelease => Some("no ranked release"),
            Self::Clone(_) => None,
        }
    }
}

/// Pick the entry to clone for `target`. Only the release names are
/// considered, never the entries' values.
pub fn select<'g, 'a>(
    grouping: &'g Grouping<'a>,
    ranking: &ReleaseRanking,
    target: &str,
) -> Selection<'g, 'a> {
    if grouping.entries.is_empty() {
        return Selection::Empty;
    }
    if grouping.contains(WILDCARD) {
        return Selection::Wildcard;
    }
    if grouping.contains(target) {
        return Selection::AlreadyCurrent;
    }
    grouping
        .entries
        .iter()
        .filter_map(|(name, entry)| ranking.rank(name).map(|rank| (rank, entry)))
        .max_by_key(|(rank, _)| *rank)
        .map_or(Selection::NoRankedRelease, |(_, entry)| Selection::Clone(entry))
}
