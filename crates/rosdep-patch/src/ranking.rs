//! Chronological ranking of OS release names.

use std::collections::HashMap;

/// Ubuntu release code names, oldest first.
pub const UBUNTU_RELEASES: &[&str] = &[
    "lucid", "maverick", "natty", "oneiric", "precise", "quantal", "raring", "saucy", "trusty",
    "utopic", "vivid", "wily", "xenial", "yakkety", "zesty", "artful", "bionic", "cosmic",
    "disco", "eoan", "focal", "groovy", "hirsute", "impish", "jammy", "kinetic", "lunar",
    "mantic", "noble", "oracular", "resolute",
];

/// An ordered table of release names; a name's rank is its position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseRanking {
    names: Vec<String>,
    ranks: HashMap<String, usize>,
}

impl ReleaseRanking {
    /// Build a ranking from names ordered oldest first. A repeated name keeps
    /// the rank of its first occurrence.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        let mut ranks = HashMap::with_capacity(names.len());
        for (rank, name) in names.iter().enumerate() {
            ranks.entry(name.clone()).or_insert(rank);
        }
        Self { names, ranks }
    }

    pub fn ubuntu() -> Self {
        Self::new(UBUNTU_RELEASES.iter().copied())
    }

    pub fn rank(&self, release: &str) -> Option<usize> {
        self.ranks.get(release).copied()
    }

    /// The most recent release, i.e. the last name of the table.
    pub fn newest(&self) -> Option<&str> {
        self.names.last().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Default for ReleaseRanking {
    fn default() -> Self {
        Self::ubuntu()
    }
}
