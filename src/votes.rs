//! Vote Accumulation
//!
//! A [`VoteTable`] maps structural paths to vote counts in insertion order.
//! Every classifier reduces per-sample winners into one of these and reads
//! its answer back with [`VoteTable::winner`]: the greatest count, ties going
//! to the path inserted first.

use serde::{Deserialize, Serialize};

/// Insertion-ordered path → vote count map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteTable {
    entries: Vec<(String, i64)>,
}

impl VoteTable {
    /// Empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one vote for `path`.
    pub fn vote(&mut self, path: &str) {
        self.add(path, 1);
    }

    /// Add `increment` votes for `path`. Empty paths are ignored, so a
    /// sample that produced no candidate never votes.
    pub fn add(&mut self, path: &str, increment: i64) {
        if path.is_empty() {
            return;
        }
        // Linear scan keeps first-seen order; tables hold a handful of paths.
        match self.entries.iter_mut().find(|(p, _)| p == path) {
            Some((_, count)) => *count += increment,
            None => self.entries.push((path.to_string(), increment)),
        }
    }

    /// Fold another table in, preserving this table's order and appending
    /// paths it has not seen in `other`'s order.
    pub fn merge(&mut self, other: &VoteTable) {
        for (path, count) in &other.entries {
            self.add(path, *count);
        }
    }

    /// The entry with the greatest count; the first inserted wins ties.
    #[must_use]
    pub fn winner(&self) -> Option<(&str, i64)> {
        let mut best: Option<(&str, i64)> = None;
        for (path, count) in &self.entries {
            match best {
                Some((_, top)) if *count <= top => {}
                _ => best = Some((path.as_str(), *count)),
            }
        }
        best
    }

    /// Path of [`VoteTable::winner`], owned.
    #[must_use]
    pub fn winning_path(&self) -> Option<String> {
        self.winner().map(|(path, _)| path.to_string())
    }

    /// Entries sorted by descending count, stable on insertion order.
    #[must_use]
    pub fn ranked(&self) -> Vec<(String, i64)> {
        let mut ranked = self.entries.clone();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked
    }

    /// Votes for `path`, zero if unseen.
    #[must_use]
    pub fn get(&self, path: &str) -> i64 {
        self.entries
            .iter()
            .find(|(p, _)| p == path)
            .map_or(0, |(_, count)| *count)
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.entries.iter().map(|(p, c)| (p.as_str(), *c))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Index of the first maximum in `scores`, `None` when empty.
///
/// The per-sample counterpart of [`VoteTable::winner`].
#[must_use]
pub fn first_max(scores: &[i64]) -> Option<usize> {
    let mut best: Option<(usize, i64)> = None;
    for (i, score) in scores.iter().enumerate() {
        match best {
            Some((_, top)) if *score <= top => {}
            _ => best = Some((i, *score)),
        }
    }
    best.map(|(i, _)| i)
}
