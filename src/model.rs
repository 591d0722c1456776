//! Persisted records.
//!
//! Origins, their discovered path profiles, and harvested thread records.
//! Everything here round-trips through serde so the in-memory repository
//! can snapshot itself to JSON.

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Kind of source an origin is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OriginCategory {
    /// Ordinary web forum.
    #[default]
    Clearweb,
    /// Messaging-platform channel.
    Messaging,
    /// Forum on an anonymity-network (`.onion`) host.
    Darkweb,
}

impl fmt::Display for OriginCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Clearweb => "clearweb",
            Self::Messaging => "messaging",
            Self::Darkweb => "darkweb",
        };
        f.write_str(name)
    }
}

/// Repository key of an origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OriginId(pub u64);

impl fmt::Display for OriginId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A tracked forum or channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Origin {
    pub id: OriginId,
    pub domain: String,
    pub category: OriginCategory,
    /// Consecutive fetch failures. Adjusted only by the harvester.
    pub dead_score: i64,
    /// Newest thread URL seen by the previous harvest.
    pub last_checked_url: Option<String>,
    /// When a harvest last reset the dead score.
    #[serde(default)]
    pub last_refreshed: Option<NaiveDateTime>,
}

/// An origin not yet stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrigin {
    pub domain: String,
    pub category: OriginCategory,
}

/// The six discovered selectors for an origin.
///
/// Any path may be absent: that feature is not discoverable for the origin,
/// which is not an error. `thread_link_path` is relative to a row of
/// `table_body_path`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathProfile {
    pub next_page_path: Option<String>,
    pub table_body_path: Option<String>,
    pub thread_link_path: Option<String>,
    pub thread_title_path: Option<String>,
    pub thread_description_path: Option<String>,
    pub thread_publication_date_path: Option<String>,
    /// False once an operator overrode any path.
    pub is_auto_generated: bool,
    pub origin_id: Option<OriginId>,
}

impl PathProfile {
    /// Selector for thread anchors on a listing page: the table path and the
    /// row-relative link path joined as a descendant selector.
    #[must_use]
    pub fn thread_anchor_selector(&self) -> Option<String> {
        match (&self.table_body_path, &self.thread_link_path) {
            (Some(table), Some(link)) => Some(format!("{table} {link}")),
            _ => None,
        }
    }
}

/// A harvested thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadRecord {
    pub url: String,
    pub title: String,
    pub description: String,
    pub published: Option<NaiveDateTime>,
    pub crawled: NaiveDateTime,
    pub origin_id: OriginId,
}
