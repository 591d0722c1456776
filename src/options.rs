//! Classifier calibration.
//!
//! The `Options` struct carries every dictionary and threshold the
//! classifiers read. It is passed explicitly into each call; nothing is read
//! from global state.

use crate::lexicon::Lexicon;
use crate::path::DEFAULT_PRECISION;

/// Default good words, biased toward data-breach forum vocabulary.
pub const DEFAULT_GOOD_WORDS: &[&str] = &[
    "data", "breach", "leak", "combo", "log", "list", "reply", "view", "replies", "topic",
    "title", "db", "csv", "database", "xls", "xlsx", "sql", ".com", "thread", "wallet", "email",
];

/// Default bad words. The duplicate is kept: it doubles the penalty.
pub const DEFAULT_BAD_WORDS: &[&str] = &["announcement", "news", "update", "avatar", "old", "avatar"];

/// Extra good words for the description axis of the field classifier.
pub const DESCRIPTION_HINT_WORDS: &[&str] = &["hidden", "content", "must", "view", "content"];

/// Next-page vocabulary of the pagination classifier.
pub const NEXT_PAGE_VOCABULARY: &[&str] = &["next", "avanti", "pagenav"];

/// Calibration for the structure-discovery classifiers.
///
/// All fields are public. Use `Default::default()` for the stock weights.
///
/// # Example
///
/// ```rust
/// use forum_pathfinder::Options;
///
/// let options = Options {
///     ancestor_precision: 4,
///     ..Options::default()
/// };
/// assert_eq!(options.row_bounds, (15, 40));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Words that make a candidate more likely to be forum content.
    pub good_words: Vec<String>,

    /// Words that make a candidate less likely to be forum content.
    pub bad_words: Vec<String>,

    /// Descriptors per structural path.
    ///
    /// Default: `3`
    pub ancestor_precision: usize,

    /// Exclusive bounds on the row count of a thread table.
    ///
    /// Default: `(15, 40)`
    pub row_bounds: (usize, usize),

    /// Anchor texts shorter than this are unlikely thread links.
    ///
    /// Default: `15`
    pub link_text_min: usize,

    /// Texts shorter than this lean toward titles and dates.
    ///
    /// Default: `60`
    pub short_text_max: usize,

    /// Description blobs longer than this lean toward descriptions.
    ///
    /// Default: `300`
    pub description_min: usize,

    /// Match cap for the title axis.
    ///
    /// Default: `Some(1)`
    pub title_match_cap: Option<usize>,

    /// Case-insensitive terms marking a next-page anchor.
    pub next_page_vocabulary: Vec<String>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            good_words: to_owned(DEFAULT_GOOD_WORDS),
            bad_words: to_owned(DEFAULT_BAD_WORDS),
            ancestor_precision: DEFAULT_PRECISION,
            row_bounds: (15, 40),
            link_text_min: 15,
            short_text_max: 60,
            description_min: 300,
            title_match_cap: Some(1),
            next_page_vocabulary: to_owned(NEXT_PAGE_VOCABULARY),
        }
    }
}

impl Options {
    /// Options with the given dictionaries and stock thresholds.
    #[must_use]
    pub fn with_words(good_words: Vec<String>, bad_words: Vec<String>) -> Self {
        Self {
            good_words,
            bad_words,
            ..Self::default()
        }
    }

    /// The good/bad dictionaries as a scorer.
    #[must_use]
    pub fn lexicon(&self) -> Lexicon {
        Lexicon::new(&self.good_words, &self.bad_words)
    }
}

fn to_owned(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| (*w).to_string()).collect()
}
