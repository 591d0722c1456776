//! Lexical Scoring
//!
//! Scores free text against weighted good/bad keyword dictionaries. Matching
//! is a case-insensitive, non-overlapping substring count per dictionary word.

/// A pair of keyword dictionaries, lowercased once at construction.
///
/// Empty words are dropped: an empty pattern would match between every
/// character.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Lexicon {
    good: Vec<String>,
    bad: Vec<String>,
}

impl Lexicon {
    /// Build a lexicon from good and bad word lists.
    #[must_use]
    pub fn new<G, B>(good: G, bad: B) -> Self
    where
        G: IntoIterator,
        G::Item: AsRef<str>,
        B: IntoIterator,
        B::Item: AsRef<str>,
    {
        Self {
            good: normalize(good),
            bad: normalize(bad),
        }
    }

    /// A copy of this lexicon with extra good words appended.
    #[must_use]
    pub fn with_good<I>(&self, extra: I) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut good = self.good.clone();
        good.extend(normalize(extra));
        Self {
            good,
            bad: self.bad.clone(),
        }
    }

    /// Good words, lowercased.
    #[must_use]
    pub fn good_words(&self) -> &[String] {
        &self.good
    }

    /// Bad words, lowercased.
    #[must_use]
    pub fn bad_words(&self) -> &[String] {
        &self.bad
    }

    /// Score `text` against both dictionaries.
    ///
    /// Every good-word match adds `good_points` and every bad-word match adds
    /// `bad_points` (callers pass a negative value to penalize).
    ///
    /// With `match_cap`, a good word contributes its full match count only when
    /// that count is strictly below the cap, and contributes nothing otherwise.
    /// A word matching three times under a cap of five adds `3 * good_points`;
    /// under a cap of one only zero-match words pass, so good words add nothing.
    #[must_use]
    pub fn score(&self, text: &str, good_points: i64, bad_points: i64, match_cap: Option<usize>) -> i64 {
        if text.is_empty() {
            return 0;
        }
        let haystack = text.to_lowercase();

        let good: i64 = self
            .good
            .iter()
            .map(|word| {
                let matches = count_matches(&haystack, word);
                match match_cap {
                    Some(cap) if matches >= cap => 0,
                    _ => matches as i64 * good_points,
                }
            })
            .sum();

        let bad: i64 = self
            .bad
            .iter()
            .map(|word| count_matches(&haystack, word) as i64 * bad_points)
            .sum();

        good + bad
    }
}

fn normalize<I>(words: I) -> Vec<String>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    words
        .into_iter()
        .map(|w| w.as_ref().to_lowercase())
        .filter(|w| !w.is_empty())
        .collect()
}

#[inline]
fn count_matches(haystack: &str, word: &str) -> usize {
    haystack.matches(word).count()
}
