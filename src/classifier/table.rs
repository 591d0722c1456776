//! Thread-table classifier.
//!
//! Candidates are the page's `tbody` elements, or every `div` when the page
//! has no table body. A candidate scores on whether its row count looks like
//! one page of a thread listing, plus the lexical signal of its rows.

use tracing::debug;

use super::{per_sample, tally, SamplePage};
use crate::dom::{self, Element, NodeRef, TagKind};
use crate::lexicon::Lexicon;
use crate::options::Options;
use crate::path;
use crate::votes::{first_max, VoteTable};

const ROW_POINTS: i64 = 100;
const WORD_POINTS: i64 = 5;

/// Votes per container path across `pages`.
#[must_use]
pub fn rank_thread_tables(pages: &[SamplePage], options: &Options) -> VoteTable {
    let lexicon = options.lexicon();
    let winners = per_sample(pages, |page| best_table(&page.html, options, &lexicon));
    let table = tally(winners);
    debug!(?table, "thread table votes");
    table
}

/// Path of the thread-listing container, `None` when no page had a candidate.
#[must_use]
pub fn find_thread_table(pages: &[SamplePage], options: &Options) -> Option<String> {
    rank_thread_tables(pages, options).winning_path()
}

fn best_table(html: &str, options: &Options, lexicon: &Lexicon) -> Option<String> {
    let doc = dom::parse(html);
    let mut candidates = dom::select_all(&doc, "tbody");
    if candidates.is_empty() {
        candidates = dom::select_all(&doc, "div");
    }

    let scores: Vec<i64> = candidates
        .iter()
        .map(|candidate| score_candidate(candidate, options, lexicon))
        .collect();

    let best = first_max(&scores)?;
    Some(path::structural_path(&candidates[best], options.ancestor_precision))
}

/// Score one container candidate.
pub(crate) fn score_candidate(candidate: &NodeRef, options: &Options, lexicon: &Lexicon) -> i64 {
    if candidate.child_elements().is_empty() {
        return -ROW_POINTS;
    }

    let rows = rows_of(candidate);
    let (min, max) = options.row_bounds;
    let mut score = if rows.len() > min && rows.len() < max {
        ROW_POINTS
    } else {
        -ROW_POINTS
    };

    // Every child's text, but only the first child's attributes
    let mut blob = String::new();
    for row in &rows {
        let children = row.child_elements();
        for child in &children {
            blob.push_str(&child.full_text());
        }
        if let Some(first) = children.first() {
            blob.push_str(&first.attribute_values().concat());
        }
    }

    score += lexicon.score(&blob, WORD_POINTS, -WORD_POINTS, None);
    score
}

/// Rows of a container: `tr` descendants of a table body, direct `div`
/// children of anything else.
fn rows_of<'a>(candidate: &NodeRef<'a>) -> Vec<NodeRef<'a>> {
    if candidate.tag_kind() == TagKind::TableBody {
        dom::select_within(candidate, "tr")
    } else {
        candidate
            .child_elements()
            .into_iter()
            .filter(|child| child.tag_kind() == TagKind::Div)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(count: usize, cell: &str) -> String {
        (0..count)
            .map(|i| format!(r#"<tr><td class="subject">{cell} {i}</td></tr>"#))
            .collect()
    }

    #[test]
    fn test_row_count_window_is_exclusive() {
        let options = Options::with_words(Vec::new(), Vec::new());
        let lexicon = options.lexicon();

        for (count, expected) in [(15, -100), (16, 100), (39, 100), (40, -100)] {
            let html = format!("<table><tbody>{}</tbody></table>", rows(count, "x"));
            let doc = dom::parse(&html);
            let tbody = dom::select_first(&doc, "tbody").unwrap();

            assert_eq!(score_candidate(&tbody, &options, &lexicon), expected, "{count} rows");
        }
    }

    #[test]
    fn test_childless_candidate() {
        let options = Options::default();
        let doc = dom::parse("<div>only text</div>");
        let div = dom::select_first(&doc, "div").unwrap();

        assert_eq!(score_candidate(&div, &options, &options.lexicon()), -100);
    }

    #[test]
    fn test_div_fallback_uses_direct_div_rows() {
        let row_divs: String = (0..20)
            .map(|i| format!(r#"<div class="row"><span>leak {i}</span></div>"#))
            .collect();
        let html = format!(r#"<div class="listing">{row_divs}</div><div class="side"><p>news</p></div>"#);
        let pages = vec![SamplePage::new("http://f.test/", html)];

        let found = find_thread_table(&pages, &Options::default());

        assert_eq!(found.as_deref(), Some("html body div.listing"));
    }

    #[test]
    fn test_no_candidates() {
        let pages = vec![SamplePage::new("http://f.test/", "")];

        assert_eq!(find_thread_table(&pages, &Options::default()), None);
        assert_eq!(find_thread_table(&[], &Options::default()), None);
    }
}
