//! Thread-link classifier.
//!
//! Given the winning container path, finds the path of the thread link
//! relative to a row. Votes are taken twice: each row's best anchor votes
//! into a page table, and each page's winner votes into the result.

use tracing::debug;

use super::{per_sample, tally, SamplePage};
use crate::dom::{self, Element, NodeRef, TagKind};
use crate::lexicon::Lexicon;
use crate::options::Options;
use crate::path;
use crate::votes::{first_max, VoteTable};

const SHORT_TEXT_PENALTY: i64 = 50;
const WORD_POINTS: i64 = 5;

/// Votes per row-relative link path across `pages`.
#[must_use]
pub fn rank_thread_links(pages: &[SamplePage], table_path: &str, options: &Options) -> VoteTable {
    let lexicon = options.lexicon();
    let winners = per_sample(pages, |page| {
        best_link_on_page(&page.html, table_path, options, &lexicon).winning_path()
    });
    let table = tally(winners);
    debug!(?table, "thread link votes");
    table
}

/// Row-relative path of the thread link, `None` when no row had an anchor.
#[must_use]
pub fn find_thread_link(pages: &[SamplePage], table_path: &str, options: &Options) -> Option<String> {
    rank_thread_links(pages, table_path, options).winning_path()
}

/// Per-row votes for one page.
fn best_link_on_page(html: &str, table_path: &str, options: &Options, lexicon: &Lexicon) -> VoteTable {
    let doc = dom::parse(html);
    let mut page_votes = VoteTable::new();

    for row in rows(&doc, table_path) {
        let anchors = dom::select_within(&row, "a");
        let scores: Vec<i64> = anchors
            .iter()
            .map(|anchor| score_anchor(anchor, options, lexicon))
            .collect();

        if let Some(best) = first_max(&scores) {
            page_votes.vote(&path::row_relative_path(&anchors[best], options.ancestor_precision));
        }
    }

    page_votes
}

/// Rows under every node matching `table_path`: `tr` descendants when the
/// path names a table body, direct `div` children otherwise.
fn rows<'a>(doc: &'a dom::Document, table_path: &str) -> Vec<NodeRef<'a>> {
    let containers = dom::select_all(doc, table_path);
    if table_path.contains("tbody") {
        containers
            .iter()
            .flat_map(|container| dom::select_within(container, "tr"))
            .collect()
    } else {
        containers
            .iter()
            .flat_map(Element::child_elements)
            .filter(|child| child.tag_kind() == TagKind::Div)
            .collect()
    }
}

fn score_anchor(anchor: &NodeRef, options: &Options, lexicon: &Lexicon) -> i64 {
    let text = anchor.full_text();
    let mut score = 0;
    if text.chars().count() < options.link_text_min {
        score -= SHORT_TEXT_PENALTY;
    }

    let blob = text + &anchor.attribute_values().concat();
    score + lexicon.score(&blob, WORD_POINTS, -WORD_POINTS, None)
}
