//! Next-page classifier.
//!
//! Runs on a single listing page. Anchors score on next-page vocabulary in
//! their text, on sitting next to a run of page numbers, and on pointing back
//! to the origin's own host.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;
use url::Url;

use crate::dom::{self, Element, NodeRef};
use crate::options::Options;
use crate::path;
use crate::votes::first_max;

const BIG: i64 = 100;
const MEDIUM: i64 = 50;
const SMALL: i64 = 5;

/// Bounds on an ascending-digit run that looks like page numbers.
const PAGE_RUN: (usize, usize) = (2, 8);

/// An ascending run of digits, each at most once: `123`, `2345`, `0189`.
#[allow(clippy::expect_used)]
static ASCENDING_DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"0?1?2?3?4?5?6?7?8?9?").expect("ASCENDING_DIGITS regex"));

/// The discovered next-page control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NextPage {
    /// Structural path of the best anchor.
    pub path: String,
    /// `href` of the first node matching `path`, empty when it has none.
    pub link: String,
}

/// Find the next-page anchor on `html`.
///
/// With `origin`, anchors whose `href` does not mention the origin's host are
/// penalized. Returns `None` when the page has no anchors.
#[must_use]
pub fn find_next_page(html: &str, origin: Option<&Url>, options: &Options) -> Option<NextPage> {
    let doc = dom::parse(html);
    let anchors = dom::select_all(&doc, "a");
    let host = origin.and_then(Url::host_str);

    let scores: Vec<i64> = anchors
        .iter()
        .map(|anchor| score_anchor(anchor, host, &options.next_page_vocabulary))
        .collect();

    let best = first_max(&scores)?;
    let path = path::structural_path(&anchors[best], options.ancestor_precision);
    let link = link_at(&doc, &path).unwrap_or_default();

    debug!(%path, %link, score = scores[best], "next page anchor");
    Some(NextPage { path, link })
}

/// `href` of the first node matching `path`.
#[must_use]
pub fn link_at(doc: &dom::Document, path: &str) -> Option<String> {
    dom::select_first(doc, path).and_then(|node| node.attribute("href"))
}

fn score_anchor(anchor: &NodeRef, host: Option<&str>, vocabulary: &[String]) -> i64 {
    let mut score = 0;

    let siblings: String = anchor
        .element_siblings()
        .iter()
        .map(|sibling| sibling.full_text().trim().to_string())
        .collect();
    if contains_page_run(&siblings) {
        score += SMALL;
    }

    let text = anchor.full_text().to_lowercase();
    for term in vocabulary {
        if text.contains(&term.to_lowercase()) {
            score += BIG;
        } else {
            score -= MEDIUM;
        }
    }

    if let (Some(href), Some(host)) = (anchor.attribute("href"), host) {
        if !href.contains(host) {
            score -= BIG;
        }
    }

    score
}

fn contains_page_run(text: &str) -> bool {
    let (min, max) = PAGE_RUN;
    ASCENDING_DIGITS
        .find_iter(text)
        .any(|m| (min..=max).contains(&m.len()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGER: &str = r#"
        <div class="list"><a href="https://forum.test/t/1">Some thread title</a></div>
        <div class="pages">
            <span>1</span><a href="https://forum.test/p/2">2</a><a href="https://forum.test/p/3">3</a>
            <a class="next" href="https://forum.test/p/2">Next &raquo;</a>
        </div>"#;

    #[test]
    fn test_next_vocabulary_wins() {
        let origin = Url::parse("https://forum.test/").unwrap();

        let found = find_next_page(PAGER, Some(&origin), &Options::default()).unwrap();

        assert_eq!(found.path, "body div.pages a.next");
        assert_eq!(found.link, "https://forum.test/p/2");
    }

    #[test]
    fn test_foreign_host_is_penalized() {
        let html = r#"<div><a href="https://ads.test/next">next</a><a class="n" href="https://forum.test/p/2">next</a></div>"#;
        let origin = Url::parse("https://forum.test/").unwrap();

        let with_origin = find_next_page(html, Some(&origin), &Options::default()).unwrap();
        let without = find_next_page(html, None, &Options::default()).unwrap();

        assert_eq!(with_origin.path, "body div a.n");
        assert_eq!(without.path, "body div a");
    }

    #[test]
    fn test_relative_href_counts_as_foreign() {
        let html = r#"<div><a href="/p/2">next</a><a class="n" href="https://forum.test/p/2">next</a></div>"#;
        let origin = Url::parse("https://forum.test/").unwrap();

        let found = find_next_page(html, Some(&origin), &Options::default()).unwrap();

        assert_eq!(found.path, "body div a.n");
    }

    #[test]
    fn test_no_anchors() {
        assert_eq!(find_next_page("<p>nothing</p>", None, &Options::default()), None);
    }

    #[test]
    fn test_link_is_empty_without_href() {
        let found = find_next_page("<a>next page</a>", None, &Options::default()).unwrap();

        assert_eq!(found.path, "html body a");
        assert_eq!(found.link, "");
    }

    #[test]
    fn test_page_runs() {
        assert!(contains_page_run("123"));
        assert!(contains_page_run("page 45"));
        assert!(!contains_page_run("1"));
        assert!(!contains_page_run("987"));
        assert!(!contains_page_run("abc"));
    }
}
