//! Thread-field classifier.
//!
//! Scores every block-ish element of an opened thread on three axes at once
//! (title, description, publication date) and votes each axis's winner
//! separately. Any axis may come back empty while the others resolve.

use chrono::{Local, NaiveDateTime};
use tracing::debug;

use super::{per_sample, SampleThread};
use crate::date;
use crate::dom::{self, Element, NodeRef, TagKind};
use crate::lexicon::Lexicon;
use crate::options::{Options, DESCRIPTION_HINT_WORDS};
use crate::path;
use crate::votes::{first_max, VoteTable};

/// Elements considered on a thread page.
pub const FIELD_CANDIDATES: &str = "h1, h2, p, pre, span, abbr, section, div, article";

const BIG: i64 = 100;
const MEDIUM: i64 = 50;
const SMALL: i64 = 5;

/// Passes over direct children when building a description blob.
const DESCRIPTION_PASSES: usize = 2;

/// Vote tables per field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldTables {
    pub title: VoteTable,
    pub description: VoteTable,
    pub date: VoteTable,
}

impl FieldTables {
    /// The winning path of each table.
    #[must_use]
    pub fn winners(&self) -> FieldPaths {
        FieldPaths {
            title: self.title.winning_path(),
            description: self.description.winning_path(),
            date: self.date.winning_path(),
        }
    }
}

/// Discovered paths for the three thread fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldPaths {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<String>,
}

/// Vote tables for title, description and date across `samples`.
#[must_use]
pub fn rank_thread_fields(samples: &[SampleThread], options: &Options) -> FieldTables {
    rank_thread_fields_at(samples, options, Local::now().naive_local())
}

/// As [`rank_thread_fields`], judging dates relative to `now`.
#[must_use]
pub fn rank_thread_fields_at(samples: &[SampleThread], options: &Options, now: NaiveDateTime) -> FieldTables {
    let lexicon = options.lexicon();
    let winners = per_sample(samples, |sample| best_fields(sample, options, &lexicon, now));

    let mut tables = FieldTables::default();
    for paths in winners {
        if let Some(path) = paths.title {
            tables.title.vote(&path);
        }
        if let Some(path) = paths.description {
            tables.description.vote(&path);
        }
        if let Some(path) = paths.date {
            tables.date.vote(&path);
        }
    }

    debug!(title = ?tables.title, description = ?tables.description, date = ?tables.date, "thread field votes");
    tables
}

/// Winning title, description and date paths across `samples`.
#[must_use]
pub fn find_thread_fields(samples: &[SampleThread], options: &Options) -> FieldPaths {
    rank_thread_fields(samples, options).winners()
}

/// Per-axis scores for one element.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct AxisScores {
    title: i64,
    description: i64,
    date: i64,
}

fn best_fields(sample: &SampleThread, options: &Options, lexicon: &Lexicon, now: NaiveDateTime) -> FieldPaths {
    let doc = dom::parse(&sample.html);
    let candidates = dom::select_all(&doc, FIELD_CANDIDATES);

    let title_words: Vec<&str> = sample.title.trim().split(' ').collect();
    let title_lexicon = lexicon.with_good(&title_words);
    let description_lexicon = lexicon.with_good(DESCRIPTION_HINT_WORDS).with_good(&title_words);

    let scores: Vec<AxisScores> = candidates
        .iter()
        .map(|el| score_element(el, options, &title_lexicon, &description_lexicon, now))
        .collect();

    let winner = |axis: fn(&AxisScores) -> i64| {
        let column: Vec<i64> = scores.iter().map(axis).collect();
        first_max(&column).map(|i| path::structural_path(&candidates[i], options.ancestor_precision))
    };

    FieldPaths {
        title: winner(|s| s.title),
        description: winner(|s| s.description),
        date: winner(|s| s.date),
    }
}

fn score_element(
    el: &NodeRef,
    options: &Options,
    title_lexicon: &Lexicon,
    description_lexicon: &Lexicon,
    now: NaiveDateTime,
) -> AxisScores {
    let kind = el.tag_kind();
    let mut scores = tag_prior(kind);

    let text = visible_text(el, kind);
    if text.chars().count() < options.short_text_max {
        scores.title += MEDIUM;
        scores.date += MEDIUM;
    }

    scores.title += title_lexicon.score(&text, SMALL, -SMALL, options.title_match_cap);

    // Bad words add here too
    let blob = description_blob(el);
    scores.description += if blob.chars().count() > options.description_min {
        BIG
    } else {
        -BIG
    };
    scores.description += description_lexicon.score(&blob, SMALL, SMALL, None);

    scores.date += date::score_at(&el.own_text(), now);
    scores
}

fn tag_prior(kind: TagKind) -> AxisScores {
    match kind {
        TagKind::Heading => AxisScores {
            title: BIG,
            description: -BIG,
            date: -BIG,
        },
        TagKind::Span => AxisScores {
            title: MEDIUM,
            description: -MEDIUM,
            date: MEDIUM,
        },
        TagKind::Paragraph => AxisScores {
            description: MEDIUM,
            ..AxisScores::default()
        },
        TagKind::Abbr => AxisScores {
            date: BIG,
            ..AxisScores::default()
        },
        _ => AxisScores::default(),
    }
}

/// Trimmed text of an element. A `div` counts only its direct `p`, `pre` and
/// `section` children.
fn visible_text(el: &NodeRef, kind: TagKind) -> String {
    let text = if kind == TagKind::Div {
        el.child_elements()
            .iter()
            .filter(|child| child.tag_kind() == TagKind::Paragraph)
            .map(Element::full_text)
            .collect::<String>()
    } else {
        el.full_text()
    };
    text.trim().to_string()
}

/// Own direct text followed by every direct child's own text, the children
/// repeated once per pass.
fn description_blob(el: &NodeRef) -> String {
    let mut blob = el.own_text();
    let children = el.child_elements();
    for _ in 0..DESCRIPTION_PASSES {
        for child in &children {
            blob.push_str(&child.own_text());
        }
    }
    blob
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap()
    }

    #[test]
    fn test_heading_and_long_paragraph() {
        let body = "Here is the full package. You must reply to view the hidden content. ".repeat(6);
        let html = format!(r#"<h1 class="title">Big combo list</h1><p class="post">{body}</p>"#);
        let samples = vec![SampleThread::new("Big combo list", html)];

        let found = rank_thread_fields_at(&samples, &Options::default(), now()).winners();

        assert_eq!(found.title.as_deref(), Some("html body h1.title"));
        assert_eq!(found.description.as_deref(), Some("html body p.post"));
    }

    #[test]
    fn test_date_axis_prefers_direct_timestamp() {
        let html = r#"
            <h1>Thread</h1>
            <div class="meta"><span class="by">posted by someone</span><abbr class="when">05/03/2024 15:15</abbr></div>"#;
        let samples = vec![SampleThread::new("Thread", html)];

        let found = rank_thread_fields_at(&samples, &Options::default(), now()).winners();

        assert_eq!(found.date.as_deref(), Some("body div.meta abbr.when"));
    }

    #[test]
    fn test_div_text_is_paragraph_children_only() {
        let doc = dom::parse(r#"<div><span>skip</span><p>keep</p><pre> this </pre></div>"#);
        let div = dom::select_first(&doc, "div").unwrap();

        assert_eq!(visible_text(&div, TagKind::Div), "keep this");
    }

    #[test]
    fn test_description_blob_repeats_children() {
        let doc = dom::parse(r#"<div>own<p>a<b>deep</b></p><p>b</p></div>"#);
        let div = dom::select_first(&doc, "div").unwrap();

        assert_eq!(description_blob(&div), "ownabab");
    }

    #[test]
    fn test_empty_page_has_no_fields() {
        let samples = vec![SampleThread::new("x", "")];

        let found = find_thread_fields(&samples, &Options::default());

        assert_eq!(found, FieldPaths::default());
    }

    #[test]
    fn test_votes_accumulate_per_field() {
        let html = r#"<h2 class="t">Short title</h2>"#;
        let samples = vec![SampleThread::new("Short title", html); 3];

        let tables = rank_thread_fields_at(&samples, &Options::default(), now());

        assert_eq!(tables.title.get("html body h2.t"), 3);
        assert_eq!(tables.description.get("html body h2.t"), 3);
    }
}
