//! Operator interface.
//!
//! Discovery never prompts from inside a classifier. It renders a
//! [`Preview`] of what the winning paths extract, ranks every candidate path
//! per field, and hands both to an [`Operator`] whose answers come back as
//! plain values.

use std::cell::RefCell;
use std::fmt;
use std::io::{self, BufRead, Write};

use chrono::NaiveDateTime;
use tracing::warn;
use url::Url;

use crate::classifier::FieldPaths;
use crate::date;
use crate::dom::{self, Document};
use crate::fetch::FetchError;
use crate::votes::VoteTable;

/// A thread field the operator may override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Title,
    Description,
    Date,
}

impl Field {
    pub const ALL: [Field; 3] = [Field::Title, Field::Description, Field::Date];
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Title => "title",
            Self::Description => "description",
            Self::Date => "publication date",
        })
    }
}

/// What the discovered field paths extract from one sample thread.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Preview {
    pub title: String,
    pub description: String,
    pub date: Option<NaiveDateTime>,
}

impl Preview {
    /// Extract each field from `thread_html` with its discovered path.
    #[must_use]
    pub fn render(thread_html: &str, paths: &FieldPaths) -> Self {
        let doc = dom::parse(thread_html);
        let text = |path: Option<&str>| {
            path.map(|p| dom::selector_text(&doc, p)).unwrap_or_default()
        };

        Self {
            title: text(paths.title.as_deref()),
            description: text(paths.description.as_deref()),
            date: paths.date.as_deref().and_then(|p| date::extract_date(&doc, p)),
        }
    }
}

impl fmt::Display for Preview {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Title: {}", self.title)?;
        writeln!(f, "Description: {}", self.description)?;
        match self.date {
            Some(date) => write!(f, "Date: {date}"),
            None => write!(f, "Date: (none)"),
        }
    }
}

/// One candidate path for a field, with its votes and what it extracts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedPath {
    pub path: String,
    pub votes: i64,
    pub preview: String,
}

/// Candidates for `field` from its vote table, most votes first, previewed
/// against `thread_html`.
#[must_use]
pub fn rank_candidates(field: Field, table: &VoteTable, thread_html: &str) -> Vec<RankedPath> {
    let doc = dom::parse(thread_html);
    table
        .ranked()
        .into_iter()
        .map(|(path, votes)| {
            let preview = preview_path(&doc, field, &path);
            RankedPath { path, votes, preview }
        })
        .collect()
}

fn preview_path(doc: &Document, field: Field, path: &str) -> String {
    let text = dom::selector_text(doc, path);
    if field != Field::Date {
        return text;
    }
    match date::extract_date(doc, path) {
        Some(date) => date.to_string(),
        None => format!("can't parse a date, text: {text}"),
    }
}

/// The operator's answer for one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Choice {
    /// One of the ranked candidates.
    Candidate(String),
    /// A path typed in by the operator.
    Custom(String),
}

impl Choice {
    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Self::Candidate(path) | Self::Custom(path) => path,
        }
    }

    #[must_use]
    pub fn is_custom(&self) -> bool {
        matches!(self, Self::Custom(_))
    }
}

/// Whoever confirms or overrides discovery results.
pub trait Operator {
    /// Accept the automatically discovered fields as previewed.
    fn confirm_results(&self, preview: &Preview) -> bool;

    /// Pick a path for `field` among `candidates` or supply a custom one.
    fn choose_or_replace(&self, field: Field, candidates: &[RankedPath]) -> Choice;

    /// Try `url` again after `error`. Declining gives up on that page.
    fn retry_after_failure(&self, url: &Url, error: &FetchError) -> bool;
}

/// Accepts every result and never retries.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoOperator;

impl Operator for AutoOperator {
    fn confirm_results(&self, _preview: &Preview) -> bool {
        true
    }

    fn choose_or_replace(&self, _field: Field, candidates: &[RankedPath]) -> Choice {
        candidates
            .first()
            .map_or_else(|| Choice::Custom(String::new()), |c| Choice::Candidate(c.path.clone()))
    }

    fn retry_after_failure(&self, _url: &Url, _error: &FetchError) -> bool {
        false
    }
}

/// Line-oriented prompts over any reader and writer.
///
/// On end of input or an I/O error every question takes its default: accept,
/// first candidate, no retry.
#[derive(Debug)]
pub struct ConsoleOperator<R, W> {
    input: RefCell<R>,
    output: RefCell<W>,
}

impl ConsoleOperator<io::StdinLock<'static>, io::Stdout> {
    /// Prompt on the process's stdin and stdout.
    #[must_use]
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> ConsoleOperator<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input: RefCell::new(input),
            output: RefCell::new(output),
        }
    }

    /// Consume the operator and return its writer.
    pub fn into_output(self) -> W {
        self.output.into_inner()
    }

    fn say(&self, text: &str) {
        let mut out = self.output.borrow_mut();
        if let Err(e) = writeln!(out, "{text}").and_then(|()| out.flush()) {
            warn!(error = %e, "operator output failed");
        }
    }

    fn ask(&self, prompt: &str) -> Option<String> {
        {
            let mut out = self.output.borrow_mut();
            if write!(out, "{prompt} ").and_then(|()| out.flush()).is_err() {
                return None;
            }
        }
        let mut line = String::new();
        match self.input.borrow_mut().read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim().to_string()),
        }
    }

    fn yes_no(&self, prompt: &str, default: bool) -> bool {
        let hint = if default { "[Y/n]" } else { "[y/N]" };
        match self.ask(&format!("{prompt} {hint}")) {
            Some(answer) => match answer.to_ascii_lowercase().as_str() {
                "y" | "yes" => true,
                "n" | "no" => false,
                _ => default,
            },
            None => default,
        }
    }
}

impl<R: BufRead, W: Write> Operator for ConsoleOperator<R, W> {
    fn confirm_results(&self, preview: &Preview) -> bool {
        self.say(&preview.to_string());
        self.yes_no("Do these results look good?", true)
    }

    fn choose_or_replace(&self, field: Field, candidates: &[RankedPath]) -> Choice {
        self.say(&format!("Candidates for the thread {field}:"));
        self.say("  0) enter a custom path");
        for (i, candidate) in candidates.iter().enumerate() {
            self.say(&format!("  {}) {} - {}", i + 1, candidate.votes, candidate.path));
            self.say(&format!("       {}", candidate.preview));
        }

        let fallback = AutoOperator.choose_or_replace(field, candidates);
        loop {
            let Some(answer) = self.ask("Select a path:") else {
                return fallback;
            };
            match answer.parse::<usize>() {
                Ok(0) => {
                    let Some(path) = self.ask("Custom path:") else {
                        return fallback;
                    };
                    if !path.is_empty() && self.yes_no(&format!("Use `{path}`?"), true) {
                        return Choice::Custom(path);
                    }
                }
                Ok(n) if n <= candidates.len() => {
                    return Choice::Candidate(candidates[n - 1].path.clone());
                }
                _ => self.say("Not a listed option."),
            }
        }
    }

    fn retry_after_failure(&self, url: &Url, error: &FetchError) -> bool {
        self.say(&format!("Fetching {url} failed: {error}"));
        self.yes_no("Retry and resume discovery?", false)
    }
}
