//! Structure-discovery classifiers.
//!
//! Each classifier scores candidate elements on every sample independently,
//! keeps the best candidate per sample, and folds those winners into a
//! [`VoteTable`]. Samples are plain HTML strings; each worker parses its own
//! copy so scoring never shares a tree between threads.
//!
//! - [`table`]: the thread-listing container
//! - [`link`]: the row-relative thread link inside that container
//! - [`fields`]: title, description and date nodes of a thread page
//! - [`pagination`]: the next-page anchor of a listing page

pub mod fields;
pub mod link;
pub mod pagination;
pub mod table;

pub use fields::{find_thread_fields, rank_thread_fields, FieldPaths, FieldTables};
pub use link::{find_thread_link, rank_thread_links};
pub use pagination::{find_next_page, NextPage};
pub use table::{find_thread_table, rank_thread_tables};

use crate::votes::VoteTable;

/// A reduced listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SamplePage {
    pub url: String,
    pub html: String,
}

impl SamplePage {
    pub fn new(url: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            html: html.into(),
        }
    }
}

/// A reduced thread page and the title its listing row showed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleThread {
    pub title: String,
    pub html: String,
}

impl SampleThread {
    pub fn new(title: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            html: html.into(),
        }
    }
}

/// Run `score` over every sample on scoped threads and return the results in
/// sample order.
///
/// A single sample is scored inline. A panicking worker re-raises its panic
/// on the caller.
pub(crate) fn per_sample<T, R, F>(samples: &[T], score: F) -> Vec<R>
where
    T: Sync,
    R: Send,
    F: Fn(&T) -> R + Sync,
{
    if samples.len() <= 1 {
        return samples.iter().map(&score).collect();
    }

    let score = &score;
    std::thread::scope(|s| {
        let handles: Vec<_> = samples
            .iter()
            .map(|sample| s.spawn(move || score(sample)))
            .collect();

        handles
            .into_iter()
            .map(|handle| handle.join().unwrap_or_else(|panic| std::panic::resume_unwind(panic)))
            .collect()
    })
}

/// Fold per-sample winners into one table, in sample order.
pub(crate) fn tally<I>(winners: I) -> VoteTable
where
    I: IntoIterator<Item = Option<String>>,
{
    let mut table = VoteTable::new();
    for path in winners.into_iter().flatten() {
        table.vote(&path);
    }
    table
}
