//! # forum-pathfinder
//!
//! Selector-free structure discovery for forum thread listings.
//!
//! Given a few listing pages of a forum, this library finds the DOM paths of
//! the thread table, the thread links inside it, the next-page control, and
//! the title, description and publication date on thread pages. The paths
//! are stored as a [`PathProfile`] and replayed by the harvester without
//! scoring anything again.
//!
//! ## Quick Start
//!
//! ```rust
//! use forum_pathfinder::{find_thread_table, Options, SamplePage};
//!
//! let rows: String = (0..20)
//!     .map(|i| format!(r#"<tr><td><a href="/t/{i}">Thread number {i} in the forum</a></td></tr>"#))
//!     .collect();
//! let html = format!(r#"<html><body><table class="forum"><tbody>{rows}</tbody></table></body></html>"#);
//! let pages = vec![SamplePage::new("https://forum.test/", html)];
//!
//! let table = find_thread_table(&pages, &Options::default());
//! assert_eq!(table.as_deref(), Some("body table.forum tbody"));
//! ```
//!
//! ## Features
//!
//! - **Tree reduction**: strips scripts, styles, media and volatile attributes
//!   before anything is scored
//! - **Vote aggregation**: every sample page or thread casts one vote, the
//!   path with the most votes wins, ties go to the first seen
//! - **Discovery pipeline**: [`Explorer`] fetches, classifies, asks an
//!   [`Operator`] to confirm and writes the profile once
//! - **Harvesting**: [`Harvester`] replays stored profiles and collects new
//!   threads

mod error;
mod options;

/// DOM capability over dom_query nodes.
pub mod dom;

/// Structural path formatting.
pub mod path;

/// Good/bad word matching.
pub mod lexicon;

/// Date parsing and date likelihood scoring.
pub mod date;

/// Path vote tables and tie-breaking.
pub mod votes;

/// Noise removal before classification.
pub mod reduce;

/// The four structure classifiers.
pub mod classifier;

/// Origins, path profiles and harvested threads.
pub mod model;

/// Character encoding detection and transcoding.
pub mod encoding;

/// URL parsing, resolution and origin categorisation.
pub mod url_utils;

/// Page fetching over HTTP, Tor and rotating proxies.
pub mod fetch;

/// Record storage for origins, profiles and threads.
pub mod repository;

/// Operator confirmation and path overrides.
pub mod operator;

/// File-loaded application configuration.
pub mod config;

/// The discovery pipeline.
pub mod explore;

/// Replaying profiles to harvest threads.
pub mod harvest;

// Public API - re-exports
pub use classifier::{
    find_next_page, find_thread_fields, find_thread_link, find_thread_table, FieldPaths, NextPage, SamplePage,
    SampleThread,
};
pub use config::Config;
pub use error::{Error, Result};
pub use explore::{ExploreSettings, Explorer};
pub use fetch::{FetchError, Fetcher, HttpFetcher};
pub use harvest::{HarvestReport, HarvestSettings, Harvester};
pub use model::{Origin, OriginCategory, OriginId, PathProfile, ThreadRecord};
pub use operator::{AutoOperator, ConsoleOperator, Operator};
pub use options::Options;
pub use repository::{MemoryRepository, Repository};

/// Runs every classifier over pages and threads already in hand.
///
/// Nothing is fetched or stored. The next-page path comes from the first
/// listing page, using its URL as the origin. Thread fields are scored on
/// `threads` as given, so they should be pages linked from the discovered
/// table.
///
/// # Example
///
/// ```rust
/// use forum_pathfinder::{discover_paths, Options};
///
/// let profile = discover_paths(&[], &[], &Options::default());
/// assert_eq!(profile.table_body_path, None);
/// assert!(profile.is_auto_generated);
/// ```
#[must_use]
pub fn discover_paths(pages: &[SamplePage], threads: &[SampleThread], options: &Options) -> PathProfile {
    let next_page_path = pages.first().and_then(|first| {
        let origin = url::Url::parse(&first.url).ok();
        find_next_page(&first.html, origin.as_ref(), options)
            .map(|next| next.path)
            .filter(|path| !path.is_empty())
    });
    let table_body_path = find_thread_table(pages, options);
    let thread_link_path = table_body_path
        .as_deref()
        .and_then(|table| find_thread_link(pages, table, options));
    let fields = find_thread_fields(threads, options);

    PathProfile {
        next_page_path,
        table_body_path,
        thread_link_path,
        thread_title_path: fields.title,
        thread_description_path: fields.description,
        thread_publication_date_path: fields.date,
        is_auto_generated: true,
        origin_id: None,
    }
}
