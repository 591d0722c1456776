//! Discovery pipeline.
//!
//! Walks an origin's listing pages, runs the classifiers in dependency order
//! (pagination, table, link, then fields on sampled threads), lets the
//! operator confirm or override the field paths, and writes the resulting
//! [`PathProfile`] once at the end. Nothing is persisted if the run stops
//! early.

use tracing::{debug, info, warn};
use url::Url;

use crate::classifier::{self, FieldTables, SamplePage, SampleThread};
use crate::config::Config;
use crate::dom::{self, Element};
use crate::error::{Error, Result};
use crate::fetch::Fetcher;
use crate::model::{NewOrigin, OriginCategory, OriginId, PathProfile};
use crate::operator::{rank_candidates, Field, Operator, Preview};
use crate::options::Options;
use crate::reduce;
use crate::repository::Repository;
use crate::url_utils;

/// Per-run knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExploreSettings {
    /// Listing pages to collect before classifying.
    pub pages_to_analyze: usize,
    /// Thread pages to sample for the field classifier.
    pub max_sample_threads: usize,
    /// Ask the fetcher for proxy mode.
    pub use_proxy: bool,
}

impl Default for ExploreSettings {
    fn default() -> Self {
        Self {
            pages_to_analyze: 4,
            max_sample_threads: 8,
            use_proxy: false,
        }
    }
}

impl ExploreSettings {
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            pages_to_analyze: config.web.default_explore_number_of_pages,
            max_sample_threads: config.web.default_max_sample_threads,
            use_proxy: config.web.default_proxy_mode,
        }
    }
}

/// Discovers and stores the path profile of one origin at a time.
pub struct Explorer<'a, F: ?Sized, R: ?Sized, O: ?Sized> {
    fetcher: &'a F,
    repository: &'a R,
    operator: &'a O,
    options: &'a Options,
    settings: ExploreSettings,
}

impl<'a, F, R, O> Explorer<'a, F, R, O>
where
    F: Fetcher + ?Sized,
    R: Repository + ?Sized,
    O: Operator + ?Sized,
{
    pub fn new(
        fetcher: &'a F,
        repository: &'a R,
        operator: &'a O,
        options: &'a Options,
        settings: ExploreSettings,
    ) -> Self {
        Self {
            fetcher,
            repository,
            operator,
            options,
            settings,
        }
    }

    /// Discover the path profile of the origin at `start_url` and store it.
    pub fn explore(&self, start_url: &Url) -> Result<PathProfile> {
        let category = url_utils::category_of(start_url);
        let domain = url_utils::origin_domain(start_url);
        let existing = self.repository.find_origin(category, &domain)?;
        match &existing {
            Some(origin) => info!(origin = %origin.id, %domain, "origin already known, rediscovering paths"),
            None => info!(%domain, %category, "new origin"),
        }

        let (pages, next_page_path) = self.collect_listing_pages(start_url, category)?;
        info!(pages = pages.len(), "listing pages collected");

        let table_path = classifier::find_thread_table(&pages, self.options).ok_or(Error::NoTableFound)?;
        info!(%table_path, "thread table found");
        let link_path =
            classifier::find_thread_link(&pages, &table_path, self.options).ok_or(Error::NoThreadLinksFound)?;
        info!(%link_path, "thread link found");

        let samples = self.collect_threads(&pages, &format!("{table_path} {link_path}"), category);
        if samples.is_empty() {
            return Err(Error::NoThreadSamples);
        }
        info!(threads = samples.len(), "thread pages sampled");

        let tables = classifier::rank_thread_fields(&samples, self.options);
        let (fields, is_auto_generated) = self.settle_fields(&tables, &samples);

        let mut profile = PathProfile {
            next_page_path,
            table_body_path: Some(table_path),
            thread_link_path: Some(link_path),
            thread_title_path: fields[0].clone(),
            thread_description_path: fields[1].clone(),
            thread_publication_date_path: fields[2].clone(),
            is_auto_generated,
            origin_id: None,
        };
        for (field, path) in Field::ALL.iter().zip(&fields) {
            if path.is_none() {
                warn!(%field, "field not discoverable for this origin");
            }
        }

        let origin_id = self.store(existing.map(|o| o.id), domain, category, &mut profile)?;
        info!(origin = %origin_id, "path profile stored");
        Ok(profile)
    }

    /// Fetch the start page and follow the next-page control until enough
    /// pages are held. Returns the pages and the next-page path.
    fn collect_listing_pages(
        &self,
        start_url: &Url,
        category: OriginCategory,
    ) -> Result<(Vec<SamplePage>, Option<String>)> {
        let first = self.fetch_reduced(start_url, category).ok_or(Error::Aborted)?;
        let next = classifier::find_next_page(&first, Some(start_url), self.options);
        let next_page_path = next.as_ref().map(|n| n.path.clone()).filter(|p| !p.is_empty());
        if let Some(path) = &next_page_path {
            info!(%path, "next page control found");
        }

        let mut link = next.map(|n| n.link).unwrap_or_default();
        let mut current = start_url.clone();
        let mut visited = vec![start_url.clone()];
        let mut pages = vec![SamplePage::new(start_url.as_str(), first)];

        while pages.len() < self.settings.pages_to_analyze {
            let Some(url) = next_page_path
                .as_ref()
                .and_then(|_| url_utils::resolve_href(&link, &current))
            else {
                warn!(
                    requested = self.settings.pages_to_analyze,
                    found = pages.len(),
                    "ran out of listing pages"
                );
                break;
            };
            if visited.contains(&url) {
                warn!(%url, "next page loops back, stopping");
                break;
            }

            let html = self.fetch_reduced(&url, category).ok_or(Error::Aborted)?;
            link = next_page_path
                .as_deref()
                .and_then(|path| classifier::pagination::link_at(&dom::parse(&html), path))
                .unwrap_or_default();
            debug!(%url, progress = pages.len() + 1, "listing page added");

            pages.push(SamplePage::new(url.as_str(), html));
            visited.push(url.clone());
            current = url;
        }

        Ok((pages, next_page_path))
    }

    /// Fetch and reduce the threads linked from `pages`, deduplicated and
    /// capped. Declined fetch failures skip the thread.
    fn collect_threads(&self, pages: &[SamplePage], anchor_path: &str, category: OriginCategory) -> Vec<SampleThread> {
        let mut targets: Vec<(Url, String)> = Vec::new();
        'pages: for page in pages {
            let Ok(base) = Url::parse(&page.url) else {
                continue;
            };
            let doc = dom::parse(&page.html);
            for anchor in dom::select_all(&doc, anchor_path) {
                let Some(url) = anchor
                    .attribute("href")
                    .and_then(|href| url_utils::resolve_href(&href, &base))
                else {
                    continue;
                };
                if targets.iter().any(|(seen, _)| *seen == url) {
                    continue;
                }
                targets.push((url, anchor.full_text().trim().to_string()));
                if targets.len() >= self.settings.max_sample_threads {
                    break 'pages;
                }
            }
        }

        let mut samples = Vec::with_capacity(targets.len());
        for (url, title) in targets {
            match self.fetch_reduced(&url, category) {
                Some(html) => samples.push(SampleThread::new(title, html)),
                None => warn!(%url, "thread skipped"),
            }
        }
        samples
    }

    /// Winning field paths, or the operator's picks when the preview is
    /// rejected. The flag is false once the operator chose by hand.
    fn settle_fields(&self, tables: &FieldTables, samples: &[SampleThread]) -> ([Option<String>; 3], bool) {
        let winners = tables.winners();
        let auto = [winners.title.clone(), winners.description.clone(), winners.date.clone()];

        let Some(last) = samples.last() else {
            return (auto, true);
        };
        let preview = Preview::render(&last.html, &winners);
        if self.operator.confirm_results(&preview) {
            return (auto, true);
        }

        let mut chosen: [Option<String>; 3] = Default::default();
        for (slot, field) in chosen.iter_mut().zip(Field::ALL) {
            let table = match field {
                Field::Title => &tables.title,
                Field::Description => &tables.description,
                Field::Date => &tables.date,
            };
            let candidates = rank_candidates(field, table, &last.html);
            let choice = self.operator.choose_or_replace(field, &candidates);
            info!(%field, path = choice.path(), custom = choice.is_custom(), "operator choice");
            *slot = Some(choice.path().to_string()).filter(|p| !p.is_empty());
        }
        (chosen, false)
    }

    /// Write `profile` exactly once: insert for a new origin or an origin
    /// without a profile, update otherwise.
    fn store(
        &self,
        existing: Option<OriginId>,
        domain: String,
        category: OriginCategory,
        profile: &mut PathProfile,
    ) -> Result<OriginId> {
        let origin_id = match existing {
            Some(id) => id,
            None => self.repository.insert_origin(NewOrigin { domain, category })?,
        };
        profile.origin_id = Some(origin_id);

        if existing.is_some() && self.repository.get_path(origin_id)?.is_some() {
            self.repository.update_path(profile.clone())?;
        } else {
            if existing.is_some() {
                warn!(origin = %origin_id, "origin had no path profile, linking one");
            }
            self.repository.insert_path(profile.clone())?;
        }
        Ok(origin_id)
    }

    /// Fetch `url`, asking the operator about failures, and reduce it.
    /// `None` when the operator declines a retry.
    fn fetch_reduced(&self, url: &Url, category: OriginCategory) -> Option<String> {
        loop {
            match self.fetcher.fetch(url, self.settings.use_proxy) {
                Ok(body) => return Some(reduce::reduce(&body, category)),
                Err(error) => {
                    warn!(%url, %error, "fetch failed");
                    if !self.operator.retry_after_failure(url, &error) {
                        return None;
                    }
                }
            }
        }
    }
}
