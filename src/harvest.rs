//! Harvesting replay.
//!
//! Replays stored path profiles against their origins with no re-scoring:
//! listing pages are walked through the next-page path, each new thread is
//! fetched and its title, description and date read with the profile's
//! selectors.

use chrono::{Duration, Local, NaiveDateTime};
use tracing::{debug, info, warn};
use url::Url;

use crate::config::Config;
use crate::date;
use crate::dom::{self, Element};
use crate::error::Result;
use crate::fetch::Fetcher;
use crate::model::{Origin, OriginCategory, OriginId, PathProfile, ThreadRecord};
use crate::reduce;
use crate::repository::{DeadScore, Repository};
use crate::url_utils;

/// Per-run knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HarvestSettings {
    pub use_proxy: bool,
    /// Index of the thread link recorded as the origin's last checked URL.
    /// Skips pinned threads at the top of a listing.
    pub link_scan_offset: usize,
    /// Added to an origin's dead score on every failed fetch.
    pub origin_deadness_raise: i64,
    /// Listing pages walked per origin at most.
    pub max_listing_pages: usize,
    /// Minimum time between two dead-score resets of an origin.
    pub refresh_interval: Duration,
}

impl Default for HarvestSettings {
    fn default() -> Self {
        Self {
            use_proxy: false,
            link_scan_offset: 5,
            origin_deadness_raise: 1,
            max_listing_pages: 50,
            refresh_interval: Duration::hours(12),
        }
    }
}

impl HarvestSettings {
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            use_proxy: config.web.default_proxy_mode,
            link_scan_offset: config.web.link_scan_offset,
            origin_deadness_raise: config.web.origin_deadness_raise,
            refresh_interval: Duration::from_std(std::time::Duration::from_secs(config.web.check_history_offset_secs))
                .unwrap_or(Duration::MAX),
            ..Self::default()
        }
    }
}

/// Counters for one harvesting run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HarvestReport {
    /// Origins with a usable profile that were walked.
    pub origins_visited: usize,
    /// Origins whose first listing page could not be fetched.
    pub origins_unreachable: usize,
    /// Origins skipped for lack of a profile.
    pub origins_without_profile: usize,
    pub listing_pages: usize,
    pub threads_stored: usize,
    /// Already stored, unfetchable, or missing a title or description.
    pub threads_skipped: usize,
}

/// Replays path profiles to collect new threads.
pub struct Harvester<'a, F: ?Sized, R: ?Sized> {
    fetcher: &'a F,
    repository: &'a R,
    settings: HarvestSettings,
}

impl<'a, F, R> Harvester<'a, F, R>
where
    F: Fetcher + ?Sized,
    R: Repository + ?Sized,
{
    pub fn new(fetcher: &'a F, repository: &'a R, settings: HarvestSettings) -> Self {
        Self {
            fetcher,
            repository,
            settings,
        }
    }

    /// Harvest every origin of `category` that has a path profile.
    pub fn run(&self, category: OriginCategory) -> Result<HarvestReport> {
        self.run_at(category, Local::now().naive_local())
    }

    /// As [`Harvester::run`], with `now` as the refresh and crawl time.
    pub fn run_at(&self, category: OriginCategory, now: NaiveDateTime) -> Result<HarvestReport> {
        let mut report = HarvestReport::default();

        for origin in self.repository.origins_by_category(category)? {
            let profile = self.repository.get_path(origin.id)?;
            let Some((profile, anchors)) = profile.and_then(|p| p.thread_anchor_selector().map(|s| (p, s))) else {
                warn!(origin = %origin.id, domain = %origin.domain, "origin has no usable path profile, explore it first");
                report.origins_without_profile += 1;
                continue;
            };
            let start = match url_utils::parse_url(&origin.domain) {
                Ok(url) => url,
                Err(error) => {
                    warn!(origin = %origin.id, %error, "stored domain is not a URL");
                    report.origins_without_profile += 1;
                    continue;
                }
            };

            self.harvest_origin(&origin, &profile, &anchors, start, now, &mut report)?;
        }

        info!(
            %category,
            visited = report.origins_visited,
            stored = report.threads_stored,
            skipped = report.threads_skipped,
            "harvest finished"
        );
        Ok(report)
    }

    fn harvest_origin(
        &self,
        origin: &Origin,
        profile: &PathProfile,
        anchors: &str,
        start: Url,
        now: NaiveDateTime,
        report: &mut HarvestReport,
    ) -> Result<()> {
        let previous_last = origin.last_checked_url.as_deref();
        let mut current = start;
        let mut visited: Vec<Url> = Vec::new();

        while visited.len() < self.settings.max_listing_pages {
            let Some(html) = self.fetch_reduced(origin, &current)? else {
                if visited.is_empty() {
                    report.origins_unreachable += 1;
                }
                return Ok(());
            };
            if visited.is_empty() {
                self.refresh(origin, now)?;
                report.origins_visited += 1;
            }
            report.listing_pages += 1;

            let doc = dom::parse(&html);
            let links: Vec<Url> = dom::select_all(&doc, anchors)
                .iter()
                .filter_map(|a| a.attribute("href"))
                .filter_map(|href| url_utils::resolve_href(&href, &current))
                .collect();

            if visited.is_empty() {
                if let Some(marker) = links.get(self.settings.link_scan_offset) {
                    self.repository.update_last_url(origin.id, marker.as_str())?;
                    debug!(origin = %origin.id, %marker, "last checked url moved");
                }
            }

            let mut reached_last = false;
            for link in links {
                if previous_last == Some(link.as_str()) {
                    reached_last = true;
                    break;
                }
                self.harvest_thread(origin, profile, &link, now, report)?;
            }
            if reached_last {
                debug!(origin = %origin.id, "reached the previous harvest");
                return Ok(());
            }

            visited.push(current.clone());
            let next = profile
                .next_page_path
                .as_deref()
                .and_then(|path| crate::classifier::pagination::link_at(&doc, path))
                .and_then(|href| url_utils::resolve_href(&href, &current));
            match next {
                Some(url) if !visited.contains(&url) => current = url,
                _ => return Ok(()),
            }
        }

        warn!(origin = %origin.id, pages = visited.len(), "listing page cap reached");
        Ok(())
    }

    fn harvest_thread(
        &self,
        origin: &Origin,
        profile: &PathProfile,
        url: &Url,
        now: NaiveDateTime,
        report: &mut HarvestReport,
    ) -> Result<()> {
        if self.repository.thread_exists(url.as_str())? {
            report.threads_skipped += 1;
            return Ok(());
        }
        let Some(html) = self.fetch_reduced(origin, url)? else {
            report.threads_skipped += 1;
            return Ok(());
        };

        match extract_thread(&html, profile, url, origin.id, now) {
            Some(thread) => {
                debug!(%url, title = %thread.title, "thread stored");
                self.repository.insert_thread(thread)?;
                report.threads_stored += 1;
            }
            None => {
                debug!(%url, "thread has no title or description");
                report.threads_skipped += 1;
            }
        }
        Ok(())
    }

    /// Reset the dead score of a reachable origin, at most once per refresh
    /// interval.
    fn refresh(&self, origin: &Origin, now: NaiveDateTime) -> Result<()> {
        let stale = origin
            .last_refreshed
            .map_or(true, |at| now.signed_duration_since(at) > self.settings.refresh_interval);
        if !stale {
            debug!(origin = %origin.id, "refreshed recently, dead score kept");
            return Ok(());
        }

        self.repository.adjust_dead_score(origin.id, DeadScore::Set(0))?;
        self.repository.mark_refreshed(origin.id, now)?;
        debug!(origin = %origin.id, "dead score reset");
        Ok(())
    }

    /// Fetch and reduce `url`. A failure raises the origin's dead score and
    /// yields `None`.
    fn fetch_reduced(&self, origin: &Origin, url: &Url) -> Result<Option<String>> {
        match self.fetcher.fetch(url, self.settings.use_proxy) {
            Ok(body) => Ok(Some(reduce::reduce(&body, origin.category))),
            Err(error) => {
                let score = self
                    .repository
                    .adjust_dead_score(origin.id, DeadScore::Raise(self.settings.origin_deadness_raise))?;
                warn!(origin = %origin.id, %url, %error, dead_score = score, "fetch failed");
                Ok(None)
            }
        }
    }
}

/// Read a thread page with the profile's field paths.
///
/// `None` when the title or description is empty. The date is optional.
#[must_use]
pub fn extract_thread(
    html: &str,
    profile: &PathProfile,
    url: &Url,
    origin_id: OriginId,
    crawled: NaiveDateTime,
) -> Option<ThreadRecord> {
    let doc = dom::parse(html);
    let text_at = |path: &Option<String>| {
        path.as_deref()
            .map(|p| dom::selector_text(&doc, p))
            .unwrap_or_default()
    };

    let title = text_at(&profile.thread_title_path);
    let description = text_at(&profile.thread_description_path);
    if title.is_empty() || description.is_empty() {
        return None;
    }
    let published = profile
        .thread_publication_date_path
        .as_deref()
        .and_then(|p| date::extract_date(&doc, p));

    Some(ThreadRecord {
        url: url.to_string(),
        title,
        description,
        published,
        crawled,
        origin_id,
    })
}
