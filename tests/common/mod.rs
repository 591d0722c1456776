//! A synthetic forum served from memory.
#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use forum_pathfinder::{FetchError, Fetcher};
use url::Url;

pub const HOST: &str = "https://forum.test";

pub const POST_SENTENCE: &str = "Full dump attached below. You must reply to view the hidden content. ";

pub fn listing_url(page: usize) -> String {
    format!("{HOST}/forum?page={page}")
}

pub fn thread_url(page: usize, row: usize) -> String {
    format!("{HOST}/thread/{page}-{row}")
}

pub fn thread_title(page: usize, row: usize) -> String {
    format!("Fresh database leak thread {page}-{row}")
}

pub fn post_body() -> String {
    POST_SENTENCE.repeat(6)
}

/// A listing page with `rows` thread rows, a one-row sidebar table and a
/// pager. The last page has no next link.
pub fn listing_page(page: usize, last_page: usize, rows: usize) -> String {
    let body: String = (0..rows)
        .map(|row| {
            format!(
                r#"<tr>
                    <td class="subject"><a class="topic" href="{}">{}</a></td>
                    <td class="by"><a href="{HOST}/user/{row}">u{row}</a></td>
                </tr>"#,
                thread_url(page, row),
                thread_title(page, row)
            )
        })
        .collect();
    let next = if page < last_page {
        format!(r#"<a class="next" href="{}">Next</a>"#, listing_url(page + 1))
    } else {
        String::new()
    };

    format!(
        r#"<html>
        <head><title>Forum</title><script>var page = {page};</script></head>
        <body>
            <nav><a href="https://ads.test/">Next offers</a></nav>
            <div class="wrap">
                <table class="threads"><tbody>{body}</tbody></table>
                <table class="online"><tbody><tr><td>3 users online</td></tr></tbody></table>
                <div class="pages"><span>1</span><a href="{}">2</a><a href="{}">3</a>{next}</div>
            </div>
        </body>
        </html>"#,
        listing_url(2),
        listing_url(3)
    )
}

pub fn thread_page(page: usize, row: usize) -> String {
    let title = thread_title(page, row);
    format!(
        r#"<html>
        <head><title>{title}</title><style>h1 {{ color: red; }}</style></head>
        <body>
            <nav><a href="{HOST}/">Home</a></nav>
            <h1 class="title">{title}</h1>
            <span class="when">5 March, 2024 - 3:15 PM</span>
            <p class="post">{}</p>
        </body>
        </html>"#,
        post_body()
    )
}

/// Serves fixed pages by URL and records every request.
#[derive(Default)]
pub struct FixtureFetcher {
    pages: HashMap<String, String>,
    failing_once: Mutex<HashSet<String>>,
    requests: Mutex<Vec<String>>,
}

impl FixtureFetcher {
    /// A forum of `pages` listing pages with `rows` threads each, every
    /// thread page included.
    pub fn forum(pages: usize, rows: usize) -> Self {
        let mut fetcher = Self::default();
        for page in 1..=pages {
            fetcher.pages.insert(listing_url(page), listing_page(page, pages, rows));
            for row in 0..rows {
                fetcher.pages.insert(thread_url(page, row), thread_page(page, row));
            }
        }
        fetcher
    }

    pub fn with_page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.to_string(), html.to_string());
        self
    }

    pub fn without(mut self, url: &str) -> Self {
        self.pages.remove(url);
        self
    }

    /// The first request for `url` fails, later ones succeed.
    pub fn failing_once(self, url: &str) -> Self {
        self.failing_once.lock().unwrap().insert(url.to_string());
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requested(&self, url: &str) -> usize {
        self.requests().iter().filter(|r| *r == url).count()
    }
}

impl Fetcher for FixtureFetcher {
    fn fetch(&self, url: &Url, _use_proxy: bool) -> Result<String, FetchError> {
        self.requests.lock().unwrap().push(url.to_string());
        if self.failing_once.lock().unwrap().remove(url.as_str()) {
            return Err(FetchError::Status(503));
        }
        self.pages.get(url.as_str()).cloned().ok_or(FetchError::Status(404))
    }
}
