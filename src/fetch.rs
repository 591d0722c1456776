//! Page fetching.
//!
//! The classifiers never touch the network. Discovery and harvesting pull
//! page bodies through the [`Fetcher`] trait; [`HttpFetcher`] is the
//! blocking reqwest implementation used by the binary.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use reqwest::Proxy;
use tracing::debug;
use url::Url;

use crate::encoding;
use crate::url_utils;

const USER_AGENT: &str = concat!("forum-pathfinder/", env!("CARGO_PKG_VERSION"));
const MAX_REDIRECTS: usize = 10;

/// Why a page could not be fetched.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Transport failure: DNS, connect, TLS, timeout, body read.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("HTTP status {0}")]
    Status(u16),

    /// A proxy URL could not be configured.
    #[error("Proxy configuration error: {0}")]
    Proxy(String),
}

/// Source of raw page bodies.
pub trait Fetcher {
    /// Fetch `url` and return its body as text.
    ///
    /// `use_proxy` requests proxy mode. Anonymity-network hosts always go
    /// through the fixed local proxy regardless of the flag.
    fn fetch(&self, url: &Url, use_proxy: bool) -> Result<String, FetchError>;
}

/// Connection settings for [`HttpFetcher`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchSettings {
    /// Local anonymity-network proxy, e.g. `http://127.0.0.1:9053`.
    pub tor_proxy: String,
    /// Proxies rotated through in proxy mode.
    pub proxy_urls: Vec<String>,
    pub timeout: Duration,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            tor_proxy: "http://127.0.0.1:9053".to_string(),
            proxy_urls: Vec::new(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Blocking HTTP fetcher with a direct client, a Tor client and a rotating
/// proxy pool.
///
/// Invalid TLS certificates are accepted: self-signed certificates are the
/// norm on the forums this crawls.
#[derive(Debug)]
pub struct HttpFetcher {
    direct: Client,
    tor: Client,
    proxied: Vec<Client>,
    next_proxy: AtomicUsize,
}

impl HttpFetcher {
    pub fn new(settings: &FetchSettings) -> Result<Self, FetchError> {
        let direct = build_client(settings, None)?;
        let tor = build_client(settings, Some(&settings.tor_proxy))?;
        let proxied = settings
            .proxy_urls
            .iter()
            .filter(|url| !url.trim().is_empty())
            .map(|url| build_client(settings, Some(url)))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            direct,
            tor,
            proxied,
            next_proxy: AtomicUsize::new(0),
        })
    }

    fn client_for(&self, url: &Url, use_proxy: bool) -> &Client {
        if url_utils::is_onion(url) {
            return &self.tor;
        }
        if use_proxy && !self.proxied.is_empty() {
            let i = self.next_proxy.fetch_add(1, Ordering::Relaxed) % self.proxied.len();
            return &self.proxied[i];
        }
        &self.direct
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &Url, use_proxy: bool) -> Result<String, FetchError> {
        debug!(%url, use_proxy, "fetching");
        let response = self.client_for(url, use_proxy).get(url.as_str()).send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.bytes()?;

        Ok(encoding::decode_body(&body, content_type.as_deref()))
    }
}

fn build_client(settings: &FetchSettings, proxy: Option<&str>) -> Result<Client, FetchError> {
    let mut builder = Client::builder()
        .user_agent(USER_AGENT)
        .timeout(settings.timeout)
        .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
        .danger_accept_invalid_certs(true);

    if let Some(proxy) = proxy {
        let proxy = Proxy::all(proxy).map_err(|e| FetchError::Proxy(format!("{proxy}: {e}")))?;
        builder = builder.proxy(proxy);
    }

    Ok(builder.build()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_onion_hosts_always_use_tor() {
        let fetcher = HttpFetcher::new(&FetchSettings::default()).unwrap();
        let onion = Url::parse("http://abcdefghijklmnop.onion/").unwrap();

        assert!(std::ptr::eq(fetcher.client_for(&onion, false), &fetcher.tor));
        assert!(std::ptr::eq(fetcher.client_for(&onion, true), &fetcher.tor));
    }

    #[test]
    fn test_proxy_mode_without_proxies_goes_direct() {
        let fetcher = HttpFetcher::new(&FetchSettings::default()).unwrap();
        let url = Url::parse("https://forum.test/").unwrap();

        assert!(std::ptr::eq(fetcher.client_for(&url, true), &fetcher.direct));
    }

    #[test]
    fn test_proxy_rotation() {
        let settings = FetchSettings {
            proxy_urls: vec!["http://10.0.0.1:8080".into(), "http://10.0.0.2:8080".into()],
            ..FetchSettings::default()
        };
        let fetcher = HttpFetcher::new(&settings).unwrap();
        let url = Url::parse("https://forum.test/").unwrap();

        let first = fetcher.client_for(&url, true);
        let second = fetcher.client_for(&url, true);
        let third = fetcher.client_for(&url, true);

        assert!(std::ptr::eq(first, &fetcher.proxied[0]));
        assert!(std::ptr::eq(second, &fetcher.proxied[1]));
        assert!(std::ptr::eq(third, &fetcher.proxied[0]));
        assert!(std::ptr::eq(fetcher.client_for(&url, false), &fetcher.direct));
    }

    #[test]
    fn test_bad_proxy_url() {
        let settings = FetchSettings {
            tor_proxy: "not a url".to_string(),
            ..FetchSettings::default()
        };

        assert!(matches!(HttpFetcher::new(&settings), Err(FetchError::Proxy(_))));
    }
}
