//! URL helpers.
//!
//! Parsing start URLs, resolving the relative hrefs found by replayed paths,
//! and telling anonymity-network hosts apart from clearweb ones.

use url::Url;

use crate::error::{Error, Result};
use crate::model::OriginCategory;

/// Host suffix of anonymity-network services.
pub const ONION_SUFFIX: &str = ".onion";

/// Parse an absolute `http(s)` URL with a host.
pub fn parse_url(s: &str) -> Result<Url> {
    let s = s.trim();
    let url = Url::parse(s).map_err(|e| Error::InvalidUrl(format!("{s}: {e}")))?;

    if !matches!(url.scheme(), "http" | "https") || url.host().is_none() {
        return Err(Error::InvalidUrl(format!("{s}: not an http(s) URL with a host")));
    }
    Ok(url)
}

/// Resolve an `href` against the page it was found on.
///
/// Empty hrefs, bare fragments and `javascript:`/`mailto:` links resolve to
/// nothing.
#[must_use]
pub fn resolve_href(href: &str, base: &Url) -> Option<Url> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }
    let lower = href.to_ascii_lowercase();
    if lower.starts_with("javascript:") || lower.starts_with("mailto:") {
        return None;
    }

    let mut url = base.join(href).ok()?;
    url.set_fragment(None);
    Some(url)
}

/// Lowercase host of `url`.
#[must_use]
pub fn hostname(url: &Url) -> Option<String> {
    url.host_str().map(str::to_ascii_lowercase)
}

/// Whether `url` points at an anonymity-network host.
#[must_use]
pub fn is_onion(url: &Url) -> bool {
    hostname(url).is_some_and(|host| host.ends_with(ONION_SUFFIX))
}

/// Category of an origin reached through `url`: darkweb for `.onion` hosts,
/// clearweb otherwise.
#[must_use]
pub fn category_of(url: &Url) -> OriginCategory {
    if is_onion(url) {
        OriginCategory::Darkweb
    } else {
        OriginCategory::Clearweb
    }
}

/// Key an origin is stored under: the start URL without its fragment.
#[must_use]
pub fn origin_domain(url: &Url) -> String {
    let mut url = url.clone();
    url.set_fragment(None);
    url.to_string()
}
