//! Tree Reducer
//!
//! Strips a fetched page down to its body before scoring: navigation chrome,
//! scripts, images, form controls and mobile-only variants are dropped, and
//! the noisy `id`, `on` and `style` attributes are removed so they cannot
//! leak into lexical scores.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::dom::{self, Document, Element, Selection};
use crate::model::OriginCategory;

/// Tags removed with their whole subtree.
const REMOVED_TAGS: &[&str] = &[
    "style", "header", "footer", "option", "nav", "input", "select", "img", "script", "link",
    "noscript", "iframe",
];

/// Attributes stripped from every remaining element. `on` is matched exactly,
/// not as an `on*` prefix.
const REMOVED_ATTRIBUTES: &[&str] = &["id", "on", "style"];

#[allow(clippy::expect_used)]
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("WHITESPACE regex"));

/// Reduce `html` to its primary content region.
///
/// `category` only tags the log line. Re-running on the output is a no-op.
#[must_use]
pub fn reduce(html: &str, category: OriginCategory) -> String {
    let doc = dom::parse(html);
    strip(&doc);

    let body = dom::outer_html(&doc.select("body"));
    let out = WHITESPACE.replace_all(&body, " ").trim().to_string();

    debug!(%category, before = html.len(), after = out.len(), "reduced page");
    out
}

/// Apply the reduction steps to a parsed document in place.
pub fn strip(doc: &Document) {
    if let Some(body) = dom::select_first(doc, "body") {
        for sibling in body.element_siblings() {
            Selection::from(sibling).remove();
        }
    }
    doc.select(&REMOVED_TAGS.join(", ")).remove();

    let all = doc.select("*");
    for name in REMOVED_ATTRIBUTES {
        all.remove_attr(name);
    }

    doc.select(r#"[class*="mobile"]"#).remove();
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<html><head><title>Forum</title><style>p{}</style></head>
        <body>
            <header>Logo</header>
            <nav><a href="/">Home</a></nav>
            <div id="main" class="content" style="color:red" on="x" onclick="go()">
                <p>Thread   list</p>
                <img src="a.png">
                <div class="menu-mobile">Mobile menu</div>
                <script>var x = 1;</script>
            </div>
            <footer>Bye</footer>
        </body></html>"#;

    #[test]
    fn test_reduce_removes_noise() {
        let out = reduce(PAGE, OriginCategory::Clearweb);

        assert!(out.starts_with("<body>"));
        assert!(out.contains("<p>Thread list</p>"));
        for gone in ["Logo", "Home", "Bye", "Mobile menu", "var x", "<img", "<title>", "p{}"] {
            assert!(!out.contains(gone), "{gone} should be removed: {out}");
        }
    }

    #[test]
    fn test_reduce_strips_exact_attributes_only() {
        let out = reduce(PAGE, OriginCategory::Clearweb);

        assert!(!out.contains("id="));
        assert!(!out.contains("style="));
        assert!(!out.contains(r#" on="x""#));
        // on* handlers are not in the removal set
        assert!(out.contains("onclick"));
        assert!(out.contains(r#"class="content""#));
    }

    #[test]
    fn test_reduce_is_idempotent() {
        let once = reduce(PAGE, OriginCategory::Darkweb);
        let twice = reduce(&once, OriginCategory::Darkweb);

        assert_eq!(once, twice);
    }

    #[test]
    fn test_reduce_tolerates_fragments() {
        let out = reduce("<td>loose <b>cell", OriginCategory::Clearweb);

        assert!(out.contains("loose"));
        assert!(out.contains("cell"));
    }
}
