//! DOM Capability Adapter
//!
//! Classifiers only need a handful of operations on a parsed page: tag shape,
//! class and attribute lookup, text (full or own), children, parent, and
//! siblings. This module names those operations once, as the [`Element`]
//! trait over `dom_query::NodeRef`, and classifies tag names into the closed
//! [`TagKind`] set the scoring passes dispatch on.

// Re-export core types for external use
pub use dom_query::{Document, NodeRef, Selection};

// Re-export StrTendril for external use
pub use tendril::StrTendril;

/// Tag shapes the scoring passes distinguish.
///
/// Anything outside the classifier allow-lists is `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagKind {
    /// `h1`, `h2`
    Heading,
    /// `span`
    Span,
    /// `p`, `pre`, `section`
    Paragraph,
    /// `abbr`
    Abbr,
    /// `div`
    Div,
    /// `article`
    Article,
    /// `a`
    Anchor,
    /// `tbody`
    TableBody,
    /// `tr`
    TableRow,
    /// Everything else
    Other,
}

impl TagKind {
    /// Classify a lowercase tag name.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name {
            "h1" | "h2" => Self::Heading,
            "span" => Self::Span,
            "p" | "pre" | "section" => Self::Paragraph,
            "abbr" => Self::Abbr,
            "div" => Self::Div,
            "article" => Self::Article,
            "a" => Self::Anchor,
            "tbody" => Self::TableBody,
            "tr" => Self::TableRow,
            _ => Self::Other,
        }
    }
}

/// The element operations the classifiers are written against.
pub trait Element: Sized {
    /// Lowercase tag name, empty for non-element nodes.
    fn tag(&self) -> String;

    /// Closed tag classification of [`Element::tag`].
    fn tag_kind(&self) -> TagKind {
        TagKind::from_name(&self.tag())
    }

    /// Raw `class` attribute.
    fn class_attr(&self) -> Option<String>;

    /// Any attribute value.
    fn attribute(&self, name: &str) -> Option<String>;

    /// All attribute values in markup order.
    fn attribute_values(&self) -> Vec<String>;

    /// Text of the element and all descendants.
    fn full_text(&self) -> String;

    /// Concatenated direct text-node children only.
    fn own_text(&self) -> String;

    /// Direct element children.
    fn child_elements(&self) -> Vec<Self>;

    /// Parent element, `None` at the document root.
    fn parent_element(&self) -> Option<Self>;

    /// Element siblings, excluding self.
    fn element_siblings(&self) -> Vec<Self>;
}

impl<'a> Element for NodeRef<'a> {
    fn tag(&self) -> String {
        if !self.is_element() {
            return String::new();
        }
        self.node_name()
            .map(|t| t.to_ascii_lowercase())
            .unwrap_or_default()
    }

    fn class_attr(&self) -> Option<String> {
        self.attr("class").map(|s| s.to_string())
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.attr(name).map(|s| s.to_string())
    }

    fn attribute_values(&self) -> Vec<String> {
        self.attrs()
            .iter()
            .map(|attr| attr.value.to_string())
            .collect()
    }

    fn full_text(&self) -> String {
        self.text().to_string()
    }

    fn own_text(&self) -> String {
        self.children()
            .iter()
            .filter(|child| child.is_text())
            .map(|child| child.text().to_string())
            .collect()
    }

    fn child_elements(&self) -> Vec<Self> {
        self.children()
            .into_iter()
            .filter(NodeRef::is_element)
            .collect()
    }

    fn parent_element(&self) -> Option<Self> {
        self.parent().filter(NodeRef::is_element)
    }

    fn element_siblings(&self) -> Vec<Self> {
        let Some(parent) = self.parent() else {
            return Vec::new();
        };
        parent
            .children()
            .into_iter()
            .filter(|sibling| sibling.is_element() && sibling.id != self.id)
            .collect()
    }
}

// === Parsing and Querying ===

/// Parse an HTML string into a document.
///
/// Malformed markup is tolerated; html5ever always produces a tree.
#[inline]
#[must_use]
pub fn parse(html: &str) -> Document {
    Document::from(html)
}

/// All elements matching a CSS selector, in document order.
///
/// An invalid selector (for example a persisted path whose class names are
/// not valid CSS identifiers) yields an empty list.
#[must_use]
pub fn select_all<'a>(doc: &'a Document, selector: &str) -> Vec<NodeRef<'a>> {
    if selector.trim().is_empty() {
        return Vec::new();
    }
    doc.try_select(selector)
        .map(|sel| sel.nodes().to_vec())
        .unwrap_or_default()
}

/// First element matching a CSS selector.
#[must_use]
pub fn select_first<'a>(doc: &'a Document, selector: &str) -> Option<NodeRef<'a>> {
    select_all(doc, selector).into_iter().next()
}

/// Descendants of `node` matching a CSS selector.
#[must_use]
pub fn select_within<'a>(node: &NodeRef<'a>, selector: &str) -> Vec<NodeRef<'a>> {
    Selection::from(*node)
        .try_select(selector)
        .map(|sel| sel.nodes().to_vec())
        .unwrap_or_default()
}

/// Serialized HTML of a selection, the element itself included.
#[inline]
#[must_use]
pub fn outer_html(sel: &Selection) -> StrTendril {
    sel.html()
}

/// Trimmed text of every element matching `selector`, concatenated.
///
/// Used to preview and replay persisted paths.
#[must_use]
pub fn selector_text(doc: &Document, selector: &str) -> String {
    select_all(doc, selector)
        .iter()
        .map(Element::full_text)
        .collect::<String>()
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_kind_classification() {
        assert_eq!(TagKind::from_name("h1"), TagKind::Heading);
        assert_eq!(TagKind::from_name("h2"), TagKind::Heading);
        assert_eq!(TagKind::from_name("h3"), TagKind::Other);
        assert_eq!(TagKind::from_name("pre"), TagKind::Paragraph);
        assert_eq!(TagKind::from_name("section"), TagKind::Paragraph);
        assert_eq!(TagKind::from_name("tbody"), TagKind::TableBody);
    }

    #[test]
    fn test_own_text_excludes_descendants() {
        let doc = parse(r#"<div id="d">before <b>bold</b> after</div>"#);
        let div = select_first(&doc, "#d").unwrap();

        assert_eq!(div.own_text(), "before  after");
        assert_eq!(div.full_text(), "before bold after");
    }

    #[test]
    fn test_element_children_skip_text() {
        let doc = parse(r#"<ul>text<li>1</li> <li>2</li></ul>"#);
        let ul = select_first(&doc, "ul").unwrap();

        let children = ul.child_elements();
        assert_eq!(children.len(), 2);
        assert!(children.iter().all(|c| c.tag() == "li"));
    }

    #[test]
    fn test_siblings_exclude_self() {
        let doc = parse(r#"<div><a id="x">1</a><span>2</span><a>3</a></div>"#);
        let a = select_first(&doc, "#x").unwrap();

        let siblings = a.element_siblings();
        assert_eq!(siblings.len(), 2);
        assert_eq!(siblings[0].tag(), "span");
    }

    #[test]
    fn test_parent_chain_stops_at_html() {
        let doc = parse("<p>text</p>");
        let mut node = select_first(&doc, "p").unwrap();
        let mut names = vec![node.tag()];
        while let Some(parent) = node.parent_element() {
            names.push(parent.tag());
            node = parent;
        }

        assert_eq!(names, vec!["p", "body", "html"]);
    }

    #[test]
    fn test_attribute_values_in_order() {
        let doc = parse(r#"<a href="/t/1" class="link" title="Thread">x</a>"#);
        let a = select_first(&doc, "a").unwrap();

        assert_eq!(a.attribute_values(), vec!["/t/1", "link", "Thread"]);
        assert_eq!(a.attribute("href"), Some("/t/1".to_string()));
        assert_eq!(a.class_attr(), Some("link".to_string()));
    }

    #[test]
    fn test_invalid_selector_is_empty() {
        let doc = parse(r#"<div class="md:flex">x</div>"#);

        assert!(select_all(&doc, "div.md:flex:::").is_empty());
        assert!(select_all(&doc, "").is_empty());
    }

    #[test]
    fn test_selector_text_concatenates_matches() {
        let doc = parse(r#"<p class="a"> one </p><p class="a">two</p>"#);

        assert_eq!(selector_text(&doc, "p.a"), "one two");
    }
}
