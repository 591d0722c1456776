//! Structural Paths
//!
//! A structural path is the `tag.class1.class2` descriptor of a node and its
//! nearest ancestors, ancestor-most first, joined by single spaces. It doubles
//! as the CSS selector the harvester replays, so it must depend only on the
//! markup shape around the node.

use crate::dom::Element;

/// Default number of descriptors in a path.
pub const DEFAULT_PRECISION: usize = 3;

/// Descriptor for a single node: the tag alone, or `tag.c1.c2` with classes in
/// markup order (whitespace-split, no sorting, no de-duplication).
#[must_use]
pub fn descriptor<E: Element>(el: &E) -> String {
    let tag = el.tag();
    match el.class_attr() {
        Some(classes) if !classes.trim().is_empty() => {
            let joined = classes.split_whitespace().collect::<Vec<_>>().join(".");
            format!("{tag}.{joined}")
        }
        _ => tag,
    }
}

/// Path of `el` from its `precision` nearest ancestors (self included).
///
/// Shallow nodes yield fewer descriptors.
#[must_use]
pub fn structural_path<E: Element + Clone>(el: &E, precision: usize) -> String {
    let chain = ancestor_chain(el, |_| false);
    render(&chain, precision)
}

/// Path of `el` relative to its nearest enclosing table row.
///
/// Ancestor collection stops at (and excludes) the nearest `tr`. When there is
/// no enclosing row the chain runs to the document root, as for
/// [`structural_path`].
#[must_use]
pub fn row_relative_path<E: Element + Clone>(el: &E, precision: usize) -> String {
    let chain = ancestor_chain(el, |node| node.tag() == "tr");
    render(&chain, precision)
}

/// Self plus ancestors, root-to-self, stopping before the first ancestor for
/// which `stop` returns true.
fn ancestor_chain<E, F>(el: &E, stop: F) -> Vec<E>
where
    E: Element + Clone,
    F: Fn(&E) -> bool,
{
    let mut chain = vec![el.clone()];
    let mut current = el.parent_element();
    while let Some(node) = current {
        if stop(&node) {
            break;
        }
        current = node.parent_element();
        chain.push(node);
    }
    chain.reverse();
    chain
}

fn render<E: Element>(chain: &[E], precision: usize) -> String {
    let start = chain.len().saturating_sub(precision);
    chain[start..]
        .iter()
        .map(descriptor)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom;

    const PAGE: &str = r#"
        <div class="wrap outer">
            <table class="forum">
                <tbody>
                    <tr class="row">
                        <td class="title  main"><a class="topic" href="/t/1">Thread</a></td>
                    </tr>
                </tbody>
            </table>
        </div>"#;

    #[test]
    fn test_descriptor_keeps_class_order() {
        let doc = dom::parse(r#"<table><tbody><tr><td class="zeta  alpha zeta">x</td></tr></tbody></table>"#);
        let td = dom::select_first(&doc, "td").unwrap();

        assert_eq!(descriptor(&td), "td.zeta.alpha.zeta");
    }

    #[test]
    fn test_descriptor_without_class() {
        let doc = dom::parse(r#"<p class="  ">x</p><span>y</span>"#);

        assert_eq!(descriptor(&dom::select_first(&doc, "p").unwrap()), "p");
        assert_eq!(descriptor(&dom::select_first(&doc, "span").unwrap()), "span");
    }

    #[test]
    fn test_structural_path_default_precision() {
        let doc = dom::parse(PAGE);
        let a = dom::select_first(&doc, "a").unwrap();

        assert_eq!(structural_path(&a, DEFAULT_PRECISION), "tr.row td.title.main a.topic");
    }

    #[test]
    fn test_structural_path_shallow_node() {
        let doc = dom::parse("<p>x</p>");
        let p = dom::select_first(&doc, "p").unwrap();

        assert_eq!(structural_path(&p, 10), "html body p");
    }

    #[test]
    fn test_increasing_precision_keeps_tail() {
        let doc = dom::parse(PAGE);
        let a = dom::select_first(&doc, "a").unwrap();

        let short = structural_path(&a, 2);
        let long = structural_path(&a, 5);
        assert!(long.ends_with(&short));
        assert_eq!(structural_path(&a, 5), structural_path(&a, 5));
    }

    #[test]
    fn test_row_relative_path_stops_at_row() {
        let doc = dom::parse(PAGE);
        let a = dom::select_first(&doc, "a").unwrap();

        assert_eq!(row_relative_path(&a, 3), "td.title.main a.topic");
        assert_eq!(row_relative_path(&a, 1), "a.topic");
    }

    #[test]
    fn test_row_relative_path_without_row() {
        let doc = dom::parse(r#"<div class="rows"><div class="row"><a>x</a></div></div>"#);
        let a = dom::select_first(&doc, "a").unwrap();

        assert_eq!(row_relative_path(&a, 3), "div.rows div.row a");
    }

    #[test]
    fn test_path_round_trips_as_selector() {
        let doc = dom::parse(PAGE);
        let a = dom::select_first(&doc, "a").unwrap();
        let path = structural_path(&a, DEFAULT_PRECISION);

        let found = dom::select_all(&doc, &path);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].attribute("href"), Some("/t/1".to_string()));
    }
}
