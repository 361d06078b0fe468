//! Navigation tree composition: one top-level section per source book, with
//! the book's own tree re-pointed underneath it.

use super::namespace::NamespaceMap;
use super::options::NavigationFallback;
use crate::error::{MergeError, ReferenceSite};
use crate::types::{NavTarget, NavigationNode, SourceBook};

/// Build the merged navigation tree, one root per book in input order
pub fn compose_navigation(
    books: &[SourceBook],
    map: &NamespaceMap,
    fallback: NavigationFallback,
) -> Result<Vec<NavigationNode>, MergeError> {
    books
        .iter()
        .map(|book| compose_section(book, map, fallback))
        .collect()
}

/// Top-level section for one book
fn compose_section(
    book: &SourceBook,
    map: &NamespaceMap,
    fallback: NavigationFallback,
) -> Result<NavigationNode, MergeError> {
    let (anchor, site) = match (&book.cover, book.reading_order.first()) {
        (Some(cover), _) => (cover, ReferenceSite::Cover),
        (None, Some(first)) => (first, ReferenceSite::ReadingOrder),
        (None, None) => {
            return Err(MergeError::MissingAnchor {
                book_index: book.index,
            })
        }
    };
    let anchor = map.resolve(&book.key(anchor.clone()), site)?;
    tracing::debug!(book = book.index, anchor = %anchor.href, "anchoring navigation section");

    let children = match &book.navigation {
        Some(tree) if book.has_navigation() => tree
            .iter()
            .map(|node| repoint(book, node, map))
            .collect::<Result<Vec<_>, _>>()?,
        _ => match fallback {
            NavigationFallback::SingleEntry => Vec::new(),
            NavigationFallback::ReadingOrder => reading_order_entries(book, map)?,
        },
    };

    Ok(NavigationNode::new(book.title(), NavTarget::new(anchor.href.clone())).with_children(children))
}

/// Clone a source node, redirecting its target through the namespace map
fn repoint(
    book: &SourceBook,
    node: &NavigationNode,
    map: &NamespaceMap,
) -> Result<NavigationNode, MergeError> {
    let resolved = map.resolve(&book.key(node.target.href.clone()), ReferenceSite::Navigation)?;

    let children = node
        .children
        .iter()
        .map(|child| repoint(book, child, map))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(NavigationNode {
        title: node.title.clone(),
        target: NavTarget {
            href: resolved.href.clone(),
            fragment: node.target.fragment.clone(),
        },
        children,
    })
}

/// One entry per reading-order item, for books without a navigation tree
fn reading_order_entries(
    book: &SourceBook,
    map: &NamespaceMap,
) -> Result<Vec<NavigationNode>, MergeError> {
    book.reading_order
        .iter()
        .map(|href| {
            let resolved = map.resolve(&book.key(href.clone()), ReferenceSite::ReadingOrder)?;
            Ok(NavigationNode::new(
                entry_title(href),
                NavTarget::new(resolved.href.clone()),
            ))
        })
        .collect()
}

/// File stem of an href, used as a synthesized entry title
fn entry_title(href: &str) -> String {
    std::path::Path::new(href)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(href)
        .to_string()
}
