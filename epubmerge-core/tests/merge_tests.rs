//! Merge engine tests
//!
//! Scenario tests for the two-book merge and its overrides, plus property
//! tests for the invariants every merge must keep:
//!
//! 1. Namespaced hrefs and identifiers are unique across the whole package
//! 2. Navigation-control documents are never carried
//! 3. The reading order holds each resource once, books in input order, each
//!    book keeping its own order
//! 4. One navigation root per book, in input order, every pointer resolvable

use epubmerge_core::merge::{namespaced_href, NamespaceMap};
use epubmerge_core::{
    merge_books, MergeError, MergeOptions, MergedDocument, Merger, NavTarget, NavigationFallback,
    NavigationNode, ReferenceSite, Resource, ResourceKey, SourceBook, SourceMetadata,
};
use proptest::prelude::*;
use std::collections::HashSet;

// =============================================================================
// Fixtures
// =============================================================================

fn xhtml(id: &str, body: &str) -> Resource {
    Resource::new(
        id,
        format!("{}.xhtml", id),
        "application/xhtml+xml",
        format!("<html><body>{}</body></html>", body).into_bytes(),
    )
}

/// Book A: "Alpha" by X, three pages, flat reading order, no navigation, cover = first page
fn book_a() -> SourceBook {
    let mut book = SourceBook::new(0, SourceMetadata::new("Alpha").with_author("X"));
    book.add_resource(xhtml("a0", r#"<a href="a1.xhtml">On</a>"#));
    book.add_resource(xhtml("a1", r#"<a href="a2.xhtml#end">On</a>"#));
    book.add_resource(xhtml("a2", r#"<p id="end">Fin</p>"#));
    for href in ["a0.xhtml", "a1.xhtml", "a2.xhtml"] {
        book.add_to_reading_order(href);
    }
    book.with_cover("a0.xhtml")
}

/// Book B: "Beta" by Y, two pages, a navigation tree with one node, and an NCX
fn book_b() -> SourceBook {
    let mut book = SourceBook::new(1, SourceMetadata::new("Beta").with_author("Y"));
    book.add_resource(Resource::new(
        "ncx",
        "toc.ncx",
        "application/x-dtbncx+xml",
        b"<ncx/>".to_vec(),
    ));
    book.add_resource(xhtml("b0", "<h1>Beta</h1>"));
    book.add_resource(xhtml("b1", r#"<a href="https://example.com">web</a>"#));
    book.add_to_reading_order("b0.xhtml");
    book.add_to_reading_order("b1.xhtml");
    book.with_navigation(vec![NavigationNode::new(
        "Chapter One",
        NavTarget::new("b1.xhtml"),
    )])
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn test_two_books_without_overrides() {
    let doc = merge_books(vec![book_a(), book_b()], &MergeOptions::default()).unwrap();

    assert_eq!(doc.metadata.titles, vec!["Alpha", "Beta", "Alpha; Beta"]);
    assert_eq!(doc.metadata.authors, vec!["X", "Y"]);
    assert!(doc.metadata.identifier.starts_with("urn:uuid:"));
    assert_eq!(
        doc.metadata.publishers.last().map(String::as_str),
        Some(epubmerge_core::merge::DEFAULT_PUBLISHER_TAG)
    );

    assert_eq!(
        doc.reading_order,
        vec![
            "book0_a0.xhtml",
            "book0_a1.xhtml",
            "book0_a2.xhtml",
            "book1_b0.xhtml",
            "book1_b1.xhtml",
        ]
    );

    assert_eq!(doc.navigation.len(), 2);
    assert_eq!(doc.navigation[0].title, "Alpha");
    assert_eq!(doc.navigation[0].target, NavTarget::new("book0_a0.xhtml"));
    assert!(doc.navigation[0].children.is_empty());
    assert_eq!(doc.navigation[1].title, "Beta");
    assert_eq!(doc.navigation[1].target, NavTarget::new("book1_b0.xhtml"));
    assert_eq!(doc.navigation[1].children.len(), 1);
    assert_eq!(
        doc.navigation[1].children[0].target,
        NavTarget::new("book1_b1.xhtml")
    );
}

#[test]
fn test_title_override_with_empty_author_override() {
    let options = MergeOptions::new().with_title("Combined").with_author("");
    let doc = merge_books(vec![book_a(), book_b()], &options).unwrap();

    assert_eq!(doc.metadata.titles, vec!["Combined"]);
    assert_eq!(doc.metadata.authors, vec!["X", "Y"]);
}

#[test]
fn test_dangling_reading_order_entry_aborts() {
    let mut broken = book_b();
    broken.add_to_reading_order("absent.xhtml");

    let err = merge_books(vec![book_a(), broken], &MergeOptions::default()).unwrap_err();
    match err {
        MergeError::UnresolvedResourceReference { key, site } => {
            assert_eq!(key, ResourceKey::new(1, "absent.xhtml"));
            assert_eq!(site, ReferenceSite::ReadingOrder);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_dangling_cover_aborts() {
    let broken = book_a().with_cover("missing-cover.xhtml");
    let err = merge_books(vec![broken], &MergeOptions::default()).unwrap_err();
    assert!(matches!(
        err,
        MergeError::UnresolvedResourceReference {
            site: ReferenceSite::Cover,
            ..
        }
    ));
}

#[test]
fn test_internal_links_follow_renames() {
    let doc = merge_books(vec![book_a(), book_b()], &MergeOptions::default()).unwrap();

    let a1 = doc.resource("book0_a1.xhtml").unwrap();
    let html = std::str::from_utf8(a1.data()).unwrap();
    assert!(html.contains(r#"href="book0_a2.xhtml#end""#));

    let b1 = doc.resource("book1_b1.xhtml").unwrap();
    let html = std::str::from_utf8(b1.data()).unwrap();
    assert!(html.contains(r#"href="https://example.com""#));

    assert_eq!(doc.rewritten_links, 2);
}

#[test]
fn test_single_book_is_structurally_preserved() {
    let source = book_b();
    let doc = merge_books(vec![source.clone()], &MergeOptions::default()).unwrap();

    let carried: Vec<&str> = source
        .resources
        .iter()
        .filter(|r| !r.is_navigation_control())
        .map(|r| r.href.as_str())
        .collect();
    let merged: Vec<&str> = doc.resources.iter().map(|r| r.key.href.as_str()).collect();
    assert_eq!(carried, merged);

    let order: Vec<String> = source
        .reading_order
        .iter()
        .map(|h| format!("book0_{}", h))
        .collect();
    assert_eq!(doc.reading_order, order);

    assert_eq!(doc.navigation.len(), 1);
    let children = &doc.navigation[0].children;
    let source_nav = source.navigation.as_ref().unwrap();
    assert_eq!(children.len(), source_nav.len());
    assert_eq!(children[0].title, source_nav[0].title);
}

#[test]
fn test_reading_order_fallback_navigation() {
    let options = MergeOptions::new().with_navigation_fallback(NavigationFallback::ReadingOrder);
    let doc = Merger::new(options).merge(vec![book_a(), book_b()]).unwrap();

    let titles: Vec<&str> = doc.navigation[0]
        .children
        .iter()
        .map(|c| c.title.as_str())
        .collect();
    assert_eq!(titles, vec!["a0", "a1", "a2"]);
    // Books with their own tree keep it
    assert_eq!(doc.navigation[1].children.len(), 1);
}

#[test]
fn test_summary() {
    let doc = merge_books(vec![book_a(), book_b()], &MergeOptions::default()).unwrap();
    let summary = doc.summary();
    assert_eq!(summary.resources, 5);
    assert_eq!(summary.reading_order, 5);
    assert_eq!(summary.navigation_roots, 2);
    assert_eq!(summary.navigation_entries, 3);

    let json = serde_json::to_value(&summary).unwrap();
    assert_eq!(json["navigation_roots"], 2);
}

// =============================================================================
// Properties
// =============================================================================

/// Generated navigation subtree: the page an entry points at, and its children
#[derive(Debug, Clone)]
struct TreeShape {
    page: usize,
    children: Vec<TreeShape>,
}

fn tree_shape() -> impl Strategy<Value = TreeShape> {
    let leaf = (0usize..6).prop_map(|page| TreeShape {
        page,
        children: Vec::new(),
    });
    leaf.prop_recursive(3, 24, 3, |inner| {
        (0usize..6, proptest::collection::vec(inner, 0..3))
            .prop_map(|(page, children)| TreeShape { page, children })
    })
}

/// Shape of one generated book: page count, reading order (indices into the
/// pages), an optional navigation tree, whether it carries an NCX.
type BookShape = (usize, Vec<usize>, Option<Vec<TreeShape>>, bool);

fn book_shape() -> impl Strategy<Value = BookShape> {
    (
        1usize..6,
        proptest::collection::vec(0usize..6, 1..10),
        proptest::option::of(proptest::collection::vec(tree_shape(), 1..4)),
        any::<bool>(),
    )
}

fn build_node(shape: &TreeShape, pages: usize, counter: &mut usize) -> NavigationNode {
    *counter += 1;
    let page = shape.page % pages;
    let node = NavigationNode::new(
        format!("Entry {}", counter),
        NavTarget::new(format!("p{}.xhtml", page)).with_fragment(format!("f{}", counter)),
    );
    let children = shape
        .children
        .iter()
        .map(|child| build_node(child, pages, counter))
        .collect();
    node.with_children(children)
}

fn build_book(index: usize, shape: &BookShape) -> SourceBook {
    let (pages, order, nav, with_ncx) = shape;
    let mut book = SourceBook::new(index, SourceMetadata::new(format!("Book {}", index)));

    if *with_ncx {
        book.add_resource(Resource::new("ncx", "toc.ncx", "application/x-dtbncx+xml", vec![]));
    }
    for page in 0..*pages {
        book.add_resource(xhtml(&format!("p{}", page), ""));
    }
    for i in order {
        book.add_to_reading_order(format!("p{}.xhtml", i % pages));
    }
    if let Some(trees) = nav {
        let mut counter = 0;
        let nav = trees
            .iter()
            .map(|tree| build_node(tree, *pages, &mut counter))
            .collect();
        book = book.with_navigation(nav);
    }
    book
}

/// Same titles, fragments and nesting, with every target renamed into `book_index`
fn same_tree(merged: &NavigationNode, source: &NavigationNode, book_index: usize) -> bool {
    merged.title == source.title
        && merged.target.fragment == source.target.fragment
        && merged.target.href == namespaced_href(book_index, &source.target.href)
        && merged.children.len() == source.children.len()
        && merged
            .children
            .iter()
            .zip(&source.children)
            .all(|(m, s)| same_tree(m, s, book_index))
}

fn build_books(shapes: &[BookShape]) -> Vec<SourceBook> {
    shapes
        .iter()
        .enumerate()
        .map(|(i, shape)| build_book(i, shape))
        .collect()
}

fn book_of(doc: &MergedDocument, href: &str) -> usize {
    doc.resource(href).expect("reading order entry resolves").key.book_index
}

proptest! {
    #[test]
    fn prop_names_are_globally_unique(shapes in proptest::collection::vec(book_shape(), 1..5)) {
        let doc = merge_books(build_books(&shapes), &MergeOptions::default()).unwrap();

        let hrefs: HashSet<&str> = doc.resources.iter().map(|r| r.href.as_str()).collect();
        let ids: HashSet<&str> = doc.resources.iter().map(|r| r.id.as_str()).collect();
        prop_assert_eq!(hrefs.len(), doc.resources.len());
        prop_assert_eq!(ids.len(), doc.resources.len());
    }

    #[test]
    fn prop_navigation_control_never_carried(shapes in proptest::collection::vec(book_shape(), 1..5)) {
        let doc = merge_books(build_books(&shapes), &MergeOptions::default()).unwrap();
        prop_assert!(doc.resources.iter().all(|r| !r.payload.is_navigation_control()));
    }

    #[test]
    fn prop_reading_order_unique_and_book_ordered(shapes in proptest::collection::vec(book_shape(), 1..5)) {
        let doc = merge_books(build_books(&shapes), &MergeOptions::default()).unwrap();

        let unique: HashSet<&String> = doc.reading_order.iter().collect();
        prop_assert_eq!(unique.len(), doc.reading_order.len());

        let books: Vec<usize> = doc.reading_order.iter().map(|h| book_of(&doc, h)).collect();
        prop_assert!(books.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn prop_each_book_keeps_its_relative_order(shapes in proptest::collection::vec(book_shape(), 1..5)) {
        let books = build_books(&shapes);
        let doc = merge_books(books.clone(), &MergeOptions::default()).unwrap();

        for book in &books {
            let mut expected: Vec<&str> = Vec::new();
            for href in &book.reading_order {
                if !expected.contains(&href.as_str()) {
                    expected.push(href);
                }
            }
            let merged: Vec<&str> = doc
                .reading_order
                .iter()
                .filter_map(|h| doc.resource(h))
                .filter(|r| r.key.book_index == book.index)
                .map(|r| r.key.href.as_str())
                .collect();
            prop_assert_eq!(merged, expected);
        }
    }

    #[test]
    fn prop_one_navigation_root_per_book(shapes in proptest::collection::vec(book_shape(), 1..5)) {
        let books = build_books(&shapes);
        let doc = merge_books(books.clone(), &MergeOptions::default()).unwrap();

        prop_assert_eq!(doc.navigation.len(), books.len());
        for (root, book) in doc.navigation.iter().zip(&books) {
            prop_assert_eq!(&root.title, &format!("Book {}", book.index));
            prop_assert!(doc.resource(&root.target.href).is_some());

            let source = book.navigation.as_deref().unwrap_or_default();
            prop_assert_eq!(root.children.len(), source.len());
            for (merged, original) in root.children.iter().zip(source) {
                prop_assert!(same_tree(merged, original, book.index));
            }
        }
    }

    #[test]
    fn prop_navigation_targets_resolve(shapes in proptest::collection::vec(book_shape(), 1..5)) {
        let doc = merge_books(build_books(&shapes), &MergeOptions::default()).unwrap();

        fn all_resolve(doc: &MergedDocument, node: &NavigationNode) -> bool {
            doc.resource(&node.target.href).is_some()
                && node.children.iter().all(|child| all_resolve(doc, child))
        }
        prop_assert!(doc.navigation.iter().all(|root| all_resolve(&doc, root)));
    }

    #[test]
    fn prop_namespacing_is_deterministic(shapes in proptest::collection::vec(book_shape(), 1..5)) {
        let books = build_books(&shapes);
        let first = NamespaceMap::build(&books).unwrap();
        let second = NamespaceMap::build(&books).unwrap();
        prop_assert_eq!(first.entries(), second.entries());
    }
}
