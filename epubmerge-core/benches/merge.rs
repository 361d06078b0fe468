//! Merge benchmarks

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use epubmerge_core::{merge_books, MergeOptions, NavTarget, NavigationNode, Resource, SourceBook, SourceMetadata};
use std::hint::black_box;

fn book(index: usize, chapters: usize) -> SourceBook {
    let mut book = SourceBook::new(index, SourceMetadata::new(format!("Book {}", index)));
    book.add_resource(Resource::new("css", "styles/main.css", "text/css", b"p { margin: 0 }".to_vec()));

    let mut nav = Vec::new();
    for i in 0..chapters {
        let href = format!("text/ch{}.xhtml", i);
        let body = format!(
            r#"<html><head><link href="../styles/main.css" rel="stylesheet"/></head>
<body><p>Chapter {i}</p><a href="ch{}.xhtml#top">Next</a></body></html>"#,
            (i + 1) % chapters
        );
        book.add_resource(Resource::new(format!("ch{}", i), href.clone(), "application/xhtml+xml", body.into_bytes()));
        book.add_to_reading_order(href.clone());
        nav.push(NavigationNode::new(format!("Chapter {}", i), NavTarget::new(href)));
    }
    book.with_navigation(nav)
}

fn merge_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("merge");
    for books in [2usize, 8, 32] {
        let input: Vec<SourceBook> = (0..books).map(|i| book(i, 20)).collect();
        group.bench_with_input(BenchmarkId::from_parameter(books), &input, |b, input| {
            b.iter(|| merge_books(black_box(input.clone()), &MergeOptions::default()))
        });
    }
    group.finish();
}

criterion_group!(benches, merge_benchmark);
criterion_main!(benches);
