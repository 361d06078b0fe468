//! The merge engine.
//!
//! A merge runs four stages strictly in order, each consuming the output of
//! the previous one:
//!
//! 1. [`MergeStage::ResourcesNamespaced`] - every resource gets a unique id and href
//! 2. [`MergeStage::LinksRewritten`] - internal links in text resources follow the renames
//! 3. [`MergeStage::StructureComposed`] - navigation tree and reading order
//! 4. [`MergeStage::MetadataSynthesized`] - merged titles, authors, identifier, publishers
//!
//! Any failure aborts the whole merge; no partial document is ever returned.

pub mod href;
mod links;
mod metadata;
mod namespace;
mod navigation;
mod options;
mod reading_order;

pub use links::{rewrite_all, LinkRewriter};
pub use metadata::{synthesize, synthesize_with, SERIES_SEPARATOR};
pub use namespace::{book_prefix, namespaced_href, namespaced_id, NamespaceMap};
pub use navigation::compose_navigation;
pub use options::{MergeOptions, NavigationFallback, DEFAULT_PUBLISHER_TAG};
pub use reading_order::compose_reading_order;

use crate::codec::PackageWriter;
use crate::error::{MergeError, ReferenceSite};
use crate::types::{MergedDocument, MergedMetadata, NavigationNode, SourceBook};
use std::fmt;
use std::io::Write;

/// Pipeline stages, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MergeStage {
    ResourcesNamespaced,
    LinksRewritten,
    StructureComposed,
    MetadataSynthesized,
    Done,
}

impl fmt::Display for MergeStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MergeStage::ResourcesNamespaced => "resources namespaced",
            MergeStage::LinksRewritten => "links rewritten",
            MergeStage::StructureComposed => "structure composed",
            MergeStage::MetadataSynthesized => "metadata synthesized",
            MergeStage::Done => "done",
        };
        f.write_str(name)
    }
}

struct Namespaced {
    map: NamespaceMap,
}

struct Rewritten {
    map: NamespaceMap,
    rewritten_links: usize,
}

struct Composed {
    map: NamespaceMap,
    rewritten_links: usize,
    navigation: Vec<NavigationNode>,
    reading_order: Vec<String>,
    cover: Option<String>,
    cover_image: Option<String>,
}

struct Synthesized {
    composed: Composed,
    metadata: MergedMetadata,
}

/// Merges source books into one document
#[derive(Debug, Clone, Default)]
pub struct Merger {
    options: MergeOptions,
}

impl Merger {
    pub fn new(options: MergeOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &MergeOptions {
        &self.options
    }

    /// Merge `books`, in the given order, into one document
    pub fn merge(&self, mut books: Vec<SourceBook>) -> Result<MergedDocument, MergeError> {
        if books.is_empty() {
            return Err(MergeError::NoSourceBooks);
        }
        for (position, book) in books.iter_mut().enumerate() {
            if book.index != position {
                tracing::debug!(from = book.index, to = position, "re-indexing source book");
                book.index = position;
            }
        }

        tracing::info!(books = books.len(), "starting merge");

        let namespaced = self.namespace(&books)?;
        let rewritten = self.rewrite(namespaced, books.len());
        let composed = self.compose(&books, rewritten)?;
        let synthesized = self.synthesize(&books, composed);
        let document = self.finish(synthesized);

        tracing::info!(
            resources = document.resources.len(),
            reading_order = document.reading_order.len(),
            "merge complete"
        );
        Ok(document)
    }

    /// Merge and hand the result to a package writer
    pub fn merge_into(
        &self,
        books: Vec<SourceBook>,
        writer: &dyn PackageWriter,
        output: &mut dyn Write,
    ) -> crate::Result<MergedDocument> {
        let document = self.merge(books)?;
        writer.write(&document, output)?;
        Ok(document)
    }

    fn namespace(&self, books: &[SourceBook]) -> Result<Namespaced, MergeError> {
        let map = NamespaceMap::build(books)?;
        log_stage(MergeStage::ResourcesNamespaced);
        Ok(Namespaced { map })
    }

    fn rewrite(&self, stage: Namespaced, book_count: usize) -> Rewritten {
        let mut map = stage.map;
        let rewritten_links = rewrite_all(&mut map, book_count);
        log_stage(MergeStage::LinksRewritten);
        Rewritten {
            map,
            rewritten_links,
        }
    }

    fn compose(&self, books: &[SourceBook], stage: Rewritten) -> Result<Composed, MergeError> {
        let navigation = compose_navigation(books, &stage.map, self.options.navigation_fallback)?;
        let reading_order = compose_reading_order(books, &stage.map)?;

        let first = &books[0];
        let cover = first
            .cover
            .as_ref()
            .map(|href| stage.map.resolve(&first.key(href.clone()), ReferenceSite::Cover))
            .transpose()?
            .map(|r| r.href.clone());
        let cover_image = first
            .cover_image
            .as_ref()
            .map(|href| stage.map.resolve(&first.key(href.clone()), ReferenceSite::Cover))
            .transpose()?
            .map(|r| r.href.clone());

        log_stage(MergeStage::StructureComposed);
        Ok(Composed {
            map: stage.map,
            rewritten_links: stage.rewritten_links,
            navigation,
            reading_order,
            cover,
            cover_image,
        })
    }

    fn synthesize(&self, books: &[SourceBook], composed: Composed) -> Synthesized {
        let metadata = synthesize(books, &self.options);
        log_stage(MergeStage::MetadataSynthesized);
        Synthesized { composed, metadata }
    }

    fn finish(&self, stage: Synthesized) -> MergedDocument {
        let Synthesized { composed, metadata } = stage;
        log_stage(MergeStage::Done);
        MergedDocument {
            metadata,
            resources: composed.map.into_resources(),
            reading_order: composed.reading_order,
            navigation: composed.navigation,
            cover: composed.cover,
            cover_image: composed.cover_image,
            rewritten_links: composed.rewritten_links,
        }
    }
}

fn log_stage(stage: MergeStage) {
    tracing::info!(%stage, "merge stage complete");
}

/// Merge with the given options
pub fn merge_books(
    books: Vec<SourceBook>,
    options: &MergeOptions,
) -> Result<MergedDocument, MergeError> {
    Merger::new(options.clone()).merge(books)
}
