//! EpubMerge Core Library
//!
//! This crate merges independently authored EPUB packages into one package.
//! Every source book keeps its own section: resources are namespaced per book,
//! internal links are rewritten to follow the renames, the navigation trees are
//! nested under one top-level entry per book, and the reading orders are
//! concatenated in input order.
//!
//! ```no_run
//! use epubmerge_core::codec::{EpubReader, EpubWriter, PackageReader};
//! use epubmerge_core::{MergeOptions, Merger};
//!
//! # fn main() -> epubmerge_core::Result<()> {
//! let reader = EpubReader::new();
//! let books = vec![
//!     reader.read(0, &mut std::fs::File::open("one.epub")?)?,
//!     reader.read(1, &mut std::fs::File::open("two.epub")?)?,
//! ];
//! let merger = Merger::new(MergeOptions::new().with_title("Omnibus"));
//! let mut out = std::fs::File::create("omnibus.epub")?;
//! merger.merge_into(books, &EpubWriter::new(), &mut out)?;
//! # Ok(())
//! # }
//! ```

pub mod codec;
pub mod error;
pub mod merge;
pub mod types;

pub use error::{EpubMergeError, MergeError, ParseError, ReferenceSite, Result, WriteError};
pub use merge::{merge_books, MergeOptions, MergeStage, Merger, NavigationFallback};
pub use types::{
    MergeSummary, MergedDocument, MergedMetadata, NamespacedResource, NavTarget, NavigationNode,
    Resource, ResourceKey, SourceBook, SourceMetadata,
};

#[cfg(test)]
mod test_support;
