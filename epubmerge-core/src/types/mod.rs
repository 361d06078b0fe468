//! Core types for the EpubMerge data model

mod book;
mod document;
mod key;
mod metadata;
mod resource;
mod toc;

pub use book::{SourceBook, UNTITLED};
pub use document::{MergeSummary, MergedDocument, NamespacedResource};
pub use key::ResourceKey;
pub use metadata::{MergedMetadata, SourceMetadata};
pub use resource::{Resource, NCX_MEDIA_TYPE};
pub use toc::{NavTarget, NavigationNode};
