//! Error types for EpubMerge Core

use crate::types::ResourceKey;
use thiserror::Error;

/// Result type alias using EpubMergeError
pub type Result<T> = std::result::Result<T, EpubMergeError>;

/// Top-level error type for all EpubMerge operations
#[derive(Debug, Error)]
pub enum EpubMergeError {
    #[error("Malformed package: {0}")]
    MalformedPackage(#[from] ParseError),

    #[error("Merge failed: {0}")]
    Merge(#[from] MergeError),

    #[error("Write failure: {0}")]
    WriteFailure(#[from] WriteError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by the package reader
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Invalid archive: {0}")]
    InvalidArchive(String),

    #[error("Missing archive entry: {0}")]
    MissingEntry(String),

    #[error("Invalid XML in {path}: {message}")]
    InvalidXml { path: String, message: String },

    #[error("Missing required field: {0}")]
    MissingField(String),
}

/// Where an unresolved reference was found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceSite {
    ReadingOrder,
    Navigation,
    Cover,
}

impl std::fmt::Display for ReferenceSite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReferenceSite::ReadingOrder => f.write_str("reading order"),
            ReferenceSite::Navigation => f.write_str("navigation tree"),
            ReferenceSite::Cover => f.write_str("cover pointer"),
        }
    }
}

/// Errors raised by the merge engine itself
#[derive(Debug, Error)]
pub enum MergeError {
    #[error("Unresolved resource reference {key} in {site}")]
    UnresolvedResourceReference { key: ResourceKey, site: ReferenceSite },

    #[error("Book {book_index} has neither a cover nor a reading order to anchor its section")]
    MissingAnchor { book_index: usize },

    #[error("No source books to merge")]
    NoSourceBooks,

    #[error("Namespaced href collision: {0}")]
    DuplicateNamespacedHref(String),

    #[error("Namespaced identifier collision: {0}")]
    DuplicateNamespacedId(String),
}

/// Errors raised by the package writer
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("Zip error: {0}")]
    Zip(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<zip::result::ZipError> for WriteError {
    fn from(err: zip::result::ZipError) -> Self {
        WriteError::Zip(err.to_string())
    }
}
