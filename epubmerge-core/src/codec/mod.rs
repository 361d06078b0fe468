//! Package codecs: decoding source packages and encoding the merged one

mod epub;

pub use epub::{EpubReader, EpubWriter};

use crate::error::{ParseError, WriteError};
use crate::types::{MergedDocument, SourceBook};
use std::io::{Read, Write};

/// Trait for decoding a package into a source book
pub trait PackageReader: Send + Sync {
    /// Decode the package read from `reader` as merge input number `index`
    fn read(&self, index: usize, reader: &mut dyn Read) -> Result<SourceBook, ParseError>;

    /// File extensions this reader supports
    fn supported_extensions(&self) -> &[&str];
}

/// Trait for encoding a merged document into a package
pub trait PackageWriter: Send + Sync {
    /// Encode `document` to `writer`
    fn write(&self, document: &MergedDocument, writer: &mut dyn Write) -> Result<(), WriteError>;

    /// File extension of the produced package
    fn file_extension(&self) -> &str;
}

/// Get the reader for a file extension
pub fn reader_for_extension(ext: &str) -> Option<Box<dyn PackageReader>> {
    match ext.to_lowercase().as_str() {
        "epub" => Some(Box::new(EpubReader::new())),
        _ => None,
    }
}
