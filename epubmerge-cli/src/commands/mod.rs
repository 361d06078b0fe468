//! CLI command implementations

mod info;
mod merge;

pub use info::info;
pub use merge::{merge, MergeArgs};

use anyhow::{Context, Result};
use epubmerge_core::codec::reader_for_extension;
use epubmerge_core::SourceBook;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Decode the package at `input` as merge input number `index`
pub(crate) fn read_book(index: usize, input: &str) -> Result<SourceBook> {
    let input_path = Path::new(input);

    // Get file extension
    let ext = input_path
        .extension()
        .and_then(|e| e.to_str())
        .context("Could not determine input file extension")?;

    let reader = reader_for_extension(ext)
        .with_context(|| format!("No reader available for .{} files", ext))?;

    let file =
        File::open(input_path).with_context(|| format!("Failed to open input file: {}", input))?;
    let mut file = BufReader::new(file);

    reader
        .read(index, &mut file)
        .with_context(|| format!("Failed to decode {}", input))
}
