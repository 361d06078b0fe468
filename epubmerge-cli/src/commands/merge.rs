//! Merge command implementation

use super::read_book;
use anyhow::{Context, Result};
use epubmerge_core::codec::{EpubWriter, PackageWriter};
use epubmerge_core::{MergeOptions, Merger, NavigationFallback};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::fs::File;
use std::io::BufWriter;
use std::time::Duration;

/// Arguments of the merge command
pub struct MergeArgs {
    pub inputs: Vec<String>,
    pub output: String,
    pub title: Option<String>,
    pub author: Option<String>,
    pub fallback: NavigationFallback,
    pub json: bool,
}

/// Merge the input packages, in order, into one package
pub fn merge(args: MergeArgs) -> Result<()> {
    let mut options = MergeOptions::new().with_navigation_fallback(args.fallback);
    if let Some(title) = &args.title {
        options = options.with_title(title);
    }
    if let Some(author) = &args.author {
        options = options.with_author(author);
    }

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(100));

    // Decode every input before the output file is touched
    pb.set_message(format!("Reading {} input files...", args.inputs.len()));
    let books = args
        .inputs
        .par_iter()
        .enumerate()
        .map(|(index, input)| read_book(index, input))
        .collect::<Result<Vec<_>>>()?;

    for book in &books {
        tracing::info!(
            "Decoded '{}' with {} resources",
            book.title(),
            book.resources.len()
        );
    }

    pb.set_message("Merging...");
    let document = Merger::new(options)
        .merge(books)
        .context("Failed to merge input files")?;

    pb.set_message("Writing merged package...");
    let writer = EpubWriter::new();
    let file = File::create(&args.output)
        .with_context(|| format!("Failed to create output file: {}", args.output))?;
    let mut file = BufWriter::new(file);
    writer
        .write(&document, &mut file)
        .with_context(|| format!("Failed to write {}", args.output))?;

    let summary = document.summary();
    if args.json {
        pb.finish_and_clear();
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        pb.finish_with_message(format!(
            "Merged {} books into '{}' -> {}",
            summary.navigation_roots,
            document.metadata.title().unwrap_or_default(),
            args.output
        ));
        println!("Resources:   {}", summary.resources);
        println!("Spine:       {}", summary.reading_order);
        println!("TOC entries: {}", summary.navigation_entries);
        println!("Links:       {}", summary.rewritten_links);
    }

    Ok(())
}
