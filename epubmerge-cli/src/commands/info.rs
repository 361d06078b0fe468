//! Info command implementation

use super::read_book;
use anyhow::Result;
use serde::Serialize;

/// Book info output
#[derive(Serialize)]
struct BookInfo {
    title: String,
    authors: Vec<String>,
    language: Option<String>,
    publishers: Vec<String>,
    identifier: Option<String>,
    resources: usize,
    reading_order: usize,
    navigation_entries: usize,
    cover: Option<String>,
}

/// Display information about an EPUB package
pub fn info(input: &str, json: bool) -> Result<()> {
    let book = read_book(0, input)?;

    let info = BookInfo {
        title: book.title().to_string(),
        authors: book.metadata.authors.clone(),
        language: book.metadata.language.clone(),
        publishers: book.metadata.publishers.clone(),
        identifier: book.metadata.identifier.clone(),
        resources: book.resources.len(),
        reading_order: book.reading_order.len(),
        navigation_entries: book
            .navigation
            .as_ref()
            .map(|nav| nav.iter().map(|n| n.node_count()).sum())
            .unwrap_or(0),
        cover: book.cover.clone(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
    } else {
        println!("Title:       {}", info.title);
        if !info.authors.is_empty() {
            println!("Authors:     {}", info.authors.join(", "));
        }
        if let Some(language) = &info.language {
            println!("Language:    {}", language);
        }
        if !info.publishers.is_empty() {
            println!("Publisher:   {}", info.publishers.join(", "));
        }
        if let Some(identifier) = &info.identifier {
            println!("Identifier:  {}", identifier);
        }
        println!("Resources:   {}", info.resources);
        println!("Spine:       {}", info.reading_order);
        println!("TOC entries: {}", info.navigation_entries);
        if let Some(cover) = &info.cover {
            println!("Cover:       {}", cover);
        }
    }

    Ok(())
}
