//! Metadata synthesis for the merged package

use super::options::MergeOptions;
use crate::types::{MergedMetadata, SourceBook};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Separator of the composite "series" title
pub const SERIES_SEPARATOR: &str = "; ";

/// Language used when no source declares one
const DEFAULT_LANGUAGE: &str = "en";

/// Derive merged metadata from the sources and the user's overrides
pub fn synthesize(books: &[SourceBook], options: &MergeOptions) -> MergedMetadata {
    synthesize_with(books, options, Uuid::new_v4(), Utc::now())
}

/// [`synthesize`] with the identifier and timestamp supplied by the caller
pub fn synthesize_with(
    books: &[SourceBook],
    options: &MergeOptions,
    id: Uuid,
    date: DateTime<Utc>,
) -> MergedMetadata {
    let authors = match options.author() {
        Some(author) => vec![author.to_string()],
        None => dedup(books.iter().flat_map(|b| b.metadata.authors.iter())),
    };

    let titles = match options.title() {
        Some(title) => vec![title.to_string()],
        None => {
            let all: Vec<&str> = books
                .iter()
                .flat_map(|b| b.metadata.titles.iter())
                .map(|t| t.trim())
                .filter(|t| !t.is_empty())
                .collect();
            let mut titles = dedup(all.iter().copied());
            let series = all.join(SERIES_SEPARATOR);
            if !series.is_empty() && !titles.contains(&series) {
                titles.push(series);
            }
            titles
        }
    };

    let mut publishers = dedup(
        books
            .iter()
            .flat_map(|b| b.metadata.publishers.iter())
            .filter(|p| p.trim() != options.publisher_tag),
    );
    publishers.push(options.publisher_tag.clone());

    let language = books
        .iter()
        .filter_map(|b| b.metadata.language.as_deref())
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or(DEFAULT_LANGUAGE)
        .to_string();

    MergedMetadata {
        titles,
        authors,
        identifier: format!("urn:uuid:{}", id),
        publishers,
        language,
        date,
    }
}

/// Trimmed, non-empty values in order of first appearance
fn dedup<I, S>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for value in values {
        let value = value.as_ref().trim();
        if !value.is_empty() && !out.iter().any(|v| v == value) {
            out.push(value.to_string());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SourceMetadata;

    fn books() -> Vec<SourceBook> {
        vec![
            SourceBook::new(0, SourceMetadata::new("Alpha").with_author("X").with_publisher("Acme")),
            SourceBook::new(
                1,
                SourceMetadata::new("Beta")
                    .with_author("Y")
                    .with_author("X")
                    .with_publisher("Acme")
                    .with_language("de"),
            ),
        ]
    }

    #[test]
    fn test_derived_titles_and_authors() {
        let meta = synthesize(&books(), &MergeOptions::default());
        assert_eq!(meta.titles, vec!["Alpha", "Beta", "Alpha; Beta"]);
        assert_eq!(meta.authors, vec!["X", "Y"]);
        assert_eq!(meta.language, "de");
    }

    #[test]
    fn test_overrides() {
        let options = MergeOptions::new().with_title("Combined").with_author("");
        let meta = synthesize(&books(), &options);
        assert_eq!(meta.titles, vec!["Combined"]);
        assert_eq!(meta.authors, vec!["X", "Y"]);

        let options = MergeOptions::new().with_author("Editor");
        let meta = synthesize(&books(), &options);
        assert_eq!(meta.authors, vec!["Editor"]);
        assert_eq!(meta.titles.len(), 3);
    }

    #[test]
    fn test_publishers_end_with_tool_tag() {
        let options = MergeOptions::new().with_publisher_tag("EpubMerger test");
        let meta = synthesize(&books(), &options);
        assert_eq!(meta.publishers, vec!["Acme", "EpubMerger test"]);
    }

    #[test]
    fn test_fresh_identifier() {
        let id = Uuid::parse_str("12345678-1234-1234-1234-123456789abc").unwrap();
        let meta = synthesize_with(&books(), &MergeOptions::default(), id, Utc::now());
        assert_eq!(meta.identifier, "urn:uuid:12345678-1234-1234-1234-123456789abc");

        let a = synthesize(&books(), &MergeOptions::default());
        let b = synthesize(&books(), &MergeOptions::default());
        assert_ne!(a.identifier, b.identifier);
    }

    #[test]
    fn test_empty_sources_degrade_gracefully() {
        let books = vec![SourceBook::new(0, SourceMetadata::default())];
        let meta = synthesize(&books, &MergeOptions::default());
        assert!(meta.titles.is_empty());
        assert!(meta.authors.is_empty());
        assert_eq!(meta.language, "en");
        assert_eq!(meta.publishers.len(), 1);
    }

    #[test]
    fn test_single_book_title_not_repeated() {
        let books = vec![SourceBook::new(0, SourceMetadata::new("Solo"))];
        let meta = synthesize(&books, &MergeOptions::default());
        assert_eq!(meta.titles, vec!["Solo"]);
    }
}
