//! Bibliographic metadata types (Dublin Core subset)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metadata as declared by one source package
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SourceMetadata {
    /// Titles in declaration order (the first is the main title)
    pub titles: Vec<String>,

    /// Authors/creators
    pub authors: Vec<String>,

    /// Publisher names
    pub publishers: Vec<String>,

    /// Language code
    pub language: Option<String>,

    /// Declared identifier (ISBN, UUID, ...)
    pub identifier: Option<String>,
}

impl SourceMetadata {
    /// Create metadata with a single title
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            titles: vec![title.into()],
            ..Self::default()
        }
    }

    /// Add an author/creator
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.authors.push(author.into());
        self
    }

    /// Add a publisher
    pub fn with_publisher(mut self, publisher: impl Into<String>) -> Self {
        self.publishers.push(publisher.into());
        self
    }

    /// Set language
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }
}

/// Metadata of the merged package
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MergedMetadata {
    /// Either the single override or every source title plus the series composite
    pub titles: Vec<String>,

    /// Either the single override or the deduplicated source authors
    pub authors: Vec<String>,

    /// Freshly generated `urn:uuid:` identifier
    pub identifier: String,

    /// Deduplicated source publishers followed by the merge tool's tag
    pub publishers: Vec<String>,

    /// Language code
    pub language: String,

    /// Time the merge was produced
    pub date: DateTime<Utc>,
}

impl MergedMetadata {
    /// The main title (first entry), if any
    pub fn title(&self) -> Option<&str> {
        self.titles.first().map(|s| s.as_str())
    }
}
