//! The source book type - one decoded input package

use super::{NavigationNode, Resource, ResourceKey, SourceMetadata};
use serde::{Deserialize, Serialize};

/// Title used when a package declares none
pub const UNTITLED: &str = "Untitled";

/// One decoded input package, immutable once read
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceBook {
    /// Position among the merge inputs (zero-based)
    pub index: usize,

    /// Book metadata (titles, authors, publishers)
    pub metadata: SourceMetadata,

    /// Every resource in manifest order
    pub resources: Vec<Resource>,

    /// Linear reading order, as resource hrefs
    pub reading_order: Vec<String>,

    /// The book's own navigation tree, if it has one
    pub navigation: Option<Vec<NavigationNode>>,

    /// Href of the cover page
    pub cover: Option<String>,

    /// Href of the cover image
    pub cover_image: Option<String>,
}

impl SourceBook {
    /// Create an empty book at the given input position
    pub fn new(index: usize, metadata: SourceMetadata) -> Self {
        Self {
            index,
            metadata,
            resources: Vec::new(),
            reading_order: Vec::new(),
            navigation: None,
            cover: None,
            cover_image: None,
        }
    }

    /// Add a resource
    pub fn add_resource(&mut self, resource: Resource) {
        self.resources.push(resource);
    }

    /// Append a resource href to the reading order
    pub fn add_to_reading_order(&mut self, href: impl Into<String>) {
        self.reading_order.push(href.into());
    }

    /// Set the navigation tree
    pub fn with_navigation(mut self, navigation: Vec<NavigationNode>) -> Self {
        self.navigation = Some(navigation);
        self
    }

    /// Set the cover page
    pub fn with_cover(mut self, href: impl Into<String>) -> Self {
        self.cover = Some(href.into());
        self
    }

    /// Main title, or a placeholder when the package declared none
    pub fn title(&self) -> &str {
        self.metadata
            .titles
            .iter()
            .map(|t| t.trim())
            .find(|t| !t.is_empty())
            .unwrap_or(UNTITLED)
    }

    /// Cross-book key for one of this book's hrefs
    pub fn key(&self, href: impl Into<String>) -> ResourceKey {
        ResourceKey::new(self.index, href)
    }

    /// Whether the book carries a non-empty navigation tree
    pub fn has_navigation(&self) -> bool {
        self.navigation.as_ref().is_some_and(|nav| !nav.is_empty())
    }
}
