//! The merged document - output of the merge engine, input of the writer

use super::{MergedMetadata, NavigationNode, Resource, ResourceKey};
use serde::{Deserialize, Serialize};

/// A source resource relocated into the merged package
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NamespacedResource {
    /// Where the resource came from
    pub key: ResourceKey,

    /// Identifier, unique across the merged package
    pub id: String,

    /// Href, unique across the merged package
    pub href: String,

    /// Original resource; text content has its internal links rewritten
    pub payload: Resource,
}

impl NamespacedResource {
    pub fn media_type(&self) -> Option<&str> {
        self.payload.media_type.as_deref()
    }

    pub fn data(&self) -> &[u8] {
        &self.payload.data
    }
}

/// The fully composed merged package
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MergedDocument {
    /// Synthesized metadata
    pub metadata: MergedMetadata,

    /// Every carried resource, grouped by book in ascending index order
    pub resources: Vec<NamespacedResource>,

    /// Linear reading order, as namespaced hrefs
    pub reading_order: Vec<String>,

    /// One root node per source book
    pub navigation: Vec<NavigationNode>,

    /// Namespaced href of the cover page
    pub cover: Option<String>,

    /// Namespaced href of the cover image
    pub cover_image: Option<String>,

    /// Number of internal references rewritten during the merge
    pub rewritten_links: usize,
}

impl MergedDocument {
    /// Look up a resource by namespaced href
    pub fn resource(&self, href: &str) -> Option<&NamespacedResource> {
        self.resources.iter().find(|r| r.href == href)
    }

    /// Serializable overview of the merge result
    pub fn summary(&self) -> MergeSummary {
        MergeSummary {
            titles: self.metadata.titles.clone(),
            authors: self.metadata.authors.clone(),
            identifier: self.metadata.identifier.clone(),
            resources: self.resources.len(),
            reading_order: self.reading_order.len(),
            navigation_roots: self.navigation.len(),
            navigation_entries: self.navigation.iter().map(|n| n.node_count()).sum(),
            rewritten_links: self.rewritten_links,
        }
    }
}

/// Merge report
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MergeSummary {
    pub titles: Vec<String>,
    pub authors: Vec<String>,
    pub identifier: String,
    pub resources: usize,
    pub reading_order: usize,
    pub navigation_roots: usize,
    pub navigation_entries: usize,
    pub rewritten_links: usize,
}
