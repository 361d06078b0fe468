//! Resource namespacing: relocating every source resource to a globally unique
//! identifier and href inside the merged package.
//!
//! Books are namespaced independently (in parallel) and the per-book partitions
//! are then folded, in ascending book order, into one append-only
//! [`NamespaceMap`]. Uniqueness across the whole package is checked at that
//! fold point.

use crate::error::{MergeError, ReferenceSite};
use crate::types::{NamespacedResource, ResourceKey, SourceBook};
use rayon::prelude::*;
use std::collections::{HashMap, HashSet};

/// Prefix shared by every namespaced href and identifier of one book.
///
/// The digits are terminated by `_`, which makes the prefix uniquely
/// decodable: two different books can never produce the same name.
pub fn book_prefix(book_index: usize) -> String {
    format!("book{}_", book_index)
}

/// Namespaced href for a source href
pub fn namespaced_href(book_index: usize, href: &str) -> String {
    format!("{}{}", book_prefix(book_index), href)
}

/// Namespaced identifier for a source identifier
pub fn namespaced_id(book_index: usize, id: &str) -> String {
    format!("{}{}", book_prefix(book_index), sanitize_id(id))
}

/// Keep identifiers within XML name characters
fn sanitize_id(id: &str) -> String {
    id.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Old -> new lookup table for every carried resource.
///
/// Built once, then only read. Entries keep book order, and within a book the
/// source manifest order.
#[derive(Debug, Clone, Default)]
pub struct NamespaceMap {
    entries: Vec<NamespacedResource>,
    by_key: HashMap<ResourceKey, usize>,
}

impl NamespaceMap {
    /// Namespace every resource of every book
    pub fn build(books: &[SourceBook]) -> Result<Self, MergeError> {
        let partitions: Vec<Vec<NamespacedResource>> =
            books.par_iter().map(namespace_book).collect();

        let mut map = Self::default();
        let mut hrefs = HashSet::new();
        let mut ids = HashSet::new();

        for partition in partitions {
            for entry in partition {
                if !hrefs.insert(entry.href.clone()) {
                    return Err(MergeError::DuplicateNamespacedHref(entry.href));
                }
                if !ids.insert(entry.id.clone()) {
                    return Err(MergeError::DuplicateNamespacedId(entry.id));
                }
                map.by_key.insert(entry.key.clone(), map.entries.len());
                map.entries.push(entry);
            }
        }

        tracing::debug!(resources = map.entries.len(), "namespace map built");
        Ok(map)
    }

    /// Look up a key; unmapped keys are an integrity violation
    pub fn resolve(
        &self,
        key: &ResourceKey,
        site: ReferenceSite,
    ) -> Result<&NamespacedResource, MergeError> {
        self.get(key)
            .ok_or_else(|| MergeError::UnresolvedResourceReference {
                key: key.clone(),
                site,
            })
    }

    pub fn get(&self, key: &ResourceKey) -> Option<&NamespacedResource> {
        self.by_key.get(key).map(|&i| &self.entries[i])
    }

    pub fn entries(&self) -> &[NamespacedResource] {
        &self.entries
    }

    /// Mutable access for in-place payload rewriting; keys and names stay fixed
    pub(crate) fn entries_mut(&mut self) -> &mut [NamespacedResource] {
        &mut self.entries
    }

    /// Source href -> namespaced href for one book
    pub fn book_table(&self, book_index: usize) -> HashMap<String, String> {
        self.entries
            .iter()
            .filter(|e| e.key.book_index == book_index)
            .map(|e| (e.key.href.clone(), e.href.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_resources(self) -> Vec<NamespacedResource> {
        self.entries
    }
}

/// Namespace one book's resources, skipping its navigation-control document
fn namespace_book(book: &SourceBook) -> Vec<NamespacedResource> {
    let mut seen_hrefs = HashSet::new();
    let mut used_ids = HashSet::new();
    let mut out = Vec::with_capacity(book.resources.len());

    for (position, resource) in book.resources.iter().enumerate() {
        if resource.is_navigation_control() {
            tracing::debug!(book = book.index, href = %resource.href, "skipping navigation control");
            continue;
        }

        if resource.media_type.is_none() {
            tracing::warn!(
                book = book.index,
                href = %resource.href,
                "unknown media type, carrying resource as binary"
            );
        }

        if !seen_hrefs.insert(resource.href.as_str()) {
            tracing::warn!(book = book.index, href = %resource.href, "duplicate href, keeping first");
            continue;
        }

        let mut id = namespaced_id(book.index, &resource.id);
        if resource.id.trim().is_empty() || used_ids.contains(&id) {
            id = namespaced_id(book.index, &format!("res{}", position));
            let mut suffix = 1;
            while used_ids.contains(&id) {
                id = namespaced_id(book.index, &format!("res{}-{}", position, suffix));
                suffix += 1;
            }
        }
        used_ids.insert(id.clone());

        out.push(NamespacedResource {
            key: book.key(resource.href.clone()),
            id,
            href: namespaced_href(book.index, &resource.href),
            payload: resource.clone(),
        });
    }

    out
}
