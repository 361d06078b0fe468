//! Reading-order (spine) composition

use super::namespace::NamespaceMap;
use crate::error::{MergeError, ReferenceSite};
use crate::types::SourceBook;
use std::collections::HashSet;

/// Concatenate every book's reading order in input order, namespaced.
///
/// Each resource appears at most once; a repeat within a book keeps its first
/// position.
pub fn compose_reading_order(
    books: &[SourceBook],
    map: &NamespaceMap,
) -> Result<Vec<String>, MergeError> {
    let mut order = Vec::new();
    let mut present = HashSet::new();

    for book in books {
        for href in &book.reading_order {
            let resolved = map.resolve(&book.key(href.clone()), ReferenceSite::ReadingOrder)?;
            if present.insert(resolved.href.clone()) {
                order.push(resolved.href.clone());
            }
        }
    }

    // Completeness check once every book is placed. With the uniqueness check
    // above this adds nothing; it stays as a guard on the first pass.
    for book in books {
        for href in &book.reading_order {
            let resolved = map.resolve(&book.key(href.clone()), ReferenceSite::ReadingOrder)?;
            if present.insert(resolved.href.clone()) {
                tracing::warn!(href = %resolved.href, "reading order entry missed by first pass");
                order.push(resolved.href.clone());
            }
        }
    }

    Ok(order)
}
