//! Cross-book resource addressing

use serde::{Deserialize, Serialize};
use std::fmt;

/// Addresses a resource across books: hrefs are only unique within one book
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResourceKey {
    /// Position of the owning book among the merge inputs
    pub book_index: usize,

    /// Href as it appears in the owning book
    pub href: String,
}

impl ResourceKey {
    pub fn new(book_index: usize, href: impl Into<String>) -> Self {
        Self {
            book_index,
            href: href.into(),
        }
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(book {}, {})", self.book_index, self.href)
    }
}
