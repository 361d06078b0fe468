//! Merge configuration

use serde::{Deserialize, Serialize};

/// Publisher tag identifying this tool in merged packages
pub const DEFAULT_PUBLISHER_TAG: &str = concat!("EpubMerger ", env!("CARGO_PKG_VERSION"));

/// What a book without its own navigation tree gets under its section
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum NavigationFallback {
    /// The section entry alone
    #[default]
    SingleEntry,

    /// One child entry per reading-order item
    ReadingOrder,
}

/// Options for one merge
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MergeOptions {
    /// Merged title; empty or unset means derive from the sources
    pub title_override: Option<String>,

    /// Merged author; empty or unset means derive from the sources
    pub author_override: Option<String>,

    /// Navigation for books that carry no tree of their own
    pub navigation_fallback: NavigationFallback,

    /// Always appended to the merged publishers
    pub publisher_tag: String,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            title_override: None,
            author_override: None,
            navigation_fallback: NavigationFallback::default(),
            publisher_tag: DEFAULT_PUBLISHER_TAG.to_string(),
        }
    }
}

impl MergeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the merged title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title_override = Some(title.into());
        self
    }

    /// Set the merged author
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author_override = Some(author.into());
        self
    }

    /// Set the navigation fallback
    pub fn with_navigation_fallback(mut self, fallback: NavigationFallback) -> Self {
        self.navigation_fallback = fallback;
        self
    }

    /// Set the publisher tag
    pub fn with_publisher_tag(mut self, tag: impl Into<String>) -> Self {
        self.publisher_tag = tag.into();
        self
    }

    /// Title override, if one was actually given
    pub fn title(&self) -> Option<&str> {
        non_empty(self.title_override.as_deref())
    }

    /// Author override, if one was actually given
    pub fn author(&self) -> Option<&str> {
        non_empty(self.author_override.as_deref())
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
