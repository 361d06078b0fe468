//! Navigation tree (table of contents) types

use serde::{Deserialize, Serialize};

/// Where a navigation entry points: a resource href plus an optional anchor
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NavTarget {
    /// Resource href (source href in a source book, namespaced href once merged)
    pub href: String,

    /// Fragment identifier without the leading `#`
    pub fragment: Option<String>,
}

impl NavTarget {
    pub fn new(href: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            fragment: None,
        }
    }

    /// Split `chapter.xhtml#section` into href and fragment
    pub fn parse(link: &str) -> Self {
        match link.split_once('#') {
            Some((href, fragment)) => Self {
                href: href.to_string(),
                fragment: (!fragment.is_empty()).then(|| fragment.to_string()),
            },
            None => Self::new(link),
        }
    }

    pub fn with_fragment(mut self, fragment: impl Into<String>) -> Self {
        self.fragment = Some(fragment.into());
        self
    }

    /// Render back to `href#fragment` form
    pub fn to_link(&self) -> String {
        match &self.fragment {
            Some(fragment) => format!("{}#{}", self.href, fragment),
            None => self.href.clone(),
        }
    }
}

/// A single entry in the navigation tree
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NavigationNode {
    /// Display title
    pub title: String,

    /// Target resource and anchor
    pub target: NavTarget,

    /// Child entries, in display order
    pub children: Vec<NavigationNode>,
}

impl NavigationNode {
    /// Create a new leaf entry
    pub fn new(title: impl Into<String>, target: NavTarget) -> Self {
        Self {
            title: title.into(),
            target,
            children: Vec::new(),
        }
    }

    /// Add child entries
    pub fn with_children(mut self, children: Vec<NavigationNode>) -> Self {
        self.children = children;
        self
    }

    /// Number of nodes in this subtree, including self
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(|c| c.node_count()).sum::<usize>()
    }

    /// Depth of this subtree (a leaf has depth 1)
    pub fn depth(&self) -> usize {
        1 + self.children.iter().map(|c| c.depth()).max().unwrap_or(0)
    }
}
