//! Internal link rewriting for text-based resources

use super::href;
use super::namespace::NamespaceMap;
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::OnceLock;

/// Markup start tags, quoted attribute values may contain `<` or `>`
fn start_tag_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"<[A-Za-z](?:[^<>"']|"[^"]*"|'[^']*')*>"#).expect("start tag pattern is valid")
    })
}

/// Attributes that carry resource references, matched inside one start tag
fn attribute_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"(?i)(\s)((?:xlink:)?href|src|poster)(\s*=\s*)(?:"([^"]*)"|'([^']*)')"#)
            .expect("attribute pattern is valid")
    })
}

/// CSS `url(...)` references
fn css_url_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"(?i)url\(\s*(?:"([^"]*)"|'([^']*)'|([^)'"\s]+))\s*\)"#)
            .expect("url pattern is valid")
    })
}

/// CSS `@import "..."` references
fn css_import_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"(?i)@import\s+(?:"([^"]*)"|'([^']*)')"#).expect("import pattern is valid")
    })
}

/// Rewrites references inside one book's text resources so they resolve
/// against the namespaced hrefs.
pub struct LinkRewriter<'a> {
    /// Source href -> namespaced href for the book being rewritten
    table: &'a HashMap<String, String>,
}

impl<'a> LinkRewriter<'a> {
    pub fn new(table: &'a HashMap<String, String>) -> Self {
        Self { table }
    }

    /// Rewrite `content` of the resource at `source_href`, which now lives at `new_href`.
    ///
    /// Returns the rewritten text and the number of references changed.
    pub fn rewrite(&self, content: &str, source_href: &str, new_href: &str) -> (String, usize) {
        let mut count = 0;

        let rewritten = start_tag_pattern().replace_all(content, |tag: &Captures| {
            attribute_pattern()
                .replace_all(&tag[0], |caps: &Captures| {
                    let (value, quote) = quoted_value(caps, 4, 5);
                    match self.rewrite_reference(value, source_href, new_href) {
                        Some(new_value) => {
                            count += 1;
                            format!("{}{}{}{quote}{}{quote}", &caps[1], &caps[2], &caps[3], new_value)
                        }
                        None => caps[0].to_string(),
                    }
                })
                .into_owned()
        });

        let rewritten = css_url_pattern().replace_all(&rewritten, |caps: &Captures| {
            let (value, quote) = match caps.get(3) {
                Some(bare) => (bare.as_str(), ""),
                None => quoted_value(caps, 1, 2),
            };
            match self.rewrite_reference(value, source_href, new_href) {
                Some(new_value) => {
                    count += 1;
                    format!("url({quote}{}{quote})", new_value)
                }
                None => caps[0].to_string(),
            }
        });

        let rewritten = css_import_pattern().replace_all(&rewritten, |caps: &Captures| {
            let (value, quote) = quoted_value(caps, 1, 2);
            match self.rewrite_reference(value, source_href, new_href) {
                Some(new_value) => {
                    count += 1;
                    format!("@import {quote}{}{quote}", new_value)
                }
                None => caps[0].to_string(),
            }
        });

        (rewritten.into_owned(), count)
    }

    /// New form of one reference, or `None` when it is left untouched
    fn rewrite_reference(&self, reference: &str, source_href: &str, new_href: &str) -> Option<String> {
        if !href::is_internal(reference) {
            return None;
        }

        let split = href::split_reference(reference.trim());
        let target = href::resolve(source_href, &href::decode(split.path))?;

        match self.table.get(&target) {
            Some(new_target) => Some(format!(
                "{}{}{}",
                href::encode(&href::relative(new_href, new_target)),
                split.query,
                split.fragment
            )),
            None => {
                tracing::warn!(from = source_href, reference, "internal reference has no target in book");
                None
            }
        }
    }
}

/// The value of whichever quote-style group matched, with its quote character
fn quoted_value<'c>(caps: &'c Captures, double: usize, single: usize) -> (&'c str, &'static str) {
    match caps.get(double) {
        Some(m) => (m.as_str(), "\""),
        None => (caps.get(single).map(|m| m.as_str()).unwrap_or_default(), "'"),
    }
}

/// Rewrite internal links of every text-based resource in the map.
///
/// Returns the total number of references changed. Names and keys are left
/// untouched; only payload bytes change.
pub fn rewrite_all(map: &mut NamespaceMap, book_count: usize) -> usize {
    use rayon::prelude::*;

    let tables: Vec<HashMap<String, String>> =
        (0..book_count).map(|i| map.book_table(i)).collect();

    map.entries_mut()
        .par_iter_mut()
        .filter(|entry| entry.payload.is_text_based())
        .map(|entry| {
            let Some(table) = tables.get(entry.key.book_index) else {
                return 0;
            };
            let text = match std::str::from_utf8(&entry.payload.data) {
                Ok(text) => text,
                Err(_) => {
                    tracing::warn!(href = %entry.key.href, "text resource is not valid UTF-8, leaving as-is");
                    return 0;
                }
            };

            let (rewritten, count) = LinkRewriter::new(table).rewrite(text, &entry.key.href, &entry.href);
            if count > 0 {
                tracing::debug!(href = %entry.href, count, "rewrote internal references");
                entry.payload.data = rewritten.into_bytes();
            }
            count
        })
        .sum()
}
