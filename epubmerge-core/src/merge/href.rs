//! Package-relative href arithmetic

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};

/// Characters escaped when an href is written back into markup
const HREF_ESCAPE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// A reference split into its path, query and fragment parts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitReference<'a> {
    pub path: &'a str,
    /// Query including the leading `?`
    pub query: &'a str,
    /// Fragment including the leading `#`
    pub fragment: &'a str,
}

/// Split `path?query#fragment`
pub fn split_reference(reference: &str) -> SplitReference<'_> {
    let (before_fragment, fragment) = match reference.find('#') {
        Some(pos) => reference.split_at(pos),
        None => (reference, ""),
    };
    let (path, query) = match before_fragment.find('?') {
        Some(pos) => before_fragment.split_at(pos),
        None => (before_fragment, ""),
    };
    SplitReference {
        path,
        query,
        fragment,
    }
}

/// Whether a reference can point inside the package.
///
/// Scheme-qualified URIs, network-path and absolute references, and
/// fragment-only references are not package-internal.
pub fn is_internal(reference: &str) -> bool {
    let reference = reference.trim();
    if reference.is_empty() || reference.starts_with('#') || reference.starts_with('/') {
        return false;
    }
    !has_scheme(reference)
}

fn has_scheme(reference: &str) -> bool {
    let Some(colon) = reference.find(':') else {
        return false;
    };
    let scheme = &reference[..colon];
    let mut chars = scheme.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {
            chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        _ => false,
    }
}

/// Percent-decode an href path
pub fn decode(path: &str) -> String {
    percent_decode_str(path).decode_utf8_lossy().into_owned()
}

/// Percent-encode an href path for writing into markup
pub fn encode(path: &str) -> String {
    utf8_percent_encode(path, HREF_ESCAPE).to_string()
}

/// Directory part of an href (`"a/b/c.xhtml"` -> `"a/b"`)
pub fn parent(href: &str) -> &str {
    href.rfind('/').map(|pos| &href[..pos]).unwrap_or("")
}

/// Resolve `target` (decoded path, no query/fragment) against the directory of `base`.
///
/// Returns `None` when the path climbs above the package root.
pub fn resolve(base: &str, target: &str) -> Option<String> {
    let mut segments: Vec<&str> = parent(base)
        .split('/')
        .filter(|s| !s.is_empty())
        .collect();

    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop()?;
            }
            other => segments.push(other),
        }
    }

    Some(segments.join("/"))
}

/// Normalize a package-relative href (collapse `.`, `..`, and duplicate slashes)
pub fn normalize(href: &str) -> Option<String> {
    resolve("", href)
}

/// Relative path that leads from the resource at `from` to the resource at `to`
pub fn relative(from: &str, to: &str) -> String {
    let from_dir: Vec<&str> = parent(from).split('/').filter(|s| !s.is_empty()).collect();
    let to_segments: Vec<&str> = to.split('/').filter(|s| !s.is_empty()).collect();
    let to_dir = &to_segments[..to_segments.len().saturating_sub(1)];

    let common = from_dir
        .iter()
        .zip(to_dir.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<&str> = Vec::new();
    parts.extend(std::iter::repeat("..").take(from_dir.len() - common));
    parts.extend(&to_segments[common..]);
    parts.join("/")
}
