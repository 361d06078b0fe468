//! Package resources (pages, images, style sheets, fonts, etc.)

use serde::{Deserialize, Serialize};

/// Media type of the compiled navigation-control document (NCX)
pub const NCX_MEDIA_TYPE: &str = "application/x-dtbncx+xml";

/// Media types whose content is scanned for internal links
const TEXT_MEDIA_TYPES: &[&str] = &[
    "application/xhtml+xml",
    "text/html",
    "text/plain",
    "text/xml",
    "application/xml",
    "text/css",
    "image/svg+xml",
];

/// A single addressable content unit inside a package
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Resource {
    /// Manifest identifier
    pub id: String,

    /// Path relative to the package document, unique within its book
    pub href: String,

    /// MIME type (e.g., "application/xhtml+xml", "image/png").
    /// `None` when the package declared nothing usable.
    pub media_type: Option<String>,

    /// Raw content
    #[serde(with = "base64_serde")]
    pub data: Vec<u8>,
}

impl Resource {
    /// Create a new resource
    pub fn new(
        id: impl Into<String>,
        href: impl Into<String>,
        media_type: impl Into<String>,
        data: Vec<u8>,
    ) -> Self {
        let media_type = media_type.into();
        Self {
            id: id.into(),
            href: href.into(),
            media_type: (!media_type.trim().is_empty()).then_some(media_type),
            data,
        }
    }

    /// Media type with parameters (`; charset=...`) stripped and lowercased
    pub fn essence(&self) -> Option<String> {
        self.media_type.as_deref().map(|m| {
            m.split(';')
                .next()
                .unwrap_or_default()
                .trim()
                .to_ascii_lowercase()
        })
    }

    /// Whether the content is markup/text/XML and subject to link rewriting
    pub fn is_text_based(&self) -> bool {
        self.essence()
            .map(|m| TEXT_MEDIA_TYPES.contains(&m.as_str()))
            .unwrap_or(false)
    }

    /// Whether this is the book's compiled table of contents
    pub fn is_navigation_control(&self) -> bool {
        self.essence().as_deref() == Some(NCX_MEDIA_TYPE)
    }
}

/// Base64 serialization for binary data
mod base64_serde {
    use base64::{engine::general_purpose::STANDARD, Engine};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&STANDARD.encode(data))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        STANDARD.decode(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_based_detection() {
        let page = Resource::new("p", "p.xhtml", "application/xhtml+xml", vec![]);
        assert!(page.is_text_based());

        let css = Resource::new("c", "style.css", "text/css; charset=utf-8", vec![]);
        assert!(css.is_text_based());

        let image = Resource::new("i", "cover.png", "image/png", vec![]);
        assert!(!image.is_text_based());
    }

    #[test]
    fn test_unknown_media_type_is_binary() {
        let res = Resource::new("x", "blob.bin", "", vec![1, 2, 3]);
        assert_eq!(res.media_type, None);
        assert!(!res.is_text_based());
        assert!(!res.is_navigation_control());
    }

    #[test]
    fn test_navigation_control_detection() {
        let ncx = Resource::new("ncx", "toc.ncx", "application/x-dtbncx+xml", vec![]);
        assert!(ncx.is_navigation_control());
        assert!(!ncx.is_text_based());
    }

    #[test]
    fn test_resource_serialization() {
        let res = Resource::new("i", "a.png", "image/png", vec![0, 159, 146, 150]);
        let json = serde_json::to_string(&res).unwrap();
        assert!(json.contains("AJ+Slg=="));
        let back: Resource = serde_json::from_str(&json).unwrap();
        assert_eq!(back, res);
    }
}
