//! EPUB package parsing (container.xml, OPF, NCX, EPUB 3 navigation document)

use super::xml::{attribute, local_name, push_text, text};
use crate::error::ParseError;
use crate::merge::href;
use crate::types::{NavTarget, NavigationNode, SourceMetadata};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// One manifest entry, href relative to the OPF and percent-decoded
#[derive(Debug, Clone, PartialEq)]
pub struct ManifestItem {
    pub id: String,
    pub href: String,
    pub media_type: String,
    pub properties: Vec<String>,
}

impl ManifestItem {
    pub fn has_property(&self, property: &str) -> bool {
        self.properties.iter().any(|p| p == property)
    }
}

/// Parsed OPF package document
#[derive(Debug, Clone, Default)]
pub struct PackageDocument {
    pub metadata: SourceMetadata,
    /// Manifest in declaration order
    pub manifest: Vec<ManifestItem>,
    pub spine_ids: Vec<String>,
    /// Manifest id named by `<spine toc="...">`
    pub toc_id: Option<String>,
    /// Manifest id named by `<meta name="cover">`
    pub cover_meta_id: Option<String>,
    /// Href of the guide's cover reference, relative to the OPF
    pub guide_cover: Option<String>,
}

impl PackageDocument {
    pub fn item(&self, id: &str) -> Option<&ManifestItem> {
        self.manifest.iter().find(|item| item.id == id)
    }

    pub fn item_by_href(&self, href: &str) -> Option<&ManifestItem> {
        self.manifest.iter().find(|item| item.href == href)
    }
}

fn xml_error(path: &str, err: impl std::fmt::Display) -> ParseError {
    ParseError::InvalidXml {
        path: path.to_string(),
        message: err.to_string(),
    }
}

/// Normalize a raw (possibly percent-encoded) href relative to `base`
fn normalize_href(raw: &str) -> Option<String> {
    let split = href::split_reference(raw.trim());
    href::normalize(&href::decode(split.path))
}

/// Find the OPF path in META-INF/container.xml
pub fn parse_container(content: &str) -> Result<String, ParseError> {
    const PATH: &str = "META-INF/container.xml";
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) if local_name(e.name().as_ref()) == b"rootfile" => {
                if let Some(path) = attribute(&e, b"full-path") {
                    return Ok(path);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(xml_error(PATH, e)),
            _ => {}
        }
    }

    Err(ParseError::MissingField("rootfile full-path".to_string()))
}

/// Parse the OPF package document located at `opf_path`
pub fn parse_opf(content: &str, opf_path: &str) -> Result<PackageDocument, ParseError> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let mut package = PackageDocument::default();
    let mut in_metadata = false;
    let mut in_guide = false;
    let mut current: Option<Vec<u8>> = None;
    let mut buffer = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = e.name();
                let local = local_name(name.as_ref());
                match local {
                    b"metadata" => in_metadata = true,
                    b"guide" => in_guide = true,
                    b"title" | b"creator" | b"publisher" | b"language" | b"identifier"
                        if in_metadata =>
                    {
                        current = Some(local.to_vec());
                        buffer.clear();
                    }
                    _ => read_opf_element(&e, local, &mut package, in_metadata, in_guide),
                }
            }
            Ok(Event::Empty(e)) => {
                let name = e.name();
                read_opf_element(&e, local_name(name.as_ref()), &mut package, in_metadata, in_guide);
            }
            Ok(Event::Text(e)) => {
                if current.is_some() {
                    buffer.push_str(&text(&e));
                }
            }
            Ok(Event::CData(e)) => {
                if current.is_some() {
                    buffer.push_str(&String::from_utf8_lossy(&e));
                }
            }
            Ok(Event::End(e)) => {
                let name = e.name();
                match local_name(name.as_ref()) {
                    b"metadata" => in_metadata = false,
                    b"guide" => in_guide = false,
                    _ => {}
                }

                if let Some(element) = current.take() {
                    let value = buffer.trim().to_string();
                    let meta = &mut package.metadata;
                    match element.as_slice() {
                        b"title" => meta.titles.push(value),
                        b"creator" => meta.authors.push(value),
                        b"publisher" => meta.publishers.push(value),
                        b"language" if meta.language.is_none() => meta.language = Some(value),
                        b"identifier" if meta.identifier.is_none() => meta.identifier = Some(value),
                        _ => {}
                    }
                    buffer.clear();
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(xml_error(opf_path, e)),
            _ => {}
        }
    }

    Ok(package)
}

/// Attribute-only OPF elements, in either `<x/>` or `<x></x>` form
fn read_opf_element(
    e: &BytesStart,
    local: &[u8],
    package: &mut PackageDocument,
    in_metadata: bool,
    in_guide: bool,
) {
    match local {
        b"spine" => package.toc_id = attribute(e, b"toc"),
        b"item" => {
            let id = attribute(e, b"id").unwrap_or_default();
            let raw_href = attribute(e, b"href").unwrap_or_default();
            let Some(item_href) = normalize_href(&raw_href) else {
                tracing::warn!(href = %raw_href, "manifest href escapes the package, skipping");
                return;
            };
            package.manifest.push(ManifestItem {
                id,
                href: item_href,
                media_type: attribute(e, b"media-type").unwrap_or_default(),
                properties: attribute(e, b"properties")
                    .map(|p| p.split_ascii_whitespace().map(String::from).collect())
                    .unwrap_or_default(),
            });
        }
        b"itemref" => {
            if let Some(idref) = attribute(e, b"idref") {
                package.spine_ids.push(idref);
            }
        }
        b"meta" if in_metadata => {
            if attribute(e, b"name").as_deref() == Some("cover") {
                package.cover_meta_id = attribute(e, b"content");
            }
        }
        b"reference" if in_guide => {
            let is_cover = attribute(e, b"type").is_some_and(|t| t.eq_ignore_ascii_case("cover"));
            if is_cover && package.guide_cover.is_none() {
                package.guide_cover = attribute(e, b"href").and_then(|raw| normalize_href(&raw));
            }
        }
        _ => {}
    }
}

struct PointState {
    title: String,
    src: Option<String>,
    children: Vec<NavigationNode>,
}

fn read_content_src(e: &BytesStart, stack: &mut [PointState]) {
    if let Some(state) = stack.last_mut() {
        state.src = attribute(e, b"src");
    }
}

/// Parse an NCX navigation map. Targets are re-based from `ncx_href` to
/// OPF-relative hrefs.
pub fn parse_ncx(content: &str, ncx_href: &str) -> Result<Vec<NavigationNode>, ParseError> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let mut roots = Vec::new();
    let mut stack: Vec<PointState> = Vec::new();
    let mut in_label_text = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match local_name(e.name().as_ref()) {
                b"navPoint" => stack.push(PointState {
                    title: String::new(),
                    src: None,
                    children: Vec::new(),
                }),
                b"text" => in_label_text = !stack.is_empty(),
                b"content" => read_content_src(&e, &mut stack),
                _ => {}
            },
            Ok(Event::Empty(e)) => {
                if local_name(e.name().as_ref()) == b"content" {
                    read_content_src(&e, &mut stack);
                }
            }
            Ok(Event::Text(e)) => {
                if in_label_text {
                    if let Some(state) = stack.last_mut() {
                        push_text(&mut state.title, &text(&e));
                    }
                }
            }
            Ok(Event::End(e)) => match local_name(e.name().as_ref()) {
                b"text" => in_label_text = false,
                b"navPoint" => {
                    if let Some(state) = stack.pop() {
                        let node = state
                            .src
                            .as_deref()
                            .and_then(|src| nav_target(ncx_href, src))
                            .map(|target| {
                                NavigationNode::new(state.title, target).with_children(state.children)
                            });
                        match node {
                            Some(node) => match stack.last_mut() {
                                Some(parent) => parent.children.push(node),
                                None => roots.push(node),
                            },
                            None => tracing::warn!(ncx = ncx_href, "navPoint without usable content src, dropped"),
                        }
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(xml_error(ncx_href, e)),
            _ => {}
        }
    }

    Ok(roots)
}

/// Parse the `toc` navigation of an EPUB 3 navigation document
pub fn parse_nav_document(content: &str, nav_href: &str) -> Result<Vec<NavigationNode>, ParseError> {
    struct ItemState {
        title: String,
        link: Option<String>,
        in_sublist: bool,
        children: Vec<NavigationNode>,
    }

    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);
    reader.config_mut().check_end_names = false;

    let mut roots = Vec::new();
    let mut stack: Vec<ItemState> = Vec::new();
    let mut nav_depth = 0usize;
    let mut toc_depth: Option<usize> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = e.name();
                match local_name(name.as_ref()) {
                    b"nav" => {
                        nav_depth += 1;
                        let is_toc = attribute(&e, b"epub:type")
                            .is_some_and(|t| t.split_ascii_whitespace().any(|t| t == "toc"));
                        if is_toc && toc_depth.is_none() {
                            toc_depth = Some(nav_depth);
                        }
                    }
                    _ if toc_depth.is_none() => {}
                    b"ol" => {
                        if let Some(item) = stack.last_mut() {
                            item.in_sublist = true;
                        }
                    }
                    b"li" => stack.push(ItemState {
                        title: String::new(),
                        link: None,
                        in_sublist: false,
                        children: Vec::new(),
                    }),
                    b"a" => {
                        if let Some(item) = stack.last_mut().filter(|i| !i.in_sublist) {
                            item.link = attribute(&e, b"href");
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::Text(e)) => {
                if toc_depth.is_some() {
                    if let Some(item) = stack.last_mut().filter(|i| !i.in_sublist) {
                        push_text(&mut item.title, &text(&e));
                    }
                }
            }
            Ok(Event::End(e)) => {
                let name = e.name();
                match local_name(name.as_ref()) {
                    b"nav" => {
                        if toc_depth == Some(nav_depth) {
                            toc_depth = None;
                        }
                        nav_depth = nav_depth.saturating_sub(1);
                    }
                    _ if toc_depth.is_none() => {}
                    b"li" => {
                        if let Some(item) = stack.pop() {
                            let target = item
                                .link
                                .as_deref()
                                .and_then(|link| nav_target(nav_href, link))
                                .or_else(|| item.children.first().map(|c| c.target.clone()));
                            if let Some(target) = target {
                                let node = NavigationNode::new(item.title, target)
                                    .with_children(item.children);
                                match stack.last_mut() {
                                    Some(parent) => parent.children.push(node),
                                    None => roots.push(node),
                                }
                            }
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(xml_error(nav_href, e)),
            _ => {}
        }
    }

    Ok(roots)
}

/// Resolve a navigation link relative to the document that contains it
fn nav_target(document_href: &str, link: &str) -> Option<NavTarget> {
    if !href::is_internal(link) {
        return None;
    }
    let target = NavTarget::parse(link.trim());
    let path = href::split_reference(&target.href).path;
    Some(NavTarget {
        href: href::resolve(document_href, &href::decode(path))?,
        fragment: target.fragment,
    })
}
