//! EPUB package reader

use super::parser::{parse_container, parse_nav_document, parse_ncx, parse_opf, PackageDocument};
use super::xml::strip_bom;
use crate::codec::PackageReader;
use crate::error::ParseError;
use crate::merge::href;
use crate::types::{NavigationNode, Resource, SourceBook, NCX_MEDIA_TYPE};
use std::io::{Cursor, Read};
use zip::ZipArchive;

type Archive = ZipArchive<Cursor<Vec<u8>>>;

/// Reader for EPUB 2/3 packages
#[derive(Debug, Clone, Default)]
pub struct EpubReader;

impl EpubReader {
    pub fn new() -> Self {
        Self
    }

    /// Decode an in-memory package
    pub fn read_bytes(&self, index: usize, data: Vec<u8>) -> Result<SourceBook, ParseError> {
        let mut archive =
            ZipArchive::new(Cursor::new(data)).map_err(|e| ParseError::InvalidArchive(e.to_string()))?;

        let container = read_text(&mut archive, "META-INF/container.xml")?;
        let opf_path = parse_container(&container)?;
        let opf = read_text(&mut archive, &opf_path)?;
        let package = parse_opf(&opf, &opf_path)?;
        let base = href::parent(&opf_path).to_string();

        let mut book = SourceBook::new(index, package.metadata.clone());

        for item in &package.manifest {
            let path = entry_path(&base, &item.href);
            match read_entry(&mut archive, &path) {
                Ok(data) => book.add_resource(Resource::new(
                    item.id.clone(),
                    item.href.clone(),
                    item.media_type.clone(),
                    data,
                )),
                Err(_) => tracing::warn!(path = %path, "manifest item missing from archive, skipping"),
            }
        }

        for idref in &package.spine_ids {
            match package.item(idref) {
                Some(item) => book.add_to_reading_order(item.href.clone()),
                None => tracing::warn!(idref = %idref, "spine references unknown manifest id, skipping"),
            }
        }

        book.navigation = self.read_navigation(&mut archive, &base, &package)?;

        book.cover = package
            .guide_cover
            .as_ref()
            .filter(|href| package.item_by_href(href).is_some())
            .cloned();

        book.cover_image = package
            .manifest
            .iter()
            .find(|item| item.has_property("cover-image"))
            .or_else(|| package.cover_meta_id.as_deref().and_then(|id| package.item(id)))
            .map(|item| item.href.clone());

        tracing::debug!(
            index,
            title = book.title(),
            resources = book.resources.len(),
            reading_order = book.reading_order.len(),
            "decoded package"
        );
        Ok(book)
    }

    /// Navigation tree from the NCX, or else from the EPUB 3 navigation document
    fn read_navigation(
        &self,
        archive: &mut Archive,
        base: &str,
        package: &PackageDocument,
    ) -> Result<Option<Vec<NavigationNode>>, ParseError> {
        let ncx = package
            .toc_id
            .as_deref()
            .and_then(|id| package.item(id))
            .or_else(|| {
                package
                    .manifest
                    .iter()
                    .find(|item| item.media_type.eq_ignore_ascii_case(NCX_MEDIA_TYPE))
            });

        if let Some(item) = ncx {
            let content = read_text(archive, &entry_path(base, &item.href))?;
            let nav = parse_ncx(&content, &item.href)?;
            if !nav.is_empty() {
                return Ok(Some(nav));
            }
        }

        if let Some(item) = package.manifest.iter().find(|item| item.has_property("nav")) {
            let content = read_text(archive, &entry_path(base, &item.href))?;
            let nav = parse_nav_document(&content, &item.href)?;
            if !nav.is_empty() {
                return Ok(Some(nav));
            }
        }

        Ok(None)
    }
}

impl PackageReader for EpubReader {
    fn read(&self, index: usize, reader: &mut dyn Read) -> Result<SourceBook, ParseError> {
        let mut data = Vec::new();
        reader
            .read_to_end(&mut data)
            .map_err(|e| ParseError::InvalidArchive(e.to_string()))?;
        self.read_bytes(index, data)
    }

    fn supported_extensions(&self) -> &[&str] {
        &["epub"]
    }
}

/// Archive path of an OPF-relative href
fn entry_path(base: &str, href: &str) -> String {
    if base.is_empty() {
        href.to_string()
    } else {
        format!("{}/{}", base, href)
    }
}

fn read_entry(archive: &mut Archive, path: &str) -> Result<Vec<u8>, ParseError> {
    let mut file = archive
        .by_name(path)
        .map_err(|_| ParseError::MissingEntry(path.to_string()))?;
    let mut data = Vec::new();
    file.read_to_end(&mut data)
        .map_err(|e| ParseError::InvalidArchive(format!("{}: {}", path, e)))?;
    Ok(data)
}

fn read_text(archive: &mut Archive, path: &str) -> Result<String, ParseError> {
    let data = read_entry(archive, path)?;
    Ok(String::from_utf8_lossy(strip_bom(&data)).into_owned())
}
