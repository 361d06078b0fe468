//! EPUB package writer

use super::xml::escape;
use crate::codec::PackageWriter;
use crate::error::WriteError;
use crate::merge::href;
use crate::types::{MergedDocument, NavTarget, NavigationNode, NCX_MEDIA_TYPE};
use std::io::{Cursor, Seek, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Directory holding the package document and every resource
const CONTENT_DIR: &str = "OEBPS";

const NCX_ID: &str = "ncx";
const NCX_HREF: &str = "toc.ncx";
const FALLBACK_MEDIA_TYPE: &str = "application/octet-stream";

const CONTAINER_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>"#;

/// Writer for EPUB 2 packages with an NCX table of contents
#[derive(Debug, Clone, Default)]
pub struct EpubWriter;

impl EpubWriter {
    pub fn new() -> Self {
        Self
    }

    /// Write a package to any seekable destination
    pub fn write_to<W: Write + Seek>(&self, document: &MergedDocument, writer: W) -> Result<W, WriteError> {
        let mut zip = ZipWriter::new(writer);

        let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        let deflated = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        zip.start_file("mimetype", stored)?;
        zip.write_all(b"application/epub+zip")?;

        zip.start_file("META-INF/container.xml", deflated)?;
        zip.write_all(CONTAINER_XML.as_bytes())?;

        zip.start_file(format!("{}/content.opf", CONTENT_DIR), deflated)?;
        zip.write_all(generate_opf(document).as_bytes())?;

        zip.start_file(format!("{}/{}", CONTENT_DIR, NCX_HREF), deflated)?;
        zip.write_all(generate_ncx(document).as_bytes())?;

        for resource in &document.resources {
            zip.start_file(format!("{}/{}", CONTENT_DIR, resource.href), deflated)?;
            zip.write_all(resource.data())?;
        }

        let writer = zip.finish()?;
        tracing::debug!(resources = document.resources.len(), "package written");
        Ok(writer)
    }
}

impl PackageWriter for EpubWriter {
    fn write(&self, document: &MergedDocument, writer: &mut dyn Write) -> Result<(), WriteError> {
        let buffer = self.write_to(document, Cursor::new(Vec::new()))?;
        writer.write_all(buffer.get_ref())?;
        writer.flush()?;
        Ok(())
    }

    fn file_extension(&self) -> &str {
        "epub"
    }
}

/// Generate the OPF package document
fn generate_opf(document: &MergedDocument) -> String {
    let meta = &document.metadata;
    let mut opf = String::from(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<package xmlns="http://www.idpf.org/2007/opf" version="2.0" unique-identifier="BookId">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:opf="http://www.idpf.org/2007/opf">
"#,
    );

    for title in &meta.titles {
        opf.push_str(&format!("    <dc:title>{}</dc:title>\n", escape(title)));
    }
    for author in &meta.authors {
        opf.push_str(&format!(
            "    <dc:creator opf:role=\"aut\">{}</dc:creator>\n",
            escape(author)
        ));
    }
    for publisher in &meta.publishers {
        opf.push_str(&format!("    <dc:publisher>{}</dc:publisher>\n", escape(publisher)));
    }
    opf.push_str(&format!(
        "    <dc:identifier id=\"BookId\" opf:scheme=\"UUID\">{}</dc:identifier>\n",
        escape(&meta.identifier)
    ));
    opf.push_str(&format!("    <dc:language>{}</dc:language>\n", escape(&meta.language)));
    opf.push_str(&format!("    <dc:date>{}</dc:date>\n", meta.date.format("%Y-%m-%d")));

    if let Some(cover) = document.cover_image.as_deref().and_then(|h| document.resource(h)) {
        opf.push_str(&format!("    <meta name=\"cover\" content=\"{}\"/>\n", escape(&cover.id)));
    }
    opf.push_str("  </metadata>\n  <manifest>\n");

    opf.push_str(&format!(
        "    <item id=\"{}\" href=\"{}\" media-type=\"{}\"/>\n",
        NCX_ID, NCX_HREF, NCX_MEDIA_TYPE
    ));
    for resource in &document.resources {
        opf.push_str(&format!(
            "    <item id=\"{}\" href=\"{}\" media-type=\"{}\"/>\n",
            escape(&resource.id),
            escape(&href::encode(&resource.href)),
            escape(resource.media_type().unwrap_or(FALLBACK_MEDIA_TYPE))
        ));
    }
    opf.push_str("  </manifest>\n");

    opf.push_str(&format!("  <spine toc=\"{}\">\n", NCX_ID));
    for href in &document.reading_order {
        if let Some(resource) = document.resource(href) {
            opf.push_str(&format!("    <itemref idref=\"{}\"/>\n", escape(&resource.id)));
        }
    }
    opf.push_str("  </spine>\n");

    if let Some(cover) = &document.cover {
        opf.push_str(&format!(
            "  <guide>\n    <reference type=\"cover\" title=\"Cover\" href=\"{}\"/>\n  </guide>\n",
            escape(&href::encode(cover))
        ));
    }

    opf.push_str("</package>\n");
    opf
}

/// Generate the NCX table of contents from the merged navigation tree
fn generate_ncx(document: &MergedDocument) -> String {
    let meta = &document.metadata;
    let depth = document.navigation.iter().map(|n| n.depth()).max().unwrap_or(1);

    let mut ncx = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<ncx xmlns="http://www.daisy.org/z3986/2005/ncx/" version="2005-1">
  <head>
    <meta name="dtb:uid" content="{}"/>
    <meta name="dtb:depth" content="{}"/>
    <meta name="dtb:totalPageCount" content="0"/>
    <meta name="dtb:maxPageNumber" content="0"/>
  </head>
  <docTitle><text>{}</text></docTitle>
"#,
        escape(&meta.identifier),
        depth,
        escape(meta.title().unwrap_or_default())
    );
    for author in &meta.authors {
        ncx.push_str(&format!("  <docAuthor><text>{}</text></docAuthor>\n", escape(author)));
    }

    ncx.push_str("  <navMap>\n");
    let mut play_order = 0;
    for node in &document.navigation {
        write_nav_point(&mut ncx, node, 2, &mut play_order);
    }
    ncx.push_str("  </navMap>\n</ncx>\n");
    ncx
}

fn write_nav_point(out: &mut String, node: &NavigationNode, indent: usize, play_order: &mut usize) {
    *play_order += 1;
    let pad = "  ".repeat(indent);
    let src = NavTarget {
        href: href::encode(&node.target.href),
        fragment: node.target.fragment.clone(),
    }
    .to_link();

    out.push_str(&format!(
        "{pad}<navPoint id=\"navPoint-{order}\" playOrder=\"{order}\">\n\
         {pad}  <navLabel><text>{title}</text></navLabel>\n\
         {pad}  <content src=\"{src}\"/>\n",
        order = play_order,
        title = escape(&node.title),
        src = escape(&src),
    ));
    for child in &node.children {
        write_nav_point(out, child, indent + 1, play_order);
    }
    out.push_str(&format!("{pad}</navPoint>\n"));
}
