//! PDF backend built on the `unpdf` extraction library.

use std::collections::HashSet;
use std::path::Path;

use log::{debug, info};
use unicode_normalization::UnicodeNormalization;

use super::images::{encode_image, RawImage};
use super::{ConversionBackend, ConversionConfig};
use crate::detect::{detect_format_from_path, InputFormat};
use crate::error::{Error, Result};
use crate::model::{
    Metadata, PictureElement, SpanCell, StructuredDocument, TableElement, TextElement,
};

/// PDF conversion backend.
#[derive(Debug, Clone, Default)]
pub struct PdfBackend {
    _private: (),
}

impl PdfBackend {
    /// Create a new PDF backend.
    pub fn new() -> Self {
        Self { _private: () }
    }
}

impl ConversionBackend for PdfBackend {
    fn name(&self) -> &str {
        "pdf"
    }

    fn supported_extensions(&self) -> &[&str] {
        &["pdf"]
    }

    fn convert(&self, path: &Path, config: &ConversionConfig) -> Result<StructuredDocument> {
        match detect_format_from_path(path) {
            Ok(Some(InputFormat::Pdf { version })) => debug!("{}: PDF {}", path.display(), version),
            Ok(_) => {
                return Err(Error::conversion(
                    path,
                    "Unknown file format: not a valid PDF",
                ))
            }
            Err(e) => return Err(Error::conversion(path, e.to_string())),
        }

        let options = unpdf::ParseOptions::new().lenient().with_resources(true);
        let parsed = unpdf::parse_file_with_options(path, options)
            .map_err(|e| Error::conversion(path, e.to_string()))?;

        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mut doc = map_document(&parsed, name, config);
        doc.metadata.source_file = path.file_name().map(|s| s.to_string_lossy().into_owned());

        info!(
            "Converted {} ({} pages, {} texts, {} tables, {} pictures)",
            path.display(),
            doc.metadata.page_count,
            doc.texts.len(),
            doc.tables.len(),
            doc.pictures.len()
        );
        Ok(doc)
    }
}

/// Map an extracted PDF into a [`StructuredDocument`].
pub(crate) fn map_document(
    source: &unpdf::Document,
    name: String,
    config: &ConversionConfig,
) -> StructuredDocument {
    let mut doc = StructuredDocument::new(name);
    doc.metadata = Metadata {
        title: non_empty(source.metadata.title.as_deref()),
        author: non_empty(source.metadata.author.as_deref()),
        subject: non_empty(source.metadata.subject.as_deref()),
        format_version: non_empty(Some(&source.metadata.pdf_version)),
        source_file: None,
        page_count: source.metadata.page_count.max(source.pages.len() as u32),
    };

    for page in &source.pages {
        doc.start_page(page.number);
        let mut referenced = HashSet::new();

        for block in &page.elements {
            match block {
                unpdf::Block::Paragraph(paragraph) => {
                    map_paragraph(&mut doc, paragraph, page.number);
                }
                unpdf::Block::Table(table) => {
                    map_table(&mut doc, table, page.number, config);
                }
                unpdf::Block::Image {
                    resource_id,
                    alt_text,
                    ..
                } => {
                    let key = resource_key(source, page.number, resource_id);
                    let resource = key.as_ref().and_then(|k| source.resources.get(k));
                    if let Some(k) = key {
                        referenced.insert(k);
                    }
                    let mut picture = make_picture(resource, page.number, config);
                    if let Some(alt) = non_empty(alt_text.as_deref()) {
                        picture = picture.with_caption(alt);
                    }
                    doc.add_picture(picture);
                }
                unpdf::Block::Raw { content } => {
                    for text in split_paragraphs(content) {
                        doc.add_text(TextElement::paragraph(text, page.number));
                    }
                }
                _ => {}
            }
        }

        // Images the layout pass did not place: page resources in key order.
        let prefix = format!("page{}_", page.number);
        let mut keys: Vec<&String> = source
            .resources
            .iter()
            .filter(|(key, res)| {
                key.starts_with(&prefix) && res.is_image() && !referenced.contains(*key)
            })
            .map(|(key, _)| key)
            .collect();
        keys.sort();
        for key in keys {
            debug!("Page {}: picture from resource {}", page.number, key);
            doc.add_picture(make_picture(source.resources.get(key), page.number, config));
        }
    }

    doc
}

fn map_paragraph(doc: &mut StructuredDocument, paragraph: &unpdf::Paragraph, page: u32) {
    let text = normalize(&paragraph.plain_text());
    if text.is_empty() {
        return;
    }

    if let Some(level) = paragraph.heading_level() {
        doc.add_text(TextElement::heading(text, level, page));
    } else if paragraph.is_list_item() {
        doc.add_text(TextElement::list_item(text, page));
    } else {
        for part in split_paragraphs(&text) {
            doc.add_text(TextElement::paragraph(part, page));
        }
    }
}

fn map_table(
    doc: &mut StructuredDocument,
    table: &unpdf::Table,
    page: u32,
    config: &ConversionConfig,
) {
    if table.is_empty() {
        return;
    }
    let caption = non_empty(table.caption.as_deref());

    if !config.table_structure() {
        debug!("Page {}: flattening table into text", page);
        if let Some(caption) = caption {
            doc.add_text(TextElement::caption(caption, page));
        }
        for row in &table.rows {
            let line = row
                .cells
                .iter()
                .map(|cell| normalize(&cell.plain_text()))
                .collect::<Vec<_>>()
                .join("\t");
            if !line.trim().is_empty() {
                doc.add_text(TextElement::paragraph(line, page));
            }
        }
        return;
    }

    let header_rows = table.header_rows as usize;
    let rows = table
        .rows
        .iter()
        .enumerate()
        .map(|(r, row)| {
            row.cells
                .iter()
                .map(|cell| {
                    SpanCell::new(normalize(&cell.plain_text()))
                        .rowspan(cell.rowspan as usize)
                        .colspan(cell.colspan as usize)
                        .header(row.is_header || r < header_rows)
                })
                .collect()
        })
        .collect();

    let mut element = TableElement::from_span_rows(rows, page);
    if let Some(caption) = caption {
        element = element.with_caption(caption);
    }
    doc.add_table(element);
}

fn make_picture(
    resource: Option<&unpdf::Resource>,
    page: u32,
    config: &ConversionConfig,
) -> PictureElement {
    if !config.extract_images() {
        return PictureElement::placeholder(page);
    }

    resource
        .and_then(|res| encode_image(&RawImage::from_resource(res), config.image_scale()))
        .map(|image| PictureElement::new(page, image))
        .unwrap_or_else(|| PictureElement::placeholder(page))
}

/// Resolve an image block's resource id, which may or may not carry the
/// page prefix.
fn resource_key(source: &unpdf::Document, page: u32, id: &str) -> Option<String> {
    if source.resources.contains_key(id) {
        return Some(id.to_string());
    }
    let prefixed = format!("page{}_{}", page, id);
    source.resources.contains_key(&prefixed).then_some(prefixed)
}

fn normalize(text: &str) -> String {
    text.nfc().collect::<String>().trim().to_string()
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(|v| v.nfc().collect())
}

/// Split text into paragraphs at blank lines.
fn split_paragraphs(text: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in text.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                parts.push(normalize(&current.join("\n")));
                current.clear();
            }
        } else {
            current.push(line.trim_end());
        }
    }
    if !current.is_empty() {
        parts.push(normalize(&current.join("\n")));
    }

    parts
}
