//! Single-document export.
//!
//! An [`Exporter`] writes one [`StructuredDocument`] into a package
//! directory:
//!
//! - `<base>.md` with images referenced from `<base>_images/`
//! - `<base>.html`, a standalone page with base64-embedded images
//! - `<base>_structure.json`, the full document structure
//! - `README.md` describing the package (always written)

mod html;
mod json;
mod markdown;
mod options;
mod readme;
mod result;

pub use html::{escape_html, render_body as render_html_body, render_html};
pub use json::{from_json, to_json};
pub use markdown::{escape_markdown, render_markdown, IMAGE_PLACEHOLDER};
pub use options::{ExportFormat, FormatSet};
pub use readme::{render_readme, ReadmeContext};
pub use result::ExportPackage;

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use log::{debug, info};

use crate::convert::ConversionConfig;
use crate::error::{Error, Result};
use crate::model::StructuredDocument;

/// Timestamp format used in generated files.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Writes export packages.
///
/// The exporter carries the conversion configuration only to describe it
/// in the package README.
#[derive(Debug, Clone, Default)]
pub struct Exporter {
    config: ConversionConfig,
    timestamp: Option<DateTime<Local>>,
}

impl Exporter {
    /// Create an exporter describing `config`.
    pub fn new(config: ConversionConfig) -> Self {
        Self {
            config,
            timestamp: None,
        }
    }

    /// Use a fixed generation timestamp instead of the current time.
    pub fn with_timestamp(mut self, timestamp: DateTime<Local>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    fn generated(&self) -> String {
        self.timestamp
            .unwrap_or_else(Local::now)
            .format(TIMESTAMP_FORMAT)
            .to_string()
    }

    /// Export `doc` into `output_dir` as `<base_name>.*` files.
    ///
    /// Re-exporting into the same directory overwrites the previous package.
    pub fn export(
        &self,
        doc: &StructuredDocument,
        output_dir: &Path,
        base_name: &str,
        formats: FormatSet,
    ) -> Result<ExportPackage> {
        if base_name.trim().is_empty() {
            return Err(Error::export(output_dir, "empty base name"));
        }
        create_dir(output_dir)?;

        let generated = self.generated();
        let mut package = ExportPackage {
            output_dir: output_dir.to_path_buf(),
            markdown: None,
            html: None,
            json: None,
            images_dir: None,
            readme: output_dir.join("README.md"),
            images: Vec::new(),
            counts: doc.counts(),
        };

        for format in formats.iter() {
            let path = output_dir.join(format.file_name(base_name));
            match format {
                ExportFormat::Markdown => {
                    let images_name = format!("{}_images", base_name);
                    let images_dir = output_dir.join(&images_name);
                    let (images, links) = write_images(doc, &images_dir, &images_name)?;
                    write_file(&path, &render_markdown(doc, &links))?;
                    package.images = images;
                    package.images_dir = Some(images_dir);
                    package.markdown = Some(path);
                }
                ExportFormat::Html => {
                    write_file(&path, &render_html(doc, &generated))?;
                    package.html = Some(path);
                }
                ExportFormat::Json => {
                    write_file(&path, &to_json(doc)?)?;
                    package.json = Some(path);
                }
            }
        }

        let selected: Vec<ExportFormat> = formats.iter().collect();
        let dir_name = output_dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| base_name.to_string());
        let fallback_source = format!("{}.pdf", doc.name);
        let readme = render_readme(&ReadmeContext {
            base_name,
            source_file: doc.metadata.source_file.as_deref().unwrap_or(&fallback_source),
            output_dir_name: &dir_name,
            generated: &generated,
            counts: package.counts,
            formats: &selected,
            images_written: package.images.len(),
            config: &self.config,
        });
        write_file(&package.readme, &readme)?;

        info!(
            "Exported {} to {} ({} texts, {} tables, {} pictures, {} image files)",
            base_name,
            output_dir.display(),
            package.counts.texts,
            package.counts.tables,
            package.counts.pictures,
            package.images.len()
        );
        Ok(package)
    }

    /// Render a single format to a string.
    ///
    /// Markdown written this way has no image files to link to, so every
    /// picture renders as [`IMAGE_PLACEHOLDER`].
    pub fn render(&self, doc: &StructuredDocument, format: ExportFormat) -> Result<String> {
        match format {
            ExportFormat::Markdown => Ok(render_markdown(doc, &[])),
            ExportFormat::Html => Ok(render_html(doc, &self.generated())),
            ExportFormat::Json => to_json(doc),
        }
    }
}

/// Write picture images as `image_NNN.<ext>` and return the written paths
/// with each picture's link relative to the Markdown file.
fn write_images(
    doc: &StructuredDocument,
    images_dir: &Path,
    link_prefix: &str,
) -> Result<(Vec<PathBuf>, Vec<Option<String>>)> {
    create_dir(images_dir)?;

    let mut written = Vec::new();
    let mut links = Vec::with_capacity(doc.pictures.len());
    for (index, picture) in doc.pictures.iter().enumerate() {
        let image = match picture.image.as_ref().filter(|_| picture.has_image()) {
            Some(image) => image,
            None => {
                links.push(None);
                continue;
            }
        };

        let file_name = format!("image_{:03}.{}", index + 1, image.extension());
        let path = images_dir.join(&file_name);
        fs::write(&path, &image.data).map_err(|e| Error::export(&path, e))?;
        debug!("Wrote {} ({} bytes)", path.display(), image.data.len());

        links.push(Some(format!("{}/{}", link_prefix, file_name)));
        written.push(path);
    }

    Ok((written, links))
}

fn create_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|e| Error::export(path, e))
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content).map_err(|e| Error::export(path, e))
}
