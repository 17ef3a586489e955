//! # docpack
//!
//! Turn PDF documents into self-describing export packages.
//!
//! Each input becomes a directory holding Markdown with extracted images,
//! a standalone HTML page, the full document structure as JSON, and a
//! README describing the package. Whole directory trees can be processed
//! on a bounded worker pool with a per-file report.
//!
//! ## Quick Start
//!
//! ```no_run
//! use docpack::{convert_file, export_file, FormatSet};
//! use std::path::Path;
//!
//! fn main() -> docpack::Result<()> {
//!     // Convert and export in one step
//!     let package = export_file("lecture.pdf", Path::new("out/lecture"), FormatSet::all())?;
//!     println!("{} images written", package.image_count());
//!
//!     // Or work with the structured document directly
//!     let doc = convert_file("lecture.pdf")?;
//!     println!("{} tables", doc.tables.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Structured model**: texts, tables with spans, pictures, read order
//! - **Export packages**: Markdown + images, self-contained HTML, JSON
//! - **Batch processing**: fixed-size worker pool, Markdown and JSON reports
//! - **Slide de-duplication**: collapse incrementally revealed slides

pub mod batch;
pub mod convert;
pub mod dedup;
pub mod detect;
pub mod error;
pub mod export;
pub mod model;

// Re-export commonly used types
pub use batch::{BatchObserver, BatchOptions, BatchOutcome, BatchReport, BatchRunner, ExitStatus};
pub use convert::{
    ConversionBackend, ConversionConfig, ConverterRegistry, DocumentConverter, PdfBackend,
    StructureJsonBackend,
};
pub use dedup::{DedupResult, DedupStrategy, Deduplicator};
pub use detect::{detect_format_from_bytes, detect_format_from_path, InputFormat};
pub use error::{Error, ErrorKind, Result};
pub use export::{ExportFormat, ExportPackage, Exporter, FormatSet};
pub use model::{
    ElementCounts, ImageData, Metadata, PictureElement, StructuredDocument, TableElement,
    TextElement, TextLabel,
};

use std::path::Path;

/// Convert a file with the default backends and configuration.
///
/// # Example
///
/// ```no_run
/// let doc = docpack::convert_file("document.pdf").unwrap();
/// println!("{}", doc.plain_text());
/// ```
pub fn convert_file<P: AsRef<Path>>(path: P) -> Result<StructuredDocument> {
    DocumentConverter::default().convert(path.as_ref())
}

/// Convert a file with a custom configuration.
///
/// # Example
///
/// ```no_run
/// use docpack::{convert_file_with_config, ConversionConfig};
///
/// let config = ConversionConfig::builder()
///     .with_image_scale(1.0)
///     .with_table_structure(false)
///     .build()?;
/// let doc = convert_file_with_config("document.pdf", config)?;
/// # Ok::<(), docpack::Error>(())
/// ```
pub fn convert_file_with_config<P: AsRef<Path>>(
    path: P,
    config: ConversionConfig,
) -> Result<StructuredDocument> {
    DocumentConverter::new(ConverterRegistry::with_defaults(), config).convert(path.as_ref())
}

/// Convert a file and export it into `output_dir`.
///
/// The package files are named after the input's stem.
pub fn export_file<P: AsRef<Path>>(
    path: P,
    output_dir: &Path,
    formats: FormatSet,
) -> Result<ExportPackage> {
    let path = path.as_ref();
    let doc = convert_file(path)?;
    let base_name = path
        .file_stem()
        .map(|s| batch::sanitize_base_name(&s.to_string_lossy()))
        .unwrap_or_else(|| batch::sanitize_base_name(&doc.name));
    Exporter::default().export(&doc, output_dir, &base_name, formats)
}

/// Convert a PDF file to Markdown without writing any files.
///
/// Pictures render as [`export::IMAGE_PLACEHOLDER`].
pub fn to_markdown<P: AsRef<Path>>(path: P) -> Result<String> {
    let doc = convert_file(path)?;
    Exporter::default().render(&doc, ExportFormat::Markdown)
}

/// Convert a PDF file to a standalone HTML page.
pub fn to_html<P: AsRef<Path>>(path: P) -> Result<String> {
    let doc = convert_file(path)?;
    Exporter::default().render(&doc, ExportFormat::Html)
}

/// Convert a PDF file to its JSON document structure.
pub fn to_json<P: AsRef<Path>>(path: P) -> Result<String> {
    let doc = convert_file(path)?;
    export::to_json(&doc)
}
