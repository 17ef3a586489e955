//! Document conversion with pluggable backends.
//!
//! A [`ConversionBackend`] turns one input file into a
//! [`StructuredDocument`]. Backends are registered in a
//! [`ConverterRegistry`] by file extension, and a [`DocumentConverter`]
//! pairs the registry with the run's immutable [`ConversionConfig`].
//!
//! # Example
//!
//! ```no_run
//! use docpack::convert::{ConversionConfig, ConverterRegistry, DocumentConverter};
//! use std::path::Path;
//!
//! fn main() -> docpack::Result<()> {
//!     let config = ConversionConfig::builder().with_image_scale(3.0).build()?;
//!     let converter = DocumentConverter::new(ConverterRegistry::with_defaults(), config);
//!
//!     let doc = converter.convert(Path::new("lecture.pdf"))?;
//!     println!("{} tables", doc.tables.len());
//!     Ok(())
//! }
//! ```

mod images;
mod options;
mod pdf;
mod structure;

pub use images::{encode_image, scaled_dimensions, RawImage, MAX_IMAGE_SIDE};
pub use options::{ConversionConfig, ConversionConfigBuilder, DEFAULT_IMAGE_SCALE, MAX_IMAGE_SCALE};
pub use pdf::PdfBackend;
pub use structure::StructureJsonBackend;

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use log::{debug, warn};

use crate::error::{Error, Result};
use crate::model::StructuredDocument;

/// A document conversion backend.
///
/// Implement this trait to add support for a new input format.
pub trait ConversionBackend: Send + Sync {
    /// Get the name of this backend.
    fn name(&self) -> &str;

    /// Get the supported file extensions for this backend.
    ///
    /// Extensions should be lowercase without the leading dot (e.g., `["pdf"]`).
    fn supported_extensions(&self) -> &[&str];

    /// Whether this backend can run OCR on scanned pages.
    fn supports_ocr(&self) -> bool {
        false
    }

    /// Convert the file at `path`.
    fn convert(&self, path: &Path, config: &ConversionConfig) -> Result<StructuredDocument>;

    /// Check if this backend supports the given extension.
    fn supports_extension(&self, ext: &str) -> bool {
        let ext_lower = ext.to_lowercase();
        self.supported_extensions().iter().any(|e| *e == ext_lower)
    }
}

/// Registry for conversion backends.
#[derive(Clone)]
pub struct ConverterRegistry {
    by_extension: HashMap<String, Arc<dyn ConversionBackend>>,
    by_name: HashMap<String, Arc<dyn ConversionBackend>>,
}

impl ConverterRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            by_extension: HashMap::new(),
            by_name: HashMap::new(),
        }
    }

    /// Create a registry with the PDF backend.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(PdfBackend::new()));
        registry
    }

    /// Create a registry with the PDF backend and the structure JSON backend.
    pub fn with_structure_json() -> Self {
        let mut registry = Self::with_defaults();
        registry.register(Arc::new(StructureJsonBackend::new()));
        registry
    }

    /// Register a backend for all its supported extensions.
    ///
    /// A later registration for the same extension replaces the earlier one.
    pub fn register(&mut self, backend: Arc<dyn ConversionBackend>) {
        for ext in backend.supported_extensions() {
            self.by_extension
                .insert(ext.to_lowercase(), backend.clone());
        }
        self.by_name.insert(backend.name().to_lowercase(), backend);
    }

    /// Get a backend by file extension.
    pub fn get_by_extension(&self, ext: &str) -> Option<Arc<dyn ConversionBackend>> {
        self.by_extension.get(&ext.to_lowercase()).cloned()
    }

    /// Get a backend by name.
    pub fn get_by_name(&self, name: &str) -> Option<Arc<dyn ConversionBackend>> {
        self.by_name.get(&name.to_lowercase()).cloned()
    }

    /// Check if an extension is supported.
    pub fn supports(&self, ext: &str) -> bool {
        self.by_extension.contains_key(&ext.to_lowercase())
    }

    /// Get all supported extensions, sorted.
    pub fn supported_extensions(&self) -> Vec<&str> {
        let mut exts: Vec<&str> = self.by_extension.keys().map(|s| s.as_str()).collect();
        exts.sort_unstable();
        exts
    }

    /// Pick the backend for `path` by its extension.
    pub fn backend_for(&self, path: &Path) -> Result<Arc<dyn ConversionBackend>> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| Error::conversion(path, "File has no extension"))?;

        self.get_by_extension(ext)
            .ok_or_else(|| Error::conversion(path, format!("No converter for extension: {}", ext)))
    }
}

impl Default for ConverterRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl std::fmt::Debug for ConverterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConverterRegistry")
            .field("extensions", &self.supported_extensions())
            .finish()
    }
}

/// Converts input files with a fixed configuration.
///
/// Cheap to clone and safe to share across worker threads.
#[derive(Debug, Clone)]
pub struct DocumentConverter {
    registry: Arc<ConverterRegistry>,
    config: Arc<ConversionConfig>,
}

impl DocumentConverter {
    /// Create a converter from a registry and configuration.
    pub fn new(registry: ConverterRegistry, config: ConversionConfig) -> Self {
        Self {
            registry: Arc::new(registry),
            config: Arc::new(config),
        }
    }

    /// The configuration every conversion uses.
    pub fn config(&self) -> &ConversionConfig {
        &self.config
    }

    /// The backend registry.
    pub fn registry(&self) -> &ConverterRegistry {
        &self.registry
    }

    /// Check if `path` has an extension some backend handles.
    pub fn accepts(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.registry.supports(ext))
    }

    /// Convert one file.
    ///
    /// Every failure is reported as [`Error::Conversion`] carrying `path`.
    pub fn convert(&self, path: &Path) -> Result<StructuredDocument> {
        let backend = self.registry.backend_for(path)?;
        debug!("Converting {} with the {} backend", path.display(), backend.name());

        if self.config.ocr() && !backend.supports_ocr() {
            warn!(
                "{}: the {} backend cannot run OCR; extracting the text layer only",
                path.display(),
                backend.name()
            );
        }

        backend.convert(path, &self.config).map_err(|e| match e {
            Error::Conversion { .. } => e,
            other => Error::conversion(path, other.to_string()),
        })
    }
}

impl Default for DocumentConverter {
    fn default() -> Self {
        Self::new(ConverterRegistry::with_defaults(), ConversionConfig::default())
    }
}
