//! Backend that reloads JSON structure dumps.

use std::fs;
use std::path::Path;

use log::info;

use super::{ConversionBackend, ConversionConfig};
use crate::error::{Error, Result};
use crate::model::StructuredDocument;

/// Loads a `<base>_structure.json` file written by the JSON exporter.
///
/// Image data is kept as stored; the pipeline configuration only decides
/// whether pictures keep their images.
#[derive(Debug, Clone, Default)]
pub struct StructureJsonBackend {
    _private: (),
}

impl StructureJsonBackend {
    /// Create a new structure JSON backend.
    pub fn new() -> Self {
        Self { _private: () }
    }
}

impl ConversionBackend for StructureJsonBackend {
    fn name(&self) -> &str {
        "structure-json"
    }

    fn supported_extensions(&self) -> &[&str] {
        &["json"]
    }

    fn convert(&self, path: &Path, config: &ConversionConfig) -> Result<StructuredDocument> {
        let content = fs::read_to_string(path).map_err(|e| Error::conversion(path, e.to_string()))?;
        let mut doc: StructuredDocument = serde_json::from_str(&content)
            .map_err(|e| Error::conversion(path, format!("invalid structure JSON: {}", e)))?;
        doc.validate()
            .map_err(|e| Error::conversion(path, e.to_string()))?;

        if !config.extract_images() {
            for picture in &mut doc.pictures {
                picture.image = None;
            }
        }

        info!(
            "Loaded {} ({} texts, {} tables, {} pictures)",
            path.display(),
            doc.texts.len(),
            doc.tables.len(),
            doc.pictures.len()
        );
        Ok(doc)
    }
}
