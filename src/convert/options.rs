//! Conversion configuration.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default image resolution scale.
pub const DEFAULT_IMAGE_SCALE: f32 = 2.0;

/// Largest accepted image resolution scale.
pub const MAX_IMAGE_SCALE: f32 = 8.0;

/// Immutable pipeline configuration shared by every conversion in a run.
///
/// Build one with [`ConversionConfig::builder`]; the builder rejects
/// out-of-range values so a constructed config is always valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionConfig {
    image_scale: f32,
    table_structure: bool,
    extract_images: bool,
    ocr: bool,
}

impl ConversionConfig {
    /// Start building a configuration from the defaults.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder::default()
    }

    /// Image resolution scale factor.
    pub fn image_scale(&self) -> f32 {
        self.image_scale
    }

    /// Whether table structure is extracted.
    pub fn table_structure(&self) -> bool {
        self.table_structure
    }

    /// Whether picture images are extracted.
    pub fn extract_images(&self) -> bool {
        self.extract_images
    }

    /// Whether OCR was requested.
    pub fn ocr(&self) -> bool {
        self.ocr
    }
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            image_scale: DEFAULT_IMAGE_SCALE,
            table_structure: true,
            extract_images: true,
            ocr: false,
        }
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug, Clone, Default)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    /// Set the image resolution scale.
    pub fn with_image_scale(mut self, scale: f32) -> Self {
        self.config.image_scale = scale;
        self
    }

    /// Enable or disable table structure extraction.
    pub fn with_table_structure(mut self, enabled: bool) -> Self {
        self.config.table_structure = enabled;
        self
    }

    /// Enable or disable image extraction.
    pub fn with_images(mut self, enabled: bool) -> Self {
        self.config.extract_images = enabled;
        self
    }

    /// Enable or disable OCR.
    pub fn with_ocr(mut self, enabled: bool) -> Self {
        self.config.ocr = enabled;
        self
    }

    /// Validate and build the configuration.
    pub fn build(self) -> Result<ConversionConfig> {
        let scale = self.config.image_scale;
        if !scale.is_finite() || scale <= 0.0 || scale > MAX_IMAGE_SCALE {
            return Err(Error::precondition(format!(
                "image scale must be in (0, {}], got {}",
                MAX_IMAGE_SCALE, scale
            )));
        }
        Ok(self.config)
    }
}
