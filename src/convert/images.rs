//! Turning extracted image streams into image files.

use std::io::Cursor;

use image::imageops::FilterType;
use image::{DynamicImage, GrayImage, RgbImage};
use log::{debug, warn};

use crate::model::ImageData;

/// Largest side, in pixels, of a resampled image.
pub const MAX_IMAGE_SIDE: u32 = 8192;

/// An image stream as extracted from the source document.
#[derive(Debug, Clone, Copy)]
pub struct RawImage<'a> {
    pub data: &'a [u8],
    pub mime_type: &'a str,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub color_space: Option<&'a str>,
    pub bits_per_component: Option<u8>,
}

impl<'a> RawImage<'a> {
    /// Borrow an image resource produced by the PDF backend.
    pub fn from_resource(resource: &'a unpdf::Resource) -> Self {
        Self {
            data: &resource.data,
            mime_type: &resource.mime_type,
            width: resource.width,
            height: resource.height,
            color_space: resource.color_space.as_deref(),
            bits_per_component: resource.bits_per_component,
        }
    }
}

/// Encode an extracted image as an image file, resampled by `scale`.
///
/// Encoded formats the `image` crate can read are decoded, resampled and
/// written as PNG. Raw 8-bit RGB or gray pixel buffers are wrapped into PNG.
/// Anything else keeps its original bytes when they are a recognizable image
/// format, and yields `None` otherwise.
pub fn encode_image(raw: &RawImage<'_>, scale: f32) -> Option<ImageData> {
    if raw.data.is_empty() {
        return None;
    }

    let sniffed = ImageData::detect_mime_type(raw.data);
    let decoded = match sniffed {
        Some(_) => image::load_from_memory(raw.data).ok(),
        None => decode_raw_pixels(raw),
    };

    match decoded {
        Some(img) => match write_png(&resample(img, scale)) {
            Ok(data) => Some(data),
            Err(e) => {
                warn!("Failed to encode image as PNG: {}", e);
                passthrough(raw, sniffed)
            }
        },
        None => passthrough(raw, sniffed),
    }
}

fn passthrough(raw: &RawImage<'_>, sniffed: Option<&'static str>) -> Option<ImageData> {
    match sniffed {
        Some(mime) => {
            debug!("Keeping {} image in its original encoding", mime);
            let mut data = ImageData::new(raw.data.to_vec(), mime);
            if let (Some(w), Some(h)) = (raw.width, raw.height) {
                data = data.with_dimensions(w, h);
            }
            Some(data)
        }
        None => {
            warn!(
                "Dropping undecodable image data ({}, {} bytes)",
                raw.mime_type,
                raw.data.len()
            );
            None
        }
    }
}

fn decode_raw_pixels(raw: &RawImage<'_>) -> Option<DynamicImage> {
    let (width, height) = (raw.width?, raw.height?);
    if raw.bits_per_component != Some(8) || width == 0 || height == 0 {
        return None;
    }

    let pixels = width as usize * height as usize;
    match raw.color_space? {
        "DeviceRGB" | "RGB" | "CalRGB" => {
            let bytes = raw.data.get(..pixels * 3)?.to_vec();
            RgbImage::from_raw(width, height, bytes).map(DynamicImage::ImageRgb8)
        }
        "DeviceGray" | "Gray" | "CalGray" => {
            let bytes = raw.data.get(..pixels)?.to_vec();
            GrayImage::from_raw(width, height, bytes).map(DynamicImage::ImageLuma8)
        }
        _ => None,
    }
}

/// Target dimensions for `scale`, with the largest side capped.
pub fn scaled_dimensions(width: u32, height: u32, scale: f32) -> (u32, u32) {
    let mut w = (width as f64 * scale as f64).round().max(1.0);
    let mut h = (height as f64 * scale as f64).round().max(1.0);

    let largest = w.max(h);
    if largest > MAX_IMAGE_SIDE as f64 {
        let shrink = MAX_IMAGE_SIDE as f64 / largest;
        w = (w * shrink).round().max(1.0);
        h = (h * shrink).round().max(1.0);
    }

    (w as u32, h as u32)
}

fn resample(img: DynamicImage, scale: f32) -> DynamicImage {
    let (width, height) = (img.width(), img.height());
    let (w, h) = scaled_dimensions(width, height, scale);
    if (w, h) == (width, height) {
        img
    } else {
        img.resize_exact(w, h, FilterType::Lanczos3)
    }
}

fn write_png(img: &DynamicImage) -> Result<ImageData, image::ImageError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)?;
    Ok(ImageData::png(buf).with_dimensions(img.width(), img.height()))
}
