//! Integration tests for the converter module.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use docpack::convert::{
    ConversionBackend, ConversionConfig, ConverterRegistry, DocumentConverter, PdfBackend,
    StructureJsonBackend,
};
use docpack::dedup::{DedupOutput, DedupStrategy, Deduplicator};
use docpack::error::{Error, Result};
use docpack::export::to_json;
use docpack::model::{ImageData, PictureElement, StructuredDocument, TableElement, TextElement};

/// Mock backend for testing.
struct MockBackend {
    extensions: Vec<&'static str>,
    name: &'static str,
    ocr: bool,
}

impl MockBackend {
    fn new(extensions: Vec<&'static str>, name: &'static str) -> Self {
        Self {
            extensions,
            name,
            ocr: false,
        }
    }
}

impl ConversionBackend for MockBackend {
    fn name(&self) -> &str {
        self.name
    }

    fn supported_extensions(&self) -> &[&str] {
        &self.extensions
    }

    fn supports_ocr(&self) -> bool {
        self.ocr
    }

    fn convert(&self, path: &Path, _config: &ConversionConfig) -> Result<StructuredDocument> {
        let mut doc = StructuredDocument::new(self.name);
        doc.start_page(1);
        doc.add_text(TextElement::paragraph(path.display().to_string(), 1));
        Ok(doc)
    }
}

#[test]
fn test_registry_defaults() {
    let registry = ConverterRegistry::with_defaults();
    assert!(registry.supports("pdf"));
    assert!(registry.supports("PDF"));
    assert!(!registry.supports("json"));
    assert_eq!(registry.supported_extensions(), vec!["pdf"]);
    assert_eq!(registry.get_by_name("pdf").unwrap().name(), "pdf");

    let registry = ConverterRegistry::with_structure_json();
    assert_eq!(registry.supported_extensions(), vec!["json", "pdf"]);
}

#[test]
fn test_registry_later_registration_wins() {
    let mut registry = ConverterRegistry::with_defaults();
    registry.register(Arc::new(MockBackend::new(vec!["pdf", "xps"], "mock")));

    assert_eq!(registry.get_by_extension("pdf").unwrap().name(), "mock");
    assert_eq!(registry.get_by_extension("xps").unwrap().name(), "mock");
    assert_eq!(registry.supported_extensions(), vec!["pdf", "xps"]);
}

#[test]
fn test_converter_dispatches_by_extension() {
    let mut registry = ConverterRegistry::new();
    registry.register(Arc::new(MockBackend::new(vec!["mock"], "mock")));
    let converter = DocumentConverter::new(registry, ConversionConfig::default());

    assert!(converter.accepts(Path::new("deck.MOCK")));
    assert!(!converter.accepts(Path::new("deck.pdf")));

    let doc = converter.convert(Path::new("deck.mock")).unwrap();
    assert_eq!(doc.name, "mock");
    assert_eq!(doc.texts[0].text, "deck.mock");
}

#[test]
fn test_converter_rejects_unknown_and_missing_extensions() {
    let converter = DocumentConverter::default();

    let err = converter.convert(Path::new("slides.pptx")).unwrap_err();
    assert!(err.to_string().contains("No converter for extension: pptx"));

    let err = converter.convert(Path::new("README")).unwrap_err();
    assert!(err.to_string().contains("File has no extension"));
}

#[test]
fn test_ocr_request_still_converts_without_ocr_backend() {
    let mut registry = ConverterRegistry::new();
    registry.register(Arc::new(MockBackend::new(vec!["mock"], "mock")));
    let config = ConversionConfig::builder().with_ocr(true).build().unwrap();

    let doc = DocumentConverter::new(registry, config)
        .convert(Path::new("scan.mock"))
        .unwrap();
    assert_eq!(doc.texts.len(), 1);
}

#[test]
fn test_ocr_capable_backend() {
    let mut backend = MockBackend::new(vec!["scan"], "ocr");
    backend.ocr = true;
    assert!(backend.supports_ocr());
    assert!(!PdfBackend::new().supports_ocr());
}

#[test]
fn test_pdf_backend_rejects_non_pdf_content() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fake.pdf");
    fs::write(&path, "<html>not a pdf</html>").unwrap();

    let err = DocumentConverter::default().convert(&path).unwrap_err();
    match err {
        Error::Conversion { path: p, reason } => {
            assert_eq!(p, path);
            assert!(reason.contains("not a valid PDF"));
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_pdf_backend_missing_file() {
    let err = PdfBackend::new()
        .convert(Path::new("/nonexistent/missing.pdf"), &ConversionConfig::default())
        .unwrap_err();
    assert!(matches!(err, Error::Conversion { .. }));
}

#[test]
fn test_structure_json_rejects_garbage() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken_structure.json");
    fs::write(&path, "{ \"schema_name\": 42 }").unwrap();

    let err = StructureJsonBackend::new()
        .convert(&path, &ConversionConfig::default())
        .unwrap_err();
    assert!(err.to_string().contains("invalid structure JSON"));
}

#[test]
fn test_structure_json_without_images() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("deck_structure.json");

    let mut doc = StructuredDocument::new("deck");
    doc.start_page(1);
    doc.add_picture(PictureElement::new(1, ImageData::png(vec![1, 2, 3])));
    fs::write(&path, to_json(&doc).unwrap()).unwrap();

    let config = ConversionConfig::builder().with_images(false).build().unwrap();
    let reloaded = StructureJsonBackend::new().convert(&path, &config).unwrap();
    assert_eq!(reloaded.pictures.len(), 1);
    assert!(!reloaded.pictures[0].has_image());
}

#[test]
fn test_dedup_over_reloaded_dump() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("slides_structure.json");

    let mut doc = StructuredDocument::new("slides");
    let bullets = ["Pattern matching basics", "Exhaustive match arms", "Binding with @ patterns"];
    for page in 1..=3u32 {
        doc.start_page(page);
        doc.add_text(TextElement::heading("Pattern matching", 1, page));
        for bullet in bullets.iter().take(page as usize) {
            doc.add_text(TextElement::list_item(*bullet, page));
        }
    }
    fs::write(&path, to_json(&doc).unwrap()).unwrap();

    let converter = DocumentConverter::new(
        ConverterRegistry::with_structure_json(),
        ConversionConfig::default(),
    );
    let reloaded = converter.convert(&path).unwrap();

    let dedup = Deduplicator::new(0.5, 10).unwrap();
    let result = dedup.run(&reloaded, DedupStrategy::SmartMerge);
    let DedupOutput::Sections(sections) = &result.output else {
        panic!("expected sections");
    };
    assert_eq!(sections.len(), 1);
    assert_eq!(sections[0].items.len(), 4);
    assert_eq!(result.stats.original_items, 2 + 3 + 4);
    assert_eq!(result.stats.removed, 5);
}

#[test]
fn test_structure_json_rejects_tampered_table() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tampered_structure.json");

    let mut doc = StructuredDocument::new("tampered");
    doc.start_page(1);
    doc.add_table(TableElement::from_rows(&[vec!["a", "b"]], 1));
    let mut value: serde_json::Value = serde_json::from_str(&to_json(&doc).unwrap()).unwrap();
    value["tables"][0]["num_rows"] = serde_json::json!(u64::MAX);
    value["tables"][0]["num_cols"] = serde_json::json!(u64::MAX);
    fs::write(&path, value.to_string()).unwrap();

    let err = StructureJsonBackend::new()
        .convert(&path, &ConversionConfig::default())
        .unwrap_err();
    assert!(err.to_string().contains("too large"));
}
