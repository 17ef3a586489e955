//! Integration tests for batch processing.

use std::cell::RefCell;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use docpack::batch::{BatchObserver, BatchOptions, BatchOutcome, BatchReport, BatchRunner};
use docpack::convert::{ConversionBackend, ConversionConfig, ConverterRegistry, DocumentConverter};
use docpack::error::{Error, ErrorKind, Result};
use docpack::export::{ExportFormat, Exporter, FormatSet};
use docpack::model::{ImageData, PictureElement, StructuredDocument, TableElement, TextElement};
use docpack::ExitStatus;

/// Stands in for the PDF backend: files starting with `%PDF-` convert to
/// a document with one table and three pictures, anything else fails.
struct MockPdfBackend;

impl ConversionBackend for MockPdfBackend {
    fn name(&self) -> &str {
        "mock-pdf"
    }

    fn supported_extensions(&self) -> &[&str] {
        &["pdf"]
    }

    fn convert(&self, path: &Path, _config: &ConversionConfig) -> Result<StructuredDocument> {
        let data = fs::read(path)?;
        if !data.starts_with(b"%PDF-") {
            return Err(Error::conversion(path, "Unknown file format: not a valid PDF"));
        }

        let name = path.file_stem().unwrap().to_string_lossy().into_owned();
        let mut doc = StructuredDocument::new(name.clone());
        doc.metadata.source_file = Some(format!("{}.pdf", name));
        doc.start_page(1);
        doc.add_text(TextElement::heading(format!("Lecture {}", name), 1, 1));
        doc.add_text(TextElement::paragraph("Some body text.", 1));
        doc.add_table(TableElement::from_rows(
            &[vec!["Term", "Meaning"], vec!["RAII", "Scope-bound resources"]],
            1,
        ));
        doc.start_page(2);
        for i in 0..3u8 {
            doc.add_picture(PictureElement::new(2, ImageData::png(vec![0x89, b'P', b'N', b'G', i])));
        }
        Ok(doc)
    }
}

fn converter() -> DocumentConverter {
    let mut registry = ConverterRegistry::new();
    registry.register(Arc::new(MockPdfBackend));
    DocumentConverter::new(registry, ConversionConfig::default())
}

fn runner(output: &Path, parallelism: usize, formats: FormatSet) -> BatchRunner {
    let options = BatchOptions::new(output)
        .with_recursive(true)
        .with_parallelism(parallelism)
        .with_formats(formats);
    BatchRunner::new(converter(), Exporter::default(), options)
}

fn good(path: &Path) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, b"%PDF-1.7\nmock").unwrap();
}

fn corrupt(path: &Path) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, b"this is not a pdf").unwrap();
}

#[test]
fn test_one_good_one_corrupt() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in");
    let out = dir.path().join("out");
    good(&input.join("a.pdf"));
    corrupt(&input.join("b.pdf"));

    let report = runner(&out, 1, FormatSet::all()).run(&input).unwrap();
    assert_eq!(report.total, 2);
    assert_eq!(report.succeeded, 1);
    assert_eq!(report.failed, 1);
    assert_eq!(ExitStatus::from_report(&report).code(), 0);

    let a = out.join("a");
    assert!(a.join("a.md").is_file());
    assert!(a.join("a.html").is_file());
    assert!(a.join("a_structure.json").is_file());
    assert!(a.join("README.md").is_file());
    assert_eq!(fs::read_dir(a.join("a_images")).unwrap().count(), 3);
    assert!(!out.join("b").exists());

    let html = fs::read_to_string(a.join("a.html")).unwrap();
    assert_eq!(html.matches("data:image/png;base64,").count(), 3);

    let json = fs::read_to_string(a.join("a_structure.json")).unwrap();
    let doc = docpack::export::from_json(&json).unwrap();
    assert_eq!(doc.tables.len(), 1);
    assert_eq!(doc.pictures.len(), 3);

    let failure = report.failures().next().unwrap();
    assert!(failure.input.ends_with("b.pdf"));
    assert_eq!(failure.error_kind, Some(ErrorKind::Conversion));
    assert!(failure.error.as_deref().unwrap().contains("not a valid PDF"));

    let (md_path, json_path) = report.write(&out).unwrap();
    let md = fs::read_to_string(md_path).unwrap();
    assert!(md.contains("b.pdf"));
    assert!(md.contains("not a valid PDF"));
    let parsed: BatchReport = serde_json::from_str(&fs::read_to_string(json_path).unwrap()).unwrap();
    assert_eq!(parsed.total, 2);
    assert_eq!(parsed.outcomes.len(), 2);
}

#[test]
fn test_one_outcome_per_file_sorted() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in");
    for name in ["d.pdf", "c.pdf", "sub/a.pdf"] {
        good(&input.join(name));
    }
    corrupt(&input.join("b.pdf"));
    corrupt(&input.join("sub/e.pdf"));

    let report = runner(&dir.path().join("out"), 3, FormatSet::default())
        .run(&input)
        .unwrap();

    assert_eq!(report.total, 5);
    assert_eq!(report.outcomes.len(), 5);
    assert_eq!(report.failed, 2);
    assert_eq!(report.succeeded + report.failed, report.total);
    assert!((report.success_rate - 60.0).abs() < 1e-9);

    let inputs: Vec<_> = report.outcomes.iter().map(|o| o.input.clone()).collect();
    let mut sorted = inputs.clone();
    sorted.sort();
    assert_eq!(inputs, sorted);
}

#[test]
fn test_parallelism_does_not_change_outcomes() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in");
    for i in 0..8 {
        let path = input.join(format!("file{}.pdf", i));
        if i % 3 == 0 {
            corrupt(&path);
        } else {
            good(&path);
        }
    }

    let summary = |report: &BatchReport| -> Vec<(String, bool)> {
        report
            .outcomes
            .iter()
            .map(|o| (o.base_name.clone(), o.success))
            .collect()
    };

    let sequential = runner(&dir.path().join("out1"), 1, FormatSet::default())
        .run(&input)
        .unwrap();
    let parallel = runner(&dir.path().join("out4"), 4, FormatSet::default())
        .run(&input)
        .unwrap();

    assert_eq!(summary(&sequential), summary(&parallel));
    assert_eq!(sequential.counts, parallel.counts);
}

#[test]
fn test_all_failed_exit_status() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in");
    corrupt(&input.join("x.pdf"));
    corrupt(&input.join("y.pdf"));

    let report = runner(&dir.path().join("out"), 2, FormatSet::default())
        .run(&input)
        .unwrap();
    assert_eq!(report.succeeded, 0);
    assert_eq!(ExitStatus::from_report(&report).code(), 2);
}

#[test]
fn test_empty_root_is_precondition_failure() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in");
    fs::create_dir_all(&input).unwrap();
    fs::write(input.join("notes.txt"), "no pdfs here").unwrap();
    let out = dir.path().join("out");

    let err = runner(&out, 1, FormatSet::default()).run(&input).unwrap_err();
    assert!(matches!(err, Error::Precondition(_)));
    assert!(err.to_string().contains("no matching files found"));
    assert_eq!(ExitStatus::from_error(&err).code(), 1);
    assert!(!out.exists());
}

#[test]
fn test_zero_parallelism_touches_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in");
    good(&input.join("a.pdf"));
    let out = dir.path().join("out");

    let err = runner(&out, 0, FormatSet::default()).run(&input).unwrap_err();
    assert!(matches!(err, Error::Precondition(_)));
    assert!(!out.exists());
}

#[test]
fn test_missing_root() {
    let dir = tempfile::tempdir().unwrap();
    let err = runner(&dir.path().join("out"), 1, FormatSet::default())
        .run(&dir.path().join("missing"))
        .unwrap_err();
    assert!(err.to_string().contains("does not exist"));
}

#[test]
fn test_rerun_overwrites_identically() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in");
    good(&input.join("a.pdf"));
    let out = dir.path().join("out");

    let formats = FormatSet::only(ExportFormat::Markdown).with(ExportFormat::Json);
    runner(&out, 1, formats).run(&input).unwrap();
    let md_first = fs::read_to_string(out.join("a/a.md")).unwrap();
    let json_first = fs::read_to_string(out.join("a/a_structure.json")).unwrap();

    runner(&out, 1, formats).run(&input).unwrap();
    assert_eq!(fs::read_to_string(out.join("a/a.md")).unwrap(), md_first);
    assert_eq!(
        fs::read_to_string(out.join("a/a_structure.json")).unwrap(),
        json_first
    );
    assert_eq!(fs::read_dir(out.join("a/a_images")).unwrap().count(), 3);
}

#[test]
fn test_markdown_links_images_instead_of_embedding() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in");
    good(&input.join("a.pdf"));
    let out = dir.path().join("out");

    runner(&out, 1, FormatSet::default()).run(&input).unwrap();
    let md = fs::read_to_string(out.join("a/a.md")).unwrap();
    assert!(!md.contains("base64"));
    assert!(md.contains("](a_images/image_001.png)"));
    assert!(md.contains("](a_images/image_003.png)"));
}

#[test]
fn test_nested_files_get_prefixed_packages() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in");
    good(&input.join("intro.pdf"));
    good(&input.join("week1/intro.pdf"));
    let out = dir.path().join("out");

    let report = runner(&out, 2, FormatSet::default()).run(&input).unwrap();
    assert_eq!(report.succeeded, 2);
    assert!(out.join("intro/intro.md").is_file());
    assert!(out.join("week1_intro/week1_intro.md").is_file());
}

#[test]
fn test_output_inside_root_is_not_rescanned() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in");
    good(&input.join("a.pdf"));
    let out = input.join("out");

    runner(&out, 1, FormatSet::default()).run(&input).unwrap();
    good(&out.join("a/stray.pdf"));

    let report = runner(&out, 1, FormatSet::default()).run(&input).unwrap();
    assert_eq!(report.total, 1);
}

#[test]
fn test_input_named_like_report_keeps_reports_writable() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in");
    good(&input.join("batch_report.json.pdf"));
    good(&input.join("BATCH_REPORT.md.pdf"));
    let out = dir.path().join("out");

    let report = runner(&out, 1, FormatSet::default()).run(&input).unwrap();
    assert_eq!(report.succeeded, 2);
    for outcome in &report.outcomes {
        assert!(outcome.base_name.ends_with("_2"), "{}", outcome.base_name);
    }

    let (md_path, json_path) = report.write(&out).unwrap();
    assert!(md_path.is_file());
    assert!(json_path.is_file());
    assert_eq!(ExitStatus::from_report(&report).code(), 0);
}

#[derive(Default)]
struct RecordingObserver {
    started: RefCell<Option<usize>>,
    progress: RefCell<Vec<usize>>,
    finished: RefCell<bool>,
}

impl BatchObserver for RecordingObserver {
    fn on_start(&self, total: usize) {
        *self.started.borrow_mut() = Some(total);
    }

    fn on_file_done(&self, _outcome: &BatchOutcome, done: usize, _total: usize) {
        self.progress.borrow_mut().push(done);
    }

    fn on_finish(&self, _report: &BatchReport) {
        *self.finished.borrow_mut() = true;
    }
}

#[test]
fn test_observer_sees_every_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in");
    for name in ["a.pdf", "b.pdf", "c.pdf"] {
        good(&input.join(name));
    }

    let observer = RecordingObserver::default();
    runner(&dir.path().join("out"), 2, FormatSet::default())
        .run_with_observer(&input, &observer)
        .unwrap();

    assert_eq!(*observer.started.borrow(), Some(3));
    assert_eq!(*observer.progress.borrow(), vec![1, 2, 3]);
    assert!(*observer.finished.borrow());
}
