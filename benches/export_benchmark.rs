//! Benchmarks for docpack export performance.
//!
//! Run with: cargo bench
//!
//! These benchmarks render synthetic documents of increasing size.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use docpack::dedup::{DedupStrategy, Deduplicator};
use docpack::detect::detect_format_from_bytes;
use docpack::export::{render_html, render_markdown, to_json};
use docpack::model::{ImageData, PictureElement, StructuredDocument, TableElement, TextElement};

/// Creates a slide-deck-like document with the given number of pages.
fn create_test_document(page_count: u32) -> StructuredDocument {
    let mut doc = StructuredDocument::new("bench");
    for page in 1..=page_count {
        doc.start_page(page);
        doc.add_text(TextElement::heading(format!("Section {}", page / 4 + 1), 2, page));
        for line in 0..(page % 4 + 3) {
            doc.add_text(TextElement::list_item(
                format!("Point {} explaining *something* about topic {}", line, page / 4),
                page,
            ));
        }
        doc.add_text(TextElement::paragraph(
            "Lorem ipsum dolor sit amet, consectetur adipiscing elit. ".repeat(6),
            page,
        ));
        if page % 3 == 0 {
            let rows: Vec<Vec<String>> = (0..6)
                .map(|r| (0..4).map(|c| format!("r{}c{}", r, c)).collect())
                .collect();
            doc.add_table(TableElement::from_rows(&rows, page));
        }
        if page % 5 == 0 {
            doc.add_picture(PictureElement::new(page, ImageData::png(vec![0u8; 16 * 1024])));
        }
    }
    doc
}

fn bench_format_detection(c: &mut Criterion) {
    let pdf = b"%PDF-1.7\n%\xe2\xe3\xcf\xd3\n1 0 obj";
    let html = b"<!DOCTYPE html><html></html>";

    c.bench_function("detect_valid_pdf", |b| {
        b.iter(|| detect_format_from_bytes(black_box(pdf)))
    });

    c.bench_function("detect_non_pdf", |b| {
        b.iter(|| detect_format_from_bytes(black_box(html)))
    });
}

fn bench_renderers(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");

    for page_count in [10u32, 100] {
        let doc = create_test_document(page_count);
        let links: Vec<Option<String>> = (0..doc.pictures.len())
            .map(|i| Some(format!("bench_images/image_{:03}.png", i + 1)))
            .collect();

        group.bench_function(format!("markdown_{}_pages", page_count), |b| {
            b.iter(|| render_markdown(black_box(&doc), &links))
        });
        group.bench_function(format!("html_{}_pages", page_count), |b| {
            b.iter(|| render_html(black_box(&doc), "2026-01-01 00:00:00"))
        });
        group.bench_function(format!("json_{}_pages", page_count), |b| {
            b.iter(|| to_json(black_box(&doc)))
        });
    }

    group.finish();
}

fn bench_dedup(c: &mut Criterion) {
    let doc = create_test_document(100);
    let dedup = Deduplicator::default();

    c.bench_function("dedup_smart_merge", |b| {
        b.iter(|| dedup.run(black_box(&doc), DedupStrategy::SmartMerge))
    });
}

criterion_group!(benches, bench_format_detection, bench_renderers, bench_dedup);
criterion_main!(benches);
