#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;

use logistock_pdf::pdf::{DrawOp, PageContent};
use logistock_pdf::{Composer, DocumentOptions, PageFormat, PdfCanvas, Record};

/// Letter portrait with 20mm margins: content runs from y=20 to y=259.4.
pub const LETTER_CONTENT_BOTTOM: f32 = 279.4 - 20.0;

pub fn letter_composer() -> Composer {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut composer = Composer::new();
    composer.create_document(DocumentOptions {
        title: Some("Inventory report".into()),
        format: Some(PageFormat::Letter),
        ..DocumentOptions::default()
    });
    composer
}

pub fn canvas(composer: &Composer) -> &PdfCanvas {
    composer.canvas().expect("document created")
}

pub fn page(composer: &Composer, page: usize) -> &PageContent {
    canvas(composer)
        .page(page)
        .unwrap_or_else(|| panic!("page {page} exists"))
}

/// Body text of a page, in drawing order.
pub fn body_texts(composer: &Composer, page_number: usize) -> Vec<String> {
    page(composer, page_number)
        .body
        .iter()
        .filter_map(|op| match op {
            DrawOp::Text { text, .. } => Some(text.clone()),
            DrawOp::Rect { .. } => None,
        })
        .collect()
}

pub fn footer_texts(composer: &Composer, page_number: usize) -> Vec<String> {
    page(composer, page_number)
        .footer_texts()
        .map(str::to_string)
        .collect()
}

pub fn inventory_records(count: usize) -> Vec<Record> {
    (0..count)
        .map(|i| {
            Record::from(vec![
                format!("SKU-{i:04}"),
                format!("Item {i}"),
                format!("{}", i * 3),
            ])
        })
        .collect()
}

/// Output directory for PDFs written by tests: tests/output/<name>
pub fn write_output(name: &str, bytes: &[u8]) -> PathBuf {
    let dir = PathBuf::from("tests/output");
    fs::create_dir_all(&dir).ok();
    let path = dir.join(name);
    fs::write(&path, bytes).expect("write test output");
    path
}

pub fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-3
}
