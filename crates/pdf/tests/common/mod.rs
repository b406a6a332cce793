//! Shared helpers for `sticker_sheet_pdf` integration tests.

#![allow(unreachable_pub, dead_code)]

use std::ops::ControlFlow;

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object};
use sticker_sheet_barcode::Code128Encoder;
use sticker_sheet_core::{BatchResult, RawRecord, SheetProfile, generate_sheet};
use sticker_sheet_pdf::PdfDocument;

/// `n` valid product records with codes `SKU-000`, `SKU-001`, ...
pub fn products(n: usize) -> Vec<RawRecord> {
    (0..n)
        .map(|i| RawRecord::new(format!("SKU-{i:03}"), format!("Product {i}"), format!("{}", 10 + i)))
        .collect()
}

/// Run a whole sheet into a PDF with the default profile.
pub fn render(records: Vec<RawRecord>) -> (BatchResult, Vec<u8>) {
    render_with(records, &SheetProfile::default())
}

/// Run a whole sheet into a PDF with `profile`.
pub fn render_with(records: Vec<RawRecord>, profile: &SheetProfile) -> (BatchResult, Vec<u8>) {
    generate_sheet(
        records,
        profile,
        Code128Encoder,
        PdfDocument::new(profile.page),
        |_| ControlFlow::Continue(()),
    )
    .unwrap_or_else(|e| panic!("sheet failed: {e}"))
}

/// Content stream operations of every page, in page order.
pub fn pages(pdf: &[u8]) -> Vec<Vec<Operation>> {
    let doc = Document::load_mem(pdf).unwrap_or_else(|e| panic!("unreadable pdf: {e}"));
    doc.get_pages()
        .values()
        .map(|&id| {
            let content = doc.get_page_content(id).unwrap();
            Content::decode(&content).unwrap().operations
        })
        .collect()
}

/// Number of operations with `operator`.
pub fn count(ops: &[Operation], operator: &str) -> usize {
    ops.iter().filter(|op| op.operator == operator).count()
}

/// Strings shown by `Tj`, as raw WinAnsi bytes.
pub fn shown_text(ops: &[Operation]) -> Vec<Vec<u8>> {
    ops.iter()
        .filter(|op| op.operator == "Tj")
        .filter_map(|op| match op.operands.first() {
            Some(Object::String(bytes, _)) => Some(bytes.clone()),
            _ => None,
        })
        .collect()
}

/// Numeric operands of `op`.
pub fn numbers(op: &Operation) -> Vec<f64> {
    op.operands
        .iter()
        .map(|o| match o {
            Object::Integer(i) => *i as f64,
            Object::Real(r) => f64::from(*r),
            other => panic!("not a number: {other:?}"),
        })
        .collect()
}
