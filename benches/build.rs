//! Benchmarks for the flattening pipeline.
//!
//! Run with: cargo bench

use criterion::{Criterion, criterion_group, criterion_main};

use styledoc::dom::reader::read_document;
use styledoc::export::ExportOptions;
use styledoc::view::LayoutPass;
use styledoc::{SourceDocument, StyledDocument, build, reverse_build};

const CHAPTER: &str = include_str!("../tests/fixtures/chapter.xhtml");
const NOTES: &str = include_str!("../tests/fixtures/notes.xml");

fn sources() -> Vec<SourceDocument> {
    let mut docs = Vec::new();
    for _ in 0..8 {
        docs.push(read_document(CHAPTER).unwrap());
        docs.push(read_document(NOTES).unwrap());
    }
    docs
}

// ============================================================================
// Reading and building
// ============================================================================

fn bench_read(c: &mut Criterion) {
    c.bench_function("read_xhtml", |b| {
        b.iter(|| read_document(CHAPTER).unwrap());
    });
}

fn bench_build(c: &mut Criterion) {
    let docs = sources();
    c.bench_function("build_ops", |b| {
        b.iter(|| build(&docs));
    });
    c.bench_function("build_styled_document", |b| {
        b.iter(|| StyledDocument::from_specs(&build(&docs)).unwrap());
    });
}

// ============================================================================
// Cascade, layout and export
// ============================================================================

fn bench_cascade(c: &mut Criterion) {
    let doc = StyledDocument::from_specs(&build(&sources())).unwrap();
    c.bench_function("resolve_fonts", |b| {
        b.iter(|| {
            for element in doc.elements() {
                doc.resolver().font(&element.attributes);
            }
        });
    });
}

fn bench_paginate(c: &mut Criterion) {
    let doc = StyledDocument::from_specs(&build(&sources())).unwrap();
    let pass = LayoutPass::new(&doc);
    c.bench_function("paginate", |b| {
        b.iter(|| pass.paginate(&pass.top_level_views()));
    });
}

fn bench_reverse_build(c: &mut Criterion) {
    let doc = StyledDocument::from_specs(&build(&sources())).unwrap();
    c.bench_function("reverse_build", |b| {
        b.iter(|| reverse_build(&doc, &ExportOptions::default()).unwrap());
    });
}

criterion_group!(
    benches,
    bench_read,
    bench_build,
    bench_cascade,
    bench_paginate,
    bench_reverse_build,
);
criterion_main!(benches);
