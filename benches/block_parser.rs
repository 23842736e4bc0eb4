use criterion::{criterion_group, criterion_main, Criterion};

use incremark::MarkdownParser;

fn synthetic_document(paragraphs: usize) -> String {
    let mut doc = String::new();
    for i in 0..paragraphs {
        doc.push_str(&format!("## Section {i}\n\n"));
        doc.push_str("Some *emphasized* text with a [link](/url \"title\") and `a code span`,\n");
        doc.push_str("continued onto a second line via lazy continuation.\n\n");
        doc.push_str("> a blockquote\n> with two lines\n\n");
        doc.push_str("- one\n- two\n  - nested\n\n");
        doc.push_str("| a | b |\n| - | - |\n| 1 | 2 |\n\n");
        doc.push_str("```rust\nfn f() -> i32 { 0 }\n```\n\n");
    }
    doc
}

fn long_documents(c: &mut Criterion) {
    let content = synthetic_document(200);
    let mut group = c.benchmark_group("long documents");
    group.bench_function("incremark", |b| {
        b.iter(|| {
            let mut parser = MarkdownParser::new();
            parser.parse(&content, false)
        })
    });
    group.finish();
}

fn short_inlines(c: &mut Criterion) {
    let content = "*this ***has some* various things* that** [create multiple elements](while/inline 'but without') taking _too_ much ![effort] to parse, and should `be a decent` test` ``of ``whether this works quickly.";
    let mut group = c.benchmark_group("inlines");
    group.bench_function("incremark", |b| {
        b.iter(|| {
            let mut parser = MarkdownParser::new();
            parser.parse(content, false)
        })
    });
    group.finish();
}

fn streamed_small_chunks(c: &mut Criterion) {
    let content = synthetic_document(50);
    let mut group = c.benchmark_group("streamed small chunks");
    group.bench_function("incremark", |b| {
        b.iter(|| {
            let mut parser = MarkdownParser::new();
            for chunk in content.as_bytes().chunks(64) {
                let chunk = std::str::from_utf8(chunk).unwrap();
                parser.parse(chunk, true);
            }
            parser.parse("", false)
        })
    });
    group.finish();
}

criterion_group!(benches, long_documents, short_inlines, streamed_small_chunks);
criterion_main!(benches);
