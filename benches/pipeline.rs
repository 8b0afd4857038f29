//! Benchmarks for chataudit loading, extraction and report assembly.
//!
//! Run with: `cargo bench`
//! Run specific group: `cargo bench --bench pipeline -- extraction`

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use chataudit::core::output::{to_csv, to_json, to_jsonl};
use chataudit::core::{ContentClassifier, OutputConfig, analyze, normalize_and_dedup};
use chataudit::markup::load_str;
use chataudit::parser::{Layout, create_layout, detect_layout};
use chataudit::parsing::{LabelLimits, default_timestamp_formats};
use chataudit::pipeline::Pipeline;
use chataudit::streaming::MessageBlocks;

// =============================================================================
// Test Data Generators
// =============================================================================

fn generate_purview_html(count: usize) -> String {
    let mut blocks = Vec::with_capacity(count);
    for i in 0..count {
        let sender = if i % 2 == 0 { "Alice" } else { "Bob" };
        let minute = i % 60;
        let hour = (i / 60) % 24;
        let body = match i % 5 {
            0 => format!("See https://contoso.sharepoint.com/sites/team/doc{} please", i),
            1 => format!("Join https://teams.microsoft.com/l/meetup-join/{} now", i),
            _ => format!("Message number {}", i),
        };
        let attachment = if i % 7 == 0 {
            format!(
                "<div class='attachment'><a href='https://files.example/report{}.pdf'>report{}.pdf</a></div>",
                i, i
            )
        } else {
            String::new()
        };
        blocks.push(format!(
            "<div class='message'><span class='sender'>{}</span>\
             <span class='timestamp'>2024-01-15 {:02}:{:02}:00</span>\
             <div class='content'>{}</div>{}</div>",
            sender, hour, minute, body, attachment
        ));
    }
    format!("<html><body>{}</body></html>", blocks.join("\n"))
}

fn generate_table_html(count: usize) -> String {
    let mut rows = Vec::with_capacity(count);
    for i in 0..count {
        let sender = if i % 2 == 0 { "Alice" } else { "Bob" };
        rows.push(format!(
            "<tr class='message-row'><td>2024-01-15 {:02}:{:02}</td><td>{}</td><td>Row {}</td></tr>",
            (i / 60) % 24,
            i % 60,
            sender,
            i
        ));
    }
    format!("<table>{}</table>", rows.join("\n"))
}

// =============================================================================
// Loading Benchmarks
// =============================================================================

fn bench_loading(c: &mut Criterion) {
    let mut group = c.benchmark_group("loading");

    for size in [100_usize, 1_000, 10_000] {
        let html = generate_purview_html(size);
        group.throughput(Throughput::Bytes(html.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &html, |b, html| {
            b.iter(|| {
                let doc = load_str(black_box(html)).unwrap();
                black_box(doc)
            });
        });
    }
    group.finish();
}

// =============================================================================
// Extraction Benchmarks
// =============================================================================

fn bench_extraction(c: &mut Criterion) {
    let mut group = c.benchmark_group("extraction");
    let limits = LabelLimits::default();

    for (name, layout, generator) in [
        ("purview", Layout::Purview, generate_purview_html as fn(usize) -> String),
        ("table", Layout::Table, generate_table_html as fn(usize) -> String),
    ] {
        let recognizers = create_layout(layout);
        for size in [100_usize, 1_000, 10_000] {
            let doc = load_str(&generator(size)).unwrap();
            group.throughput(Throughput::Elements(size as u64));
            group.bench_with_input(BenchmarkId::new(name, size), &doc, |b, doc| {
                b.iter(|| {
                    let count = MessageBlocks::new(black_box(doc), recognizers.as_ref(), limits).count();
                    black_box(count)
                });
            });
        }
    }
    group.finish();
}

fn bench_layout_detection(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout_detection");
    let limits = LabelLimits::default();

    for size in [100_usize, 1_000] {
        let doc = load_str(&generate_purview_html(size)).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(size), &doc, |b, doc| {
            b.iter(|| black_box(detect_layout(black_box(doc), &limits)));
        });
    }
    group.finish();
}

// =============================================================================
// Processing Benchmarks
// =============================================================================

fn bench_normalize_and_timeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalize_and_timeline");
    let formats = default_timestamp_formats();
    let recognizers = create_layout(Layout::Purview);

    for size in [1_000_usize, 10_000] {
        let doc = load_str(&generate_purview_html(size)).unwrap();
        let raws: Vec<_> = MessageBlocks::new(&doc, recognizers.as_ref(), LabelLimits::default()).collect();
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &raws, |b, raws| {
            b.iter(|| {
                let unique = normalize_and_dedup(black_box(raws.clone()), &formats);
                let timing = analyze(&unique.messages, Some(3600));
                black_box((unique, timing))
            });
        });
    }
    group.finish();
}

fn bench_classification(c: &mut Criterion) {
    let mut group = c.benchmark_group("classification");
    let classifier = ContentClassifier::default();
    let recognizers = create_layout(Layout::Purview);

    for size in [1_000_usize, 10_000] {
        let doc = load_str(&generate_purview_html(size)).unwrap();
        let raws: Vec<_> = MessageBlocks::new(&doc, recognizers.as_ref(), LabelLimits::default()).collect();
        let messages = normalize_and_dedup(raws, &default_timestamp_formats()).messages;
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &messages, |b, messages| {
            b.iter(|| {
                let classified: Vec<_> = messages.iter().map(|m| classifier.classify(black_box(m))).collect();
                black_box(classified)
            });
        });
    }
    group.finish();
}

// =============================================================================
// End-to-end and Output Benchmarks
// =============================================================================

fn bench_full_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_pipeline");
    let pipeline = Pipeline::default();

    for size in [100_usize, 1_000, 10_000] {
        let html = generate_purview_html(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &html, |b, html| {
            b.iter(|| {
                let outcome = pipeline.run_str(black_box(html)).unwrap();
                black_box(outcome)
            });
        });
    }
    group.finish();
}

fn bench_output(c: &mut Criterion) {
    let mut group = c.benchmark_group("output");
    let config = OutputConfig::all();
    let report = Pipeline::default()
        .run_str(&generate_purview_html(5_000))
        .unwrap()
        .report;

    group.throughput(Throughput::Elements(report.len() as u64));
    group.bench_function("csv", |b| b.iter(|| black_box(to_csv(&report.records, &config).unwrap())));
    group.bench_function("json", |b| b.iter(|| black_box(to_json(&report, &config).unwrap())));
    group.bench_function("jsonl", |b| b.iter(|| black_box(to_jsonl(&report.records, &config).unwrap())));
    group.finish();
}

criterion_group!(
    benches,
    bench_loading,
    bench_extraction,
    bench_layout_detection,
    bench_normalize_and_timeline,
    bench_classification,
    bench_full_pipeline,
    bench_output,
);
criterion_main!(benches);
