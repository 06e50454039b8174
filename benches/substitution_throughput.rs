//! Substitution and merge throughput benchmarks
//!
//! Measures the per-unit work of a generation run with varying:
//! - Frames per template (10, 100, 1000)
//! - Substitution strategy (element tree, line-oriented)
//! - Units merged into one document (10, 100, 1000)
//!
//! Run benchmarks: `cargo bench --bench substitution_throughput`
//!
//! Compare specific groups:
//! ```
//! cargo bench --bench substitution_throughput -- "substitution"
//! cargo bench --bench substitution_throughput -- "merge"
//! ```

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use slagen::composer::{MergeBuffer, remove_empty_texts};
use slagen::document::Document;
use slagen::template::PlaceholderEngine;
use slagen::types::{CleanupOptions, Record, SubstitutionOptions};
use std::hint::black_box;

const FIELDS: [&str; 4] = ["name", "street", "city", "photo"];

/// One page holding `frames` text frames and an image frame.
fn template(frames: usize) -> String {
    let objects: String = (0..frames)
        .map(|i| {
            format!(
                r#"<PAGEOBJECT ItemID="{id}" PTYPE="4" OwnPage="0" YPOS="{y}" NEXTITEM="-1" BACKITEM="-1"><StoryText><DefaultStyle/><ITEXT CH="%VAR_name%, %VAR_street%"/><para/><ITEXT CH="%VAR_city% %VAR_unknown%"/><trail/></StoryText></PAGEOBJECT>"#,
                id = 100 + i,
                y = 20 + i
            )
        })
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<SCRIBUSUTF8NEW Version="1.5.8"><DOCUMENT ANZPAGES="1" PAGEHEIGHT="842" GapVertical="40"><COLOR NAME="Black" SPACE="CMYK"/><PAGE NUM="0" PAGEYPOS="20"/>{objects}<PAGEOBJECT ItemID="99" PTYPE="2" OwnPage="0" YPOS="600" PFILE="%VAR_photo%"/></DOCUMENT></SCRIBUSUTF8NEW>"#
    )
}

fn record(i: usize) -> Record {
    Record::new()
        .with_field("name", format!("Record {}", i))
        .with_field("street", format!("{} Main Street", i))
        .with_field("city", "Oslo")
        .with_field("photo", format!("photo_{}.png", i))
}

fn engine() -> PlaceholderEngine {
    PlaceholderEngine::new(FIELDS, SubstitutionOptions::default()).expect("Failed to build engine")
}

/// Compares tree substitution against the line-oriented variant
fn benchmark_substitution(c: &mut Criterion) {
    let mut group = c.benchmark_group("substitution");
    let engine = engine();
    let records = [record(1)];

    for frames in [10, 100, 1000] {
        let text = template(frames);
        let document = Document::parse(&text).expect("Failed to parse template");
        group.throughput(Throughput::Elements(frames as u64));

        group.bench_with_input(BenchmarkId::new("tree", frames), &document, |b, document| {
            b.iter(|| {
                let mut unit = document.clone();
                let stats = engine.substitute_document(&mut unit, black_box(&records));
                remove_empty_texts(&mut unit, CleanupOptions::default());
                black_box(stats)
            });
        });

        group.bench_with_input(BenchmarkId::new("lines", frames), &text, |b, text| {
            b.iter(|| black_box(engine.substitute_lines(text, black_box(&records))));
        });
    }
    group.finish();
}

/// Benchmark stacking substituted units into one document
fn benchmark_merge(c: &mut Criterion) {
    let mut group = c.benchmark_group("merge");
    group.sample_size(20);
    let engine = engine();
    let document = Document::parse(&template(10)).expect("Failed to parse template");

    for units in [10, 100, 1000] {
        let fragments: Vec<Document> = (0..units)
            .map(|i| {
                let mut unit = document.clone();
                engine.substitute_document(&mut unit, &[record(i)]);
                unit
            })
            .collect();
        group.throughput(Throughput::Elements(units as u64));

        group.bench_with_input(BenchmarkId::new("units", units), &fragments, |b, fragments| {
            b.iter(|| {
                let mut fragments = fragments.iter().cloned();
                let seed = fragments.next().expect("at least one fragment");
                let mut buffer = MergeBuffer::new(seed, "").expect("Failed to start merge");
                for fragment in fragments {
                    buffer.append(fragment).expect("Failed to append fragment");
                }
                black_box(buffer.finish().expect("Failed to finish merge"))
            });
        });
    }
    group.finish();
}

criterion_group!(benches, benchmark_substitution, benchmark_merge);
criterion_main!(benches);
