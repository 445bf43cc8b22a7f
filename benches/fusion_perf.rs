//! Criterion benchmarks for the in-process parts of a search.
//!
//! Performance targets:
//! - RRF fusion of two 200-hit lists: < 100us
//! - Query processing with spell correction: < 50us
//! - Hash embedding of a short query: < 10us

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use std::sync::Arc;

use article_search::query::{FrequencyDictionary, QueryProcessor};
use article_search::search::sort::apply_sort;
use article_search::search::{Document, HashEmbedder, RrfConfig, SortOverride, fuse_results};

fn ranked(prefix: &str, len: usize, overlap_every: usize) -> Vec<Document> {
    (0..len)
        .map(|i| {
            let id = if i % overlap_every == 0 {
                format!("shared-{i}")
            } else {
                format!("{prefix}-{i}")
            };
            Document::new(id, (len - i) as f64)
                .with_title(format!("Article {i}"))
                .with_published_at(format!("2017-{:02}-{:02}", i % 12 + 1, i % 28 + 1))
        })
        .collect()
}

// =============================================================================
// Fusion
// =============================================================================

fn fusion_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("rrf_fusion");
    let config = RrfConfig::default();

    for size in [20usize, 200, 1000] {
        let lexical = ranked("lex", size, 3);
        let semantic = ranked("sem", size, 2);
        group.throughput(Throughput::Elements((size * 2) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter(|| {
                fuse_results(
                    black_box(&lexical),
                    black_box(&semantic),
                    &config,
                    black_box(size / 2),
                )
            });
        });
    }
    group.finish();
}

fn sort_benchmarks(c: &mut Criterion) {
    let docs = ranked("doc", 100, 5);
    c.bench_function("date_desc_sort_100", |b| {
        b.iter(|| {
            let mut results = docs.clone();
            apply_sort(&mut results, black_box(SortOverride::DateDesc));
            results
        });
    });
}

// =============================================================================
// Query preprocessing
// =============================================================================

fn query_benchmarks(c: &mut Criterion) {
    let dictionary = FrequencyDictionary::from_counts(
        [
            ("healthcare", 500),
            ("policy", 900),
            ("reform", 400),
            ("senate", 300),
            ("climate", 350),
        ],
        2,
    );
    let processor = QueryProcessor::new(Arc::new(dictionary));
    let embedder = HashEmbedder::new(384);

    let mut group = c.benchmark_group("query");
    group.bench_function("process_with_correction", |b| {
        b.iter(|| processor.process(black_box("  Helthcare POLICY reformm!! "), true));
    });
    group.bench_function("process_without_correction", |b| {
        b.iter(|| processor.process(black_box("  Helthcare POLICY reformm!! "), false));
    });
    group.bench_function("hash_embed_384", |b| {
        b.iter(|| embedder.embed_text(black_box("healthcare policy reform")));
    });
    group.finish();
}

criterion_group!(benches, fusion_benchmarks, sort_benchmarks, query_benchmarks);
criterion_main!(benches);
