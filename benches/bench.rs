//! Criterion benchmarks covering the hot paths: text analysis,
//! indexing, and query execution.

use std::hint::black_box;
use std::sync::Arc;

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use yari::analysis::analyzer::{Analyzer, PerFieldAnalyzer, StandardAnalyzer};
use yari::document::Document;
use yari::index::{Index, IndexConfig};
use yari::query::{BooleanQuery, PhraseQuery, QueryParser, TermQuery};
use yari::search::{SearchRequest, Searcher};

/// Deterministic pseudo-random documents built from a small vocabulary.
fn generate_bodies(count: usize) -> Vec<String> {
    let words = [
        "search", "engine", "full", "text", "index", "query", "document", "field", "term",
        "phrase", "boolean", "score", "analysis", "token", "stemming", "posting", "segment",
        "merge", "facet", "sort", "relevance", "ranking", "storage", "reader", "writer",
        "snapshot", "delete", "commit", "manifest", "checksum", "quick", "fox",
    ];

    let mut bodies = Vec::with_capacity(count);
    for i in 0..count {
        let len = 20 + (i % 40);
        let mut doc_words = Vec::with_capacity(len);
        for j in 0..len {
            doc_words.push(words[(i * 7 + j * 13) % words.len()]);
        }
        bodies.push(doc_words.join(" "));
    }
    bodies
}

fn build_index(bodies: &[String]) -> Index {
    let index = Index::in_memory(IndexConfig {
        analyzer: Arc::new(PerFieldAnalyzer::new(StandardAnalyzer::new())),
    })
    .unwrap();
    let mut writer = index.writer().unwrap();
    for (i, body) in bodies.iter().enumerate() {
        writer
            .add_document(
                Document::builder()
                    .add_stored("id", &i.to_string())
                    .add_text("body", body)
                    .build(),
            )
            .unwrap();
    }
    writer.close().unwrap();
    index
}

fn bench_analysis(c: &mut Criterion) {
    let mut group = c.benchmark_group("analysis");

    let analyzer = StandardAnalyzer::new();
    let bodies = generate_bodies(100);

    group.bench_function("analyze_single_document", |b| {
        b.iter(|| {
            let tokens: Vec<_> = analyzer.analyze(black_box(&bodies[0])).unwrap().collect();
            black_box(tokens)
        })
    });

    group.throughput(Throughput::Elements(bodies.len() as u64));
    group.bench_function("analyze_batch", |b| {
        b.iter(|| {
            for body in &bodies {
                let tokens: Vec<_> = analyzer.analyze(black_box(body)).unwrap().collect();
                black_box(tokens);
            }
        })
    });

    group.finish();
}

fn bench_indexing(c: &mut Criterion) {
    let mut group = c.benchmark_group("indexing");
    group.sample_size(20);

    let bodies = generate_bodies(500);

    group.throughput(Throughput::Elements(bodies.len() as u64));
    group.bench_function("add_and_commit", |b| {
        b.iter(|| {
            let index = build_index(black_box(&bodies));
            black_box(index)
        })
    });

    group.finish();
}

fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("search");

    let bodies = generate_bodies(2000);
    let index = build_index(&bodies);
    let searcher = Searcher::new(index.reader().unwrap());
    let parser = QueryParser::new("body", index.analyzer().clone());

    group.bench_function("term_query", |b| {
        b.iter(|| {
            let top = searcher
                .search(&SearchRequest::new(TermQuery::new("body", "search")))
                .unwrap();
            black_box(top)
        })
    });

    group.bench_function("boolean_query", |b| {
        let query = BooleanQuery::builder()
            .must(TermQuery::new("body", "search"))
            .must(TermQuery::new("body", "index"))
            .must_not(TermQuery::new("body", "facet"))
            .build();
        let request = SearchRequest::new(query);
        b.iter(|| {
            let top = searcher.search(black_box(&request)).unwrap();
            black_box(top)
        })
    });

    group.bench_function("phrase_query", |b| {
        let request = SearchRequest::new(PhraseQuery::new("body", &["quick", "fox"]).with_slop(2));
        b.iter(|| {
            let top = searcher.search(black_box(&request)).unwrap();
            black_box(top)
        })
    });

    group.bench_function("parse_and_search", |b| {
        b.iter(|| {
            let query = parser.parse(black_box("search AND index -facet")).unwrap();
            let top = searcher.search(&SearchRequest::from_boxed(query)).unwrap();
            black_box(top)
        })
    });

    group.finish();
}

criterion_group!(benches, bench_analysis, bench_indexing, bench_search);
criterion_main!(benches);
