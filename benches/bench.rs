//! Criterion benchmarks for hashlearn.
//!
//! Covers the hot paths of both learning modes:
//! - Text analysis and feature hashing
//! - IDF fitting and weighting
//! - Naive Bayes training and prediction
//! - Streaming SGD updates

use std::hint::black_box;

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use hashlearn::analysis::analyzer::{Analyzer, StandardAnalyzer};
use hashlearn::config::StreamingConfig;
use hashlearn::feature::hashing::HashingTf;
use hashlearn::feature::idf::IdfEstimator;
use hashlearn::feature::sparse::SparseVector;
use hashlearn::ml::dataset::LabeledVector;
use hashlearn::ml::linear::StreamingLinearRegression;
use hashlearn::ml::naive_bayes::NaiveBayes;

/// Generate test documents for benchmarking.
fn generate_test_documents(count: usize) -> Vec<String> {
    let words = [
        "orbit", "launch", "shuttle", "nasa", "satellite", "hockey", "goalie", "puck",
        "playoffs", "skates", "engine", "brakes", "dealer", "mileage", "sedan", "windows",
        "driver", "printer", "monitor", "keyboard", "encryption", "clipper", "privacy",
        "government", "the", "and", "with", "about", "1993", "2nd",
    ];

    let mut documents = Vec::with_capacity(count);
    for i in 0..count {
        let doc_length = 50 + (i % 100);
        let mut doc_words = Vec::with_capacity(doc_length);
        for j in 0..doc_length {
            let word_idx = (i * 7 + j * 13) % words.len(); // Pseudo-random distribution
            doc_words.push(words[word_idx]);
        }
        documents.push(doc_words.join(" "));
    }

    documents
}

/// Benchmark text analysis and feature hashing.
fn bench_text_features(c: &mut Criterion) {
    let mut group = c.benchmark_group("text_features");

    let analyzer = StandardAnalyzer::new();
    let hashing = HashingTf::new(1 << 18).unwrap();
    let texts = generate_test_documents(1000);

    group.bench_function("analyze_single_document", |b| {
        b.iter(|| {
            let tokens: Vec<_> = analyzer.analyze(black_box(&texts[0])).collect();
            black_box(tokens)
        })
    });

    group.throughput(Throughput::Elements(100));
    group.bench_function("hash_batch_documents", |b| {
        b.iter(|| {
            for text in texts.iter().take(100) {
                black_box(hashing.transform_text(&analyzer, black_box(text)));
            }
        })
    });

    let term_frequencies: Vec<SparseVector> = texts
        .iter()
        .map(|text| hashing.transform_text(&analyzer, text))
        .collect();

    group.throughput(Throughput::Elements(term_frequencies.len() as u64));
    group.bench_function("idf_fit", |b| {
        b.iter(|| black_box(IdfEstimator::new().fit(black_box(&term_frequencies)).unwrap()))
    });

    let idf = IdfEstimator::new().fit(&term_frequencies).unwrap();
    group.bench_function("idf_transform", |b| {
        b.iter(|| {
            for tf in &term_frequencies {
                black_box(idf.transform(black_box(tf)).unwrap());
            }
        })
    });

    group.finish();
}

/// Benchmark Naive Bayes training and prediction.
fn bench_naive_bayes(c: &mut Criterion) {
    let mut group = c.benchmark_group("naive_bayes");
    group.sample_size(20);

    let analyzer = StandardAnalyzer::new();
    let hashing = HashingTf::new(1 << 16).unwrap();
    let data: Vec<LabeledVector> = generate_test_documents(500)
        .iter()
        .enumerate()
        .map(|(i, text)| LabeledVector::new((i % 4) as f64, hashing.transform_text(&analyzer, text)))
        .collect();

    group.throughput(Throughput::Elements(data.len() as u64));
    group.bench_function("train", |b| {
        b.iter(|| black_box(NaiveBayes::default().train(black_box(&data)).unwrap()))
    });

    let model = NaiveBayes::default().train(&data).unwrap();
    group.bench_function("predict", |b| {
        b.iter(|| {
            for point in &data {
                black_box(model.predict(black_box(&point.features)).unwrap());
            }
        })
    });

    group.finish();
}

/// Benchmark streaming SGD updates.
fn bench_streaming_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("streaming_update");

    let dimension = 100;
    let batch: Vec<LabeledVector> = (0..1000)
        .map(|i| {
            let features: Vec<f64> = (0..dimension)
                .map(|j| ((i as f64 * 0.1 + j as f64 * 0.01).sin() * 0.5))
                .collect();
            LabeledVector::from_dense((i % 10) as f64, &features)
        })
        .collect();

    group.throughput(Throughput::Elements(batch.len() as u64));
    group.bench_function("sgd_batch", |b| {
        b.iter_with_setup(
            || {
                StreamingLinearRegression::new(vec![0.0; dimension], &StreamingConfig::default())
                    .unwrap()
            },
            |mut regression| {
                regression.update(black_box(&batch)).unwrap();
                black_box(regression)
            },
        )
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_text_features,
    bench_naive_bayes,
    bench_streaming_update
);
criterion_main!(benches);
