//! Benchmark of cross-validated classifier evaluation and feature ranking
//!
//! Run with: cargo bench --bench evaluation_benchmark

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::prelude::*;
use rand::SeedableRng;

use rankbench::pipeline::{
    ClassifierRegistry, CrossValidationEvaluator, Dataset, Feature, FeatureRanker, Metric,
    SelectionMethod,
};
use rankbench::utils::RecordingDiagnostics;

/// Binary dataset where every third feature is shifted by the class
fn generate_dataset(n_rows: usize, n_features: usize, seed: u64) -> Dataset {
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    let labels: Vec<usize> = (0..n_rows).map(|_| usize::from(rng.gen::<f64>() > 0.6)).collect();

    let features = (0..n_features)
        .map(|i| {
            let values = labels
                .iter()
                .map(|&l| {
                    let base = if i % 3 == 0 { l as f64 * 2.0 } else { 0.0 };
                    base + rng.gen::<f64>() * 3.0
                })
                .collect();
            Feature::numeric(format!("feature_{}", i), values)
        })
        .collect();

    Dataset::new(features, "class", vec!["neg".into(), "pos".into()], labels)
        .expect("Failed to create dataset")
}

/// Ten-fold evaluation of each classifier on its own
fn benchmark_classifiers(c: &mut Criterion) {
    let mut group = c.benchmark_group("cross_validation");
    group.sample_size(10);

    let diagnostics = RecordingDiagnostics::new();
    let registry = ClassifierRegistry::default();
    let data = generate_dataset(500, 20, 42);
    group.throughput(Throughput::Elements(data.num_rows() as u64));

    for name in ["NB", "C4.5", "KNN3", "LR", "SMO", "RF"] {
        let classifiers = registry.resolve(&[name], &diagnostics);
        let evaluator = CrossValidationEvaluator::new(&diagnostics);
        group.bench_with_input(BenchmarkId::new(name, "500x20"), &data, |b, data| {
            b.iter(|| {
                let _ = evaluator.evaluate(
                    black_box(data),
                    black_box(10),
                    black_box(&classifiers),
                    black_box(&Metric::ALL),
                );
            });
        });
    }

    group.finish();
}

/// Ranking cost per selection method for growing feature counts
fn benchmark_ranking(c: &mut Criterion) {
    let mut group = c.benchmark_group("ranking");
    group.sample_size(10);

    let diagnostics = RecordingDiagnostics::new();
    let ranker = FeatureRanker::new(&diagnostics);

    for n_features in [10, 50] {
        let data = generate_dataset(300, n_features, 7);
        group.throughput(Throughput::Elements(n_features as u64));
        for method in SelectionMethod::ALL {
            group.bench_with_input(
                BenchmarkId::new(method.name(), n_features),
                &data,
                |b, data| {
                    b.iter(|| {
                        let _ = ranker.rank(black_box(data), black_box(method.name()));
                    });
                },
            );
        }
    }

    group.finish();
}

criterion_group!(benches, benchmark_classifiers, benchmark_ranking);
criterion_main!(benches);
