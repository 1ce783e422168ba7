//! Evaluation pipeline benchmarks.
//!
//! Batches are synthetic and deterministic so runs are comparable.

#![allow(missing_docs, clippy::unwrap_used, clippy::expect_used)]

use std::hint::black_box;

use chrono::{Duration, TimeZone, Utc};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use model_evaluator::config::EvaluationPolicy;
use model_evaluator::evaluation::{
    DriftDetector, ErrorAnalyzer, Evaluator, MetricsCalculator, VerificationRecord,
};
use model_evaluator::traits::FixedTimeProvider;

const BATCH_SIZES: [usize; 3] = [100, 1_000, 10_000];

fn synthetic_batch(size: usize) -> Vec<VerificationRecord> {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    (0..size)
        .map(|i| {
            let step = i64::try_from(i).unwrap();
            let expert = f64::from(u32::try_from(i * 37 % 101).unwrap());
            let offset = f64::from(u32::try_from(i * 13 % 31).unwrap()) - 15.0;
            let ai = (expert + offset).clamp(0.0, 100.0);
            let confidence = f64::from(u32::try_from(i % 100).unwrap()) / 100.0;
            let expert_score = (i % 5 != 0).then_some(expert);
            VerificationRecord::new(
                format!("bench-{i:06}"),
                start + Duration::minutes(step),
                ai,
                expert_score,
                confidence,
            )
        })
        .collect()
}

fn bench_full_evaluation(c: &mut Criterion) {
    let now = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
    let evaluator = Evaluator::with_clock(EvaluationPolicy::default(), FixedTimeProvider(now));

    let mut group = c.benchmark_group("evaluate");
    for size in BATCH_SIZES {
        let batch = synthetic_batch(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &batch, |b, batch| {
            b.iter(|| evaluator.evaluate(black_box(batch)).unwrap());
        });
    }
    group.finish();
}

fn bench_stages(c: &mut Criterion) {
    let policy = EvaluationPolicy::default();
    let metrics = MetricsCalculator::new(policy);
    let drift = DriftDetector::new(policy);
    let errors = ErrorAnalyzer::new(policy);
    let batch = synthetic_batch(1_000);

    c.bench_function("metrics_1000", |b| {
        b.iter(|| metrics.calculate(black_box(&batch)));
    });
    c.bench_function("drift_1000", |b| {
        b.iter(|| drift.detect(black_box(&batch)));
    });
    c.bench_function("errors_1000", |b| {
        b.iter(|| errors.analyze(black_box(&batch)));
    });
}

criterion_group!(benches, bench_full_evaluation, bench_stages);
criterion_main!(benches);
