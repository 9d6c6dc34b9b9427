//! Criterion benchmarks for pricer_core building blocks.
//!
//! Measures the memoisation round trip, the inverse normal CDF used by every
//! quasi-random sampler, and the Cholesky correlation of a noise matrix.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use pricer_core::cache::{CacheKey, MemoCache};
use pricer_core::math::{norm_inv_cdf, CorrelationMatrix, Matrix};
use pricer_core::types::{PathValue, SimDate, SimulationError};

/// Benchmark cache hits and date roll-overs.
fn bench_memoize(c: &mut Criterion) {
    let mut group = c.benchmark_group("memoize");
    let date = SimDate::new(1.0).unwrap();

    group.bench_function("hit", |b| {
        let cache: MemoCache<PathValue> = MemoCache::new();
        cache
            .memoize(date, CacheKey::op("spot"), || {
                Ok::<_, SimulationError>(PathValue::Constant(1.0))
            })
            .unwrap();
        b.iter(|| {
            cache.memoize(black_box(date), CacheKey::op("spot"), || {
                Ok::<_, SimulationError>(PathValue::Constant(2.0))
            })
        })
    });

    group.bench_function("roll_over", |b| {
        let cache: MemoCache<PathValue> = MemoCache::new();
        let mut step = 0u32;
        b.iter(|| {
            step += 1;
            let d = SimDate::new(f64::from(step)).unwrap();
            cache.memoize(d, CacheKey::op("simulate"), || {
                Ok::<_, SimulationError>(PathValue::Constant(1.0))
            })
        })
    });

    group.finish();
}

/// Benchmark the inverse normal CDF over a grid of probabilities.
fn bench_norm_inv_cdf(c: &mut Criterion) {
    let ps: Vec<f64> = (1..10_000).map(|i| i as f64 / 10_000.0).collect();
    c.bench_function("norm_inv_cdf_10k", |b| {
        b.iter(|| ps.iter().map(|&p| norm_inv_cdf(black_box(p))).sum::<f64>())
    });
}

/// Benchmark correlating `n × n_sims` noise matrices.
fn bench_correlate(c: &mut Criterion) {
    let mut group = c.benchmark_group("correlate");

    for dim in [2usize, 8] {
        let mut data = vec![0.3; dim * dim];
        for i in 0..dim {
            data[i * dim + i] = 1.0;
        }
        let chol = CorrelationMatrix::new(&data, dim).unwrap().cholesky().unwrap();
        let n_sims = 10_000;
        let raw = Matrix::from_vec(
            dim,
            n_sims,
            (0..dim * n_sims).map(|k| ((k % 97) as f64 - 48.0) / 20.0).collect(),
        )
        .unwrap();

        group.bench_with_input(BenchmarkId::new("cholesky", dim), &raw, |b, raw| {
            b.iter(|| chol.correlate(black_box(raw)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_memoize, bench_norm_inv_cdf, bench_correlate);
criterion_main!(benches);
