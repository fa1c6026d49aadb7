//! Benchmarks for the propagation model
//!
//! Run with: cargo bench -p earshot-core --bench attenuation_bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use earshot_core::{active_distance, apply_attenuation, PropagationModel, SearchGrid};
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

// ============================================================================
// Composite grid evaluation
// ============================================================================

fn bench_attenuation_grid(c: &mut Criterion) {
    let mut group = c.benchmark_group("attenuation_grid");
    let model = PropagationModel::default();

    for n in [64usize, 256, 1024] {
        let freqs: Vec<f64> = (1..=n).map(|k| k as f64 * 20.0).collect();
        let dists: Vec<f64> = (1..=n).map(|k| k as f64).collect();

        group.throughput(Throughput::Elements((n * n) as u64));
        group.bench_with_input(BenchmarkId::new("factor", n), &n, |b, _| {
            b.iter(|| {
                model
                    .attenuation_factor(black_box(freqs.clone()), black_box(dists.clone()))
                    .unwrap()
            })
        });
        group.bench_with_input(BenchmarkId::new("db_with_records", n), &n, |b, _| {
            b.iter(|| {
                model
                    .attenuation_db(black_box(freqs.clone()), black_box(dists.clone()))
                    .unwrap()
            })
        });
    }

    group.finish();
}

// ============================================================================
// Detection-range scan
// ============================================================================

fn bench_active_distance(c: &mut Criterion) {
    let mut group = c.benchmark_group("active_distance");
    let model = PropagationModel::default();

    for n_freqs in [1usize, 8, 64] {
        let freqs: Vec<f64> = (1..=n_freqs).map(|k| 500.0 + k as f64 * 100.0).collect();
        let l_bkg = vec![30.0; n_freqs];
        let l0 = vec![85.0; n_freqs];

        group.bench_with_input(BenchmarkId::new("scan_10km", n_freqs), &n_freqs, |b, _| {
            b.iter(|| {
                active_distance(
                    &model,
                    black_box(l_bkg.clone()),
                    black_box(l0.clone()),
                    black_box(freqs.clone()),
                    SearchGrid::default(),
                )
                .unwrap()
            })
        });
    }

    group.finish();
}

// ============================================================================
// Waveform attenuation
// ============================================================================

fn bench_apply_attenuation(c: &mut Criterion) {
    let mut group = c.benchmark_group("apply_attenuation");
    let model = PropagationModel::default();

    let mut rng = rand::rngs::StdRng::seed_from_u64(42);
    let noise = Normal::new(0.0, 0.2).unwrap();

    for n in [1024usize, 16_384, 65_536] {
        let signal: Vec<f64> = (0..n)
            .map(|i| {
                let t = i as f64 / 48_000.0;
                (2.0 * std::f64::consts::PI * 3000.0 * t).sin() + noise.sample(&mut rng)
            })
            .collect();

        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::new("fft_filter", n), &n, |b, _| {
            b.iter(|| apply_attenuation(&model, black_box(&signal), 48_000.0, 50.0).unwrap())
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_attenuation_grid,
    bench_active_distance,
    bench_apply_attenuation
);
criterion_main!(benches);
