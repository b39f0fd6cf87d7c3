//! Criterion benchmarks for the noise models and the Kalman path.
//!
//! Run with: cargo bench
//! Run specific group: cargo bench -- kalman

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use nalgebra::DMatrix;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Duration;

use trajectory_noise_rs::common::ground_truth::circular_trajectory;
use trajectory_noise_rs::dispatch::{add_noise, denoise};
use trajectory_noise_rs::models::{ConstantVelocity, IndependentNoise, TemporalNoise};
use trajectory_noise_rs::types::{Observation, ObservationTable};

const TRACK_LENGTHS: [usize; 3] = [100, 1_000, 10_000];

fn circle_table(n_points: usize, n_groups: i64) -> ObservationTable {
    let rows: Vec<Observation> = (0..n_groups)
        .flat_map(|id| circular_trajectory(10.0, n_points, id))
        .collect();
    ObservationTable::new(rows)
}

// =============================================================================
// Noise Models
// =============================================================================

fn bench_noise(c: &mut Criterion) {
    let mut group = c.benchmark_group("noise");
    group.measurement_time(Duration::from_secs(5));

    let independent = IndependentNoise::new(&[0.0], &DMatrix::identity(2, 2)).unwrap();
    let temporal = TemporalNoise::new(
        &[0.0],
        &(DMatrix::identity(2, 2) * 0.5),
        &(DMatrix::identity(2, 2) * 0.1),
        1.0,
    )
    .unwrap();

    for &n in &TRACK_LENGTHS {
        let table = circle_table(n, 1);
        group.bench_function(BenchmarkId::new("independent", n), |b| {
            let mut rng = StdRng::seed_from_u64(42);
            b.iter(|| add_noise(&table, &independent, &mut rng).unwrap())
        });
        group.bench_function(BenchmarkId::new("temporal", n), |b| {
            let mut rng = StdRng::seed_from_u64(42);
            b.iter(|| add_noise(&table, &temporal, &mut rng).unwrap())
        });
    }

    group.finish();
}

// =============================================================================
// Kalman Path
// =============================================================================

fn bench_kalman(c: &mut Criterion) {
    let mut group = c.benchmark_group("kalman");
    group.measurement_time(Duration::from_secs(10));
    group.sample_size(20);

    let noise = IndependentNoise::new(&[0.0], &DMatrix::identity(2, 2)).unwrap();
    let model = ConstantVelocity::default();

    for &n in &TRACK_LENGTHS {
        let noisy = add_noise(&circle_table(n, 1), &noise, &mut StdRng::seed_from_u64(7)).unwrap();
        group.bench_function(BenchmarkId::new("constant_velocity", n), |b| {
            b.iter(|| denoise(&noisy, &model, 5).unwrap())
        });
    }

    // Many short groups stress partitioning and per-group fitting
    let noisy = add_noise(&circle_table(50, 200), &noise, &mut StdRng::seed_from_u64(7)).unwrap();
    group.bench_function("constant_velocity/200x50", |b| {
        b.iter(|| denoise(&noisy, &model, 5).unwrap())
    });

    group.finish();
}

criterion_group!(benches, bench_noise, bench_kalman);
criterion_main!(benches);
