//! End-to-end tests for the noise and Kalman paths
//!
//! Every test uses a seeded `StdRng`, so results are reproducible.

#[path = "helpers/scenarios.rs"]
mod scenarios;

use nalgebra::DMatrix;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

use trajectory_noise_rs::common::metrics::mean_absolute_deviation;
use trajectory_noise_rs::config::{FilterConfig, NoiseConfig};
use trajectory_noise_rs::dispatch::{add_noise, add_noise_with_config, denoise, denoise_with_config};
use trajectory_noise_rs::models::{ConstantVelocity, NoiseRegistry, StateSpaceRegistry, TemporalNoise};
use trajectory_noise_rs::types::{GroupId, Observation, ObservationTable};
use trajectory_noise_rs::TrajectoryError;

use scenarios::{circles, group_rows, white_noise};

#[test]
fn test_filter_reduces_mad_on_noisy_circle() {
    let truth = circles(1);
    let mut rng = StdRng::seed_from_u64(42);
    let noisy = add_noise(&truth, &white_noise(1.0), &mut rng).unwrap();

    let model = ConstantVelocity::default();
    let filtered = denoise(&noisy, &model, 5).unwrap();
    assert!(filtered.warnings.is_empty());

    let before = mean_absolute_deviation(noisy.rows(), truth.rows());
    let after = mean_absolute_deviation(filtered.table.rows(), truth.rows());
    assert!(
        after < before,
        "filtering should reduce MAD: before={:.4}, after={:.4}",
        before,
        after
    );
}

#[test]
fn test_filter_reduces_mad_per_group() {
    let truth = circles(3);
    let mut rng = StdRng::seed_from_u64(2024);
    let noisy = add_noise(&truth, &white_noise(1.0), &mut rng).unwrap();

    let model = ConstantVelocity::default();
    let filtered = denoise(&noisy, &model, 5).unwrap();
    assert_eq!(
        filtered.table.group_ids(),
        vec![GroupId::Int(0), GroupId::Int(1), GroupId::Int(2)]
    );

    for id in 0..3 {
        let t = group_rows(&truth, id);
        let before = mean_absolute_deviation(&group_rows(&noisy, id), &t);
        let after = mean_absolute_deviation(&group_rows(&filtered.table, id), &t);
        assert!(after < before, "group {}: before={:.4}, after={:.4}", id, before, after);
    }
}

#[test]
fn test_default_filter_config_reduces_mad_across_seeds() {
    let truth = circles(1);
    let noise = white_noise(1.0);
    let registry = StateSpaceRegistry::with_builtins();

    for seed in 0..100 {
        let noisy = add_noise(&truth, &noise, &mut StdRng::seed_from_u64(seed)).unwrap();
        let filtered = denoise_with_config(&noisy, &FilterConfig::default(), &registry).unwrap();

        let before = mean_absolute_deviation(noisy.rows(), truth.rows());
        let after = mean_absolute_deviation(filtered.table.rows(), truth.rows());
        assert!(
            after < before,
            "seed {}: before={:.4}, after={:.4}",
            seed,
            before,
            after
        );
    }
}

#[test]
fn test_groups_receive_distinct_draws() {
    let truth = circles(2);
    let noisy = add_noise(&truth, &white_noise(1.0), &mut StdRng::seed_from_u64(5)).unwrap();

    let offsets = |id: i64| -> Vec<f64> {
        group_rows(&noisy, id)
            .iter()
            .zip(group_rows(&truth, id))
            .map(|(n, t)| n.x - t.x)
            .collect()
    };
    assert_ne!(offsets(0), offsets(1));
}

#[test]
fn test_boundary_group_is_returned_unchanged() {
    let mut rows = scenarios::circles(1).into_rows();
    let small: Vec<Observation> = (0..5)
        .map(|i| Observation::with_id(i as f64, 1.0 + i as f64, -3.5, "tiny"))
        .collect();
    rows.extend(small.iter().cloned());
    let table = ObservationTable::new(rows);

    let out = denoise(&table, &ConstantVelocity::default(), 5).unwrap();

    assert_eq!(out.warnings.len(), 1);
    assert_eq!(out.warnings[0].group, GroupId::Name("tiny".to_string()));
    assert_eq!(out.warnings[0].samples, 5);
    assert_eq!(&out.table.rows()[100..], &small[..]);
}

#[test]
fn test_group_above_threshold_is_filtered() {
    let rows: Vec<Observation> = (0..6)
        .map(|i| Observation::new(i as f64, (i * i) as f64, 0.5 * i as f64))
        .collect();
    let out = denoise(&ObservationTable::new(rows.clone()), &ConstantVelocity::default(), 5).unwrap();
    assert!(out.warnings.is_empty());
    assert_ne!(out.table.rows(), &rows[..]);
}

#[test]
fn test_same_seed_is_bit_identical() {
    let truth = circles(2);
    let temporal = TemporalNoise::new(
        &[0.1],
        &(DMatrix::identity(2, 2) * 0.6),
        &(DMatrix::identity(2, 2) * 0.2),
        1.0,
    )
    .unwrap();

    let run = |seed: u64| {
        let noisy = add_noise(&truth, &temporal, &mut StdRng::seed_from_u64(seed)).unwrap();
        let filtered = denoise(&noisy, &ConstantVelocity::default(), 5).unwrap();
        (noisy, filtered)
    };

    let (noisy_a, filtered_a) = run(77);
    let (noisy_b, filtered_b) = run(77);
    assert_eq!(noisy_a, noisy_b);
    assert_eq!(filtered_a, filtered_b);

    let (noisy_c, _) = run(78);
    assert_ne!(noisy_a, noisy_c);
}

#[test]
fn test_shape_errors_raised_before_sampling() {
    let truth = circles(1);
    let registry = NoiseRegistry::with_builtins();

    for n in [1usize, 3] {
        let bad: Vec<Vec<f64>> = (0..n)
            .map(|i| (0..n).map(|j| if i == j { 1.0 } else { 0.0 }).collect())
            .collect();

        let configs = [
            NoiseConfig {
                covariance: Some(bad.clone()),
                ..NoiseConfig::default()
            },
            NoiseConfig {
                model: "temporal".to_string(),
                transition: Some(bad.clone()),
                covariance: Some(vec![vec![1.0, 0.0], vec![0.0, 1.0]]),
                ..NoiseConfig::default()
            },
        ];

        for config in &configs {
            let mut rng = StdRng::seed_from_u64(9);
            let err = add_noise_with_config(&truth, config, &registry, &mut rng).unwrap_err();
            assert!(matches!(err, TrajectoryError::Dimension { .. }), "{}", err);
            assert!(err.to_string().contains(&format!("{}x{}", n, n)));

            // The generator was never touched
            assert_eq!(rng.next_u64(), StdRng::seed_from_u64(9).next_u64());
        }
    }
}

#[test]
fn test_indefinite_covariance_is_numerical_error() {
    let config = NoiseConfig {
        covariance: Some(vec![vec![1.0, 0.0], vec![0.0, -1.0]]),
        ..NoiseConfig::default()
    };
    let err = add_noise_with_config(
        &circles(1),
        &config,
        &NoiseRegistry::with_builtins(),
        &mut StdRng::seed_from_u64(1),
    )
    .unwrap_err();
    assert!(matches!(err, TrajectoryError::Numerical { .. }));
}

#[test]
fn test_json_records_through_config_paths() {
    let json = r#"[
        {"time": 0.0, "x": 0.0, "y": 0.0},
        {"time": 1.0, "x": 1.0, "y": 0.5},
        {"time": 2.0, "x": 2.0, "y": 1.0},
        {"time": 3.0, "x": 3.0, "y": 1.5},
        {"time": 4.0, "x": 4.0, "y": 2.0},
        {"time": 5.0, "x": 5.0, "y": 2.5},
        {"time": 6.0, "x": 6.0, "y": 3.0}
    ]"#;
    let table = ObservationTable::from_json(json).unwrap();
    assert_eq!(table.group_ids(), vec![GroupId::Default]);

    let noise = NoiseConfig::from_json(
        r#"{"model": "temporal", "intercept": [0.0], "transition": [[0.5, 0.0], [0.0, 0.5]],
            "covariance": [[0.01, 0.0], [0.0, 0.01]]}"#,
    )
    .unwrap();
    let noisy = add_noise_with_config(
        &table,
        &noise,
        &NoiseRegistry::with_builtins(),
        &mut StdRng::seed_from_u64(3),
    )
    .unwrap();

    let filter = FilterConfig::from_json(r#"{"error": [0.1], "min_samples": 3}"#).unwrap();
    let out = denoise_with_config(&noisy, &filter, &StateSpaceRegistry::with_builtins()).unwrap();
    assert_eq!(out.table.len(), 7);

    let reparsed = ObservationTable::from_json(&out.table.to_json()).unwrap();
    assert_eq!(reparsed, out.table);
}
