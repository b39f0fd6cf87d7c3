//! Caller-supplied strategies and registry extension

use nalgebra::{DMatrix, DVector, Vector2};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

use trajectory_noise_rs::common::stats::finite_mean;
use trajectory_noise_rs::config::{FilterConfig, NoiseConfig};
use trajectory_noise_rs::dispatch::{add_noise, add_noise_with_config, denoise};
use trajectory_noise_rs::models::{
    ConstantMatrix, ModelChoice, NoiseModel, NoiseRegistry, ParameterBundle, StateSpaceModel,
    StateSpaceRegistry,
};
use trajectory_noise_rs::types::{Observation, ObservationTable};
use trajectory_noise_rs::TrajectoryError;

/// Position-only random walk: `x_t = x_{t-1} + w`
#[derive(Debug)]
struct RandomWalk {
    step_variance: f64,
}

impl StateSpaceModel for RandomWalk {
    fn name(&self) -> &str {
        "random_walk"
    }

    fn build(&self, observations: &[Observation]) -> Result<ParameterBundle, TrajectoryError> {
        let xs: Vec<f64> = observations.iter().map(|o| o.x).collect();
        let ys: Vec<f64> = observations.iter().map(|o| o.y).collect();
        Ok(ParameterBundle {
            initial_state: DVector::from_vec(vec![
                finite_mean(&xs).unwrap_or(0.0),
                finite_mean(&ys).unwrap_or(0.0),
            ]),
            initial_covariance: DMatrix::identity(2, 2) * 100.0,
            transition: Box::new(ConstantMatrix(DMatrix::identity(2, 2))),
            process_noise: Box::new(ConstantMatrix(DMatrix::identity(2, 2) * self.step_variance)),
            control_matrix: DMatrix::zeros(2, 1),
            control_input: DVector::zeros(1),
            observation_matrix: DMatrix::identity(2, 2),
            measurement_noise_factor: DMatrix::identity(2, 2),
        })
    }
}

/// Deterministic offset taken from the configured mean
#[derive(Debug)]
struct ConstantShift {
    offset: Vector2<f64>,
}

impl NoiseModel for ConstantShift {
    fn name(&self) -> &str {
        "shift"
    }

    fn sample_residuals(
        &self,
        observations: &[Observation],
        _rng: &mut dyn RngCore,
    ) -> Result<Vec<Vector2<f64>>, TrajectoryError> {
        Ok(vec![self.offset; observations.len()])
    }
}

fn build_shift(config: &NoiseConfig) -> Result<Box<dyn NoiseModel>, TrajectoryError> {
    let mean = config.mean.clone().unwrap_or_else(|| vec![0.0]);
    let (dx, dy) = match mean.as_slice() {
        [v] => (*v, *v),
        [a, b, ..] => (*a, *b),
        [] => (0.0, 0.0),
    };
    Ok(Box::new(ConstantShift {
        offset: Vector2::new(dx, dy),
    }))
}

fn build_random_walk(_config: &FilterConfig) -> Result<Box<dyn StateSpaceModel>, TrajectoryError> {
    Ok(Box::new(RandomWalk { step_variance: 0.5 }))
}

fn table(n: usize) -> ObservationTable {
    ObservationTable::new(
        (0..n)
            .map(|i| Observation::with_id(i as f64, (i as f64).sin(), (i as f64).cos(), 1_i64))
            .collect(),
    )
}

#[test]
fn test_registered_noise_model_is_used_by_name() {
    let mut registry = NoiseRegistry::with_builtins();
    registry.register("shift", build_shift);
    assert!(registry.names().contains(&"shift".to_string()));

    let config = NoiseConfig {
        model: "shift".to_string(),
        mean: Some(vec![2.0, -1.0]),
        ..NoiseConfig::default()
    };
    let input = table(4);
    let shifted =
        add_noise_with_config(&input, &config, &registry, &mut StdRng::seed_from_u64(0)).unwrap();

    for (a, b) in shifted.rows().iter().zip(input.rows()) {
        assert_eq!(a.x, b.x + 2.0);
        assert_eq!(a.y, b.y - 1.0);
    }
}

#[test]
fn test_custom_state_space_model_through_dispatch() {
    let choice: ModelChoice<dyn StateSpaceModel> =
        ModelChoice::Custom(Box::new(RandomWalk { step_variance: 0.1 }));
    let model = choice
        .resolve(&StateSpaceRegistry::empty(), &FilterConfig::default())
        .unwrap();

    let out = denoise(&table(20), model.as_ref(), 5).unwrap();
    assert_eq!(out.table.len(), 20);
    assert!(out.table.rows().iter().all(|o| o.x.is_finite() && o.y.is_finite()));
}

#[test]
fn test_registered_state_space_model() {
    let mut registry = StateSpaceRegistry::empty();
    registry.register("random_walk", build_random_walk);

    let model = registry.create("random_walk", &FilterConfig::default()).unwrap();
    assert_eq!(model.name(), "random_walk");

    let err = registry
        .create("constant_velocity", &FilterConfig::default())
        .unwrap_err();
    match err {
        TrajectoryError::UnknownModel { name, available } => {
            assert_eq!(name, "constant_velocity");
            assert_eq!(available, vec!["random_walk".to_string()]);
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_custom_noise_model_passed_directly() {
    let model = ConstantShift {
        offset: Vector2::new(0.0, 3.0),
    };
    let out = add_noise(&table(2), &model, &mut StdRng::seed_from_u64(1)).unwrap();
    assert_eq!(out.rows()[1].y, 1.0_f64.cos() + 3.0);
}
