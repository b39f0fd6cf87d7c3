//! Shared scenarios for integration tests

use nalgebra::DMatrix;

use trajectory_noise_rs::common::ground_truth::circular_trajectory;
use trajectory_noise_rs::models::IndependentNoise;
use trajectory_noise_rs::types::{GroupId, Observation, ObservationTable};

/// Radius of the reference circle
pub const RADIUS: f64 = 10.0;

/// Points per circle
pub const N_POINTS: usize = 100;

/// `n_groups` noise-free circles with ids `0..n_groups`, concatenated
pub fn circles(n_groups: i64) -> ObservationTable {
    let rows: Vec<Observation> = (0..n_groups)
        .flat_map(|id| circular_trajectory(RADIUS, N_POINTS, id))
        .collect();
    ObservationTable::new(rows)
}

/// Zero-mean Gaussian noise with standard deviation `sigma` per axis
pub fn white_noise(sigma: f64) -> IndependentNoise {
    IndependentNoise::new(&[0.0], &(DMatrix::identity(2, 2) * sigma * sigma))
        .expect("valid covariance")
}

/// Rows of `table` that belong to group `id`
pub fn group_rows(table: &ObservationTable, id: i64) -> Vec<Observation> {
    table
        .rows()
        .iter()
        .filter(|o| o.id == GroupId::from(id))
        .cloned()
        .collect()
}
