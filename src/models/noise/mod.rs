//! Measurement-noise models
//!
//! A [`NoiseModel`] draws one 2-D residual per observation and adds it to
//! the true position. Built-in variants:
//!
//! - [`IndependentNoise`] - i.i.d. multivariate normal residuals
//! - [`TemporalNoise`] - VAR(1) residuals correlated across time steps

pub mod independent;
pub mod temporal;

use std::fmt;

use nalgebra::{Matrix2, Vector2};
use rand::RngCore;
use rand_distr::{Distribution, StandardNormal};

use crate::filter::errors::TrajectoryError;
use crate::types::Observation;

pub use independent::IndependentNoise;
pub use temporal::TemporalNoise;

/// Strategy that perturbs observed positions with a stochastic error process
pub trait NoiseModel: fmt::Debug + Send + Sync {
    /// Registry name of this model
    fn name(&self) -> &str;

    /// Draw one residual per observation, in input order
    fn sample_residuals(
        &self,
        observations: &[Observation],
        rng: &mut dyn RngCore,
    ) -> Result<Vec<Vector2<f64>>, TrajectoryError>;

    /// Return a copy of `observations` with residuals added to `(x, y)`
    fn apply(
        &self,
        observations: &[Observation],
        rng: &mut dyn RngCore,
    ) -> Result<Vec<Observation>, TrajectoryError> {
        let residuals = self.sample_residuals(observations, rng)?;
        Ok(observations
            .iter()
            .zip(residuals)
            .map(|(obs, e)| obs.moved_to(obs.x + e.x, obs.y + e.y))
            .collect())
    }
}

/// Convert a validated 2x2 `DMatrix` to a static matrix
#[inline]
pub(crate) fn to_matrix2(m: &nalgebra::DMatrix<f64>) -> Matrix2<f64> {
    Matrix2::new(m[(0, 0)], m[(0, 1)], m[(1, 0)], m[(1, 1)])
}

/// Draw `mean + L·z` with `z ~ N(0, I)`
#[inline]
pub(crate) fn draw_gaussian(
    mean: &Vector2<f64>,
    factor: &Matrix2<f64>,
    rng: &mut dyn RngCore,
) -> Vector2<f64> {
    let z0: f64 = StandardNormal.sample(&mut *rng);
    let z1: f64 = StandardNormal.sample(&mut *rng);
    mean + factor * Vector2::new(z0, z1)
}
