//! Independent (white) measurement noise
//!
//! Every observation receives its own residual `ε_i ~ N(mean, covariance)`.

use nalgebra::{DMatrix, Matrix2, Vector2};
use rand::RngCore;

use super::{draw_gaussian, to_matrix2, NoiseModel};
use crate::common::linalg::{broadcast_pair, cholesky_factor, require_2x2};
use crate::filter::errors::TrajectoryError;
use crate::types::Observation;

/// i.i.d. multivariate normal residuals
#[derive(Debug, Clone, PartialEq)]
pub struct IndependentNoise {
    mean: Vector2<f64>,
    covariance: Matrix2<f64>,
    factor: Matrix2<f64>,
}

impl IndependentNoise {
    /// Registry name
    pub const NAME: &'static str = "independent";

    /// Create the model.
    ///
    /// `mean` is broadcast from one value or truncated to two. `covariance`
    /// must be a 2x2 symmetric positive definite matrix.
    pub fn new(mean: &[f64], covariance: &DMatrix<f64>) -> Result<Self, TrajectoryError> {
        require_2x2(covariance, "covariance")?;
        let mean = broadcast_pair(mean, "mean")?;
        let factor = cholesky_factor(covariance, "covariance")?;
        Ok(Self {
            mean,
            covariance: to_matrix2(covariance),
            factor: to_matrix2(&factor),
        })
    }

    /// Residual mean
    #[inline]
    pub fn mean(&self) -> Vector2<f64> {
        self.mean
    }

    /// Residual covariance
    #[inline]
    pub fn covariance(&self) -> Matrix2<f64> {
        self.covariance
    }
}

impl NoiseModel for IndependentNoise {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn sample_residuals(
        &self,
        observations: &[Observation],
        rng: &mut dyn RngCore,
    ) -> Result<Vec<Vector2<f64>>, TrajectoryError> {
        Ok(observations
            .iter()
            .map(|_| draw_gaussian(&self.mean, &self.factor, &mut *rng))
            .collect())
    }
}
