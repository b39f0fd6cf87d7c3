//! Temporally correlated measurement noise
//!
//! Residuals follow a first-order vector autoregression
//!
//! ```text
//! ε_1 = ω_1
//! ε_i = c + Θ·ε_{i-1} + ω_i,    ω_i ~ N(0, Σ)
//! ```
//!
//! `Θ` is calibrated at a reference sampling rate (observations per time
//! unit). For data observed at a different cadence it is rescaled with the
//! real matrix power `Θ^(sampling_rate · mean Δt)`.

use nalgebra::{DMatrix, Matrix2, Vector2};
use rand::RngCore;

use super::{draw_gaussian, to_matrix2, NoiseModel};
use crate::common::linalg::{broadcast_pair, cholesky_factor, real_matrix_power_2x2, require_2x2};
use crate::common::stats::{finite_mean, first_differences};
use crate::filter::errors::TrajectoryError;
use crate::types::Observation;

/// Default reference sampling rate (one observation per time unit)
pub const DEFAULT_SAMPLING_RATE: f64 = 1.0;

/// VAR(1) residual process
#[derive(Debug, Clone, PartialEq)]
pub struct TemporalNoise {
    intercept: Vector2<f64>,
    transition: Matrix2<f64>,
    covariance: Matrix2<f64>,
    factor: Matrix2<f64>,
    sampling_rate: f64,
}

impl TemporalNoise {
    /// Registry name
    pub const NAME: &'static str = "temporal";

    /// Create the model.
    ///
    /// `transition` and `covariance` must be 2x2; `covariance` must be
    /// symmetric positive definite; `sampling_rate` must be positive.
    pub fn new(
        intercept: &[f64],
        transition: &DMatrix<f64>,
        covariance: &DMatrix<f64>,
        sampling_rate: f64,
    ) -> Result<Self, TrajectoryError> {
        require_2x2(transition, "transition")?;
        require_2x2(covariance, "covariance")?;
        if !sampling_rate.is_finite() || sampling_rate <= 0.0 {
            return Err(TrajectoryError::configuration(format!(
                "sampling rate must be positive, got {}",
                sampling_rate
            )));
        }
        let intercept = broadcast_pair(intercept, "intercept")?;
        let factor = cholesky_factor(covariance, "covariance")?;

        Ok(Self {
            intercept,
            transition: to_matrix2(transition),
            covariance: to_matrix2(covariance),
            factor: to_matrix2(&factor),
            sampling_rate,
        })
    }

    /// Constant term `c`
    #[inline]
    pub fn intercept(&self) -> Vector2<f64> {
        self.intercept
    }

    /// Transition `Θ` at the reference sampling rate
    #[inline]
    pub fn transition(&self) -> Matrix2<f64> {
        self.transition
    }

    /// Innovation covariance `Σ`
    #[inline]
    pub fn covariance(&self) -> Matrix2<f64> {
        self.covariance
    }

    /// Reference sampling rate
    #[inline]
    pub fn sampling_rate(&self) -> f64 {
        self.sampling_rate
    }

    /// Long-run mean `(I - Θ)⁻¹·c`
    pub fn stationary_mean(&self) -> Result<Vector2<f64>, TrajectoryError> {
        let lhs = Matrix2::identity() - self.transition;
        lhs.try_inverse()
            .map(|inv| inv * self.intercept)
            .ok_or_else(|| TrajectoryError::numerical("I - transition is singular"))
    }

    /// Residual covariance `Σ - Θ·Σ·Θᵀ`
    pub fn residual_covariance(&self) -> Matrix2<f64> {
        self.covariance - self.transition * self.covariance * self.transition.transpose()
    }

    /// `Θ` rescaled to the cadence of `observations`.
    ///
    /// Falls back to `Θ` itself when the cadence cannot be measured (fewer
    /// than two rows or no positive time delta).
    pub fn scaled_transition(
        &self,
        observations: &[Observation],
    ) -> Result<Matrix2<f64>, TrajectoryError> {
        let time: Vec<f64> = observations.iter().map(|o| o.time).collect();
        let exponent = match finite_mean(&first_differences(&time)) {
            Some(dt) if dt > 0.0 => self.sampling_rate * dt,
            _ => return Ok(self.transition),
        };

        let theta = DMatrix::from_column_slice(2, 2, self.transition.as_slice());
        let scaled = real_matrix_power_2x2(&theta, exponent)?;
        Ok(to_matrix2(&scaled))
    }
}

impl NoiseModel for TemporalNoise {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn sample_residuals(
        &self,
        observations: &[Observation],
        rng: &mut dyn RngCore,
    ) -> Result<Vec<Vector2<f64>>, TrajectoryError> {
        let theta = self.scaled_transition(observations)?;
        let zero = Vector2::zeros();

        let mut residuals = Vec::with_capacity(observations.len());
        let mut previous: Option<Vector2<f64>> = None;
        for _ in observations {
            let innovation = draw_gaussian(&zero, &self.factor, rng);
            let current = match previous {
                None => innovation,
                Some(prev) => self.intercept + theta * prev + innovation,
            };
            residuals.push(current);
            previous = Some(current);
        }
        Ok(residuals)
    }
}
