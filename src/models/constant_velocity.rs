//! Constant-velocity state-space model
//!
//! State: `[x, y, vx, vy]`. Measurements observe position only.
//!
//! Velocity noise is fitted once per group from the spread of the observed
//! speeds, discounted by the part of that spread the measurement error alone
//! would produce.

use nalgebra::{DMatrix, DVector, Vector2};

use crate::common::linalg::{broadcast_pair, cholesky_factor};
use crate::common::stats::{finite_mean, finite_variance, first_differences, safe_ratio};
use crate::filter::errors::TrajectoryError;
use crate::models::state_space::{ParameterBundle, StateSpaceModel, TimeVaryingMatrix};
use crate::types::Observation;

/// Floor applied to fitted velocity variances
pub const MIN_VELOCITY_VARIANCE: f64 = 1e-10;

/// Default measurement error standard deviation per axis
pub const DEFAULT_MEASUREMENT_ERROR: f64 = 0.5;

/// Transition `F(Δt) = [I, Δt·I; 0, I]`
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ConstantVelocityTransition;

impl TimeVaryingMatrix for ConstantVelocityTransition {
    fn at(&self, dt: f64) -> DMatrix<f64> {
        #[rustfmt::skip]
        let f = DMatrix::from_row_slice(4, 4, &[
            1.0, 0.0, dt,  0.0,   // x' = x + dt*vx
            0.0, 1.0, 0.0, dt,    // y' = y + dt*vy
            0.0, 0.0, 1.0, 0.0,   // vx' = vx
            0.0, 0.0, 0.0, 1.0,   // vy' = vy
        ]);
        f
    }
}

/// Process noise from white velocity noise integrated over `Δt`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantVelocityProcessNoise {
    /// Velocity noise variance along x
    pub var_vx: f64,
    /// Velocity noise variance along y
    pub var_vy: f64,
}

impl TimeVaryingMatrix for ConstantVelocityProcessNoise {
    fn at(&self, dt: f64) -> DMatrix<f64> {
        let (qx, qy) = (self.var_vx, self.var_vy);
        let dt2 = dt * dt;
        #[rustfmt::skip]
        let w = DMatrix::from_row_slice(4, 4, &[
            dt2 * qx, 0.0,      dt * qx, 0.0,
            0.0,      dt2 * qy, 0.0,     dt * qy,
            dt * qx,  0.0,      qx,      0.0,
            0.0,      dt * qy,  0.0,     qy,
        ]);
        w
    }
}

/// Constant-velocity model builder
#[derive(Debug, Clone, PartialEq)]
pub struct ConstantVelocity {
    /// Measurement error standard deviation per axis
    error: Vector2<f64>,
}

impl ConstantVelocity {
    /// Registry name
    pub const NAME: &'static str = "constant_velocity";

    /// Create a builder with the given measurement error standard deviation.
    ///
    /// A single value applies to both axes; extra values are ignored.
    pub fn new(error: &[f64]) -> Result<Self, TrajectoryError> {
        let error = broadcast_pair(error, "measurement error")?;
        if error.iter().any(|e| !e.is_finite() || *e <= 0.0) {
            return Err(TrajectoryError::configuration(format!(
                "measurement error must be positive, got ({}, {})",
                error.x, error.y
            )));
        }
        Ok(Self { error })
    }

    /// Measurement error standard deviation per axis
    #[inline]
    pub fn error(&self) -> Vector2<f64> {
        self.error
    }

    /// Measurement matrix `H = [I, 0]`
    pub fn observation_matrix() -> DMatrix<f64> {
        #[rustfmt::skip]
        let h = DMatrix::from_row_slice(2, 4, &[
            1.0, 0.0, 0.0, 0.0,   // z[0] = x
            0.0, 1.0, 0.0, 0.0,   // z[1] = y
        ]);
        h
    }

    /// `Var(speed) - 2·σ²_error / E[Δt]²`, floored
    fn velocity_variance(speed: &[f64], mean_dt: Option<f64>, error_var: f64) -> f64 {
        let speed_var = finite_variance(speed).unwrap_or(0.0);
        let correction = match mean_dt {
            Some(dt) => 2.0 / (dt * dt) * error_var,
            None => f64::INFINITY,
        };
        (speed_var - correction).max(MIN_VELOCITY_VARIANCE)
    }
}

impl Default for ConstantVelocity {
    fn default() -> Self {
        Self {
            error: Vector2::repeat(DEFAULT_MEASUREMENT_ERROR),
        }
    }
}

impl StateSpaceModel for ConstantVelocity {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn build(&self, observations: &[Observation]) -> Result<ParameterBundle, TrajectoryError> {
        if observations.is_empty() {
            return Err(TrajectoryError::InputType {
                description: "constant velocity model needs at least one observation".to_string(),
            });
        }

        let time: Vec<f64> = observations.iter().map(|o| o.time).collect();
        let xs: Vec<f64> = observations.iter().map(|o| o.x).collect();
        let ys: Vec<f64> = observations.iter().map(|o| o.y).collect();

        let delta_t = first_differences(&time);
        let speed_x = safe_ratio(&first_differences(&xs), &delta_t);
        let speed_y = safe_ratio(&first_differences(&ys), &delta_t);
        let mean_dt = finite_mean(&delta_t).filter(|dt| *dt > 0.0);

        let error_var = self.error.component_mul(&self.error);
        let var_vx = Self::velocity_variance(&speed_x, mean_dt, error_var.x);
        let var_vy = Self::velocity_variance(&speed_y, mean_dt, error_var.y);
        for (axis, var_v) in [("x", var_vx), ("y", var_vy)] {
            if var_v <= MIN_VELOCITY_VARIANCE {
                log::warn!(
                    "group {}: velocity variance along {} floored at {:e}; \
                     the filter will barely follow changes in speed",
                    observations[0].id,
                    axis,
                    MIN_VELOCITY_VARIANCE
                );
            }
        }

        let initial_state = DVector::from_vec(vec![
            finite_mean(&xs).unwrap_or(0.0),
            finite_mean(&ys).unwrap_or(0.0),
            finite_mean(&speed_x).unwrap_or(0.0),
            finite_mean(&speed_y).unwrap_or(0.0),
        ]);

        // Off-diagonal sample covariances are dropped on purpose
        let initial_covariance = DMatrix::from_diagonal(&DVector::from_vec(vec![
            finite_variance(&xs).unwrap_or(0.0),
            finite_variance(&ys).unwrap_or(0.0),
            finite_variance(&speed_x).unwrap_or(0.0),
            finite_variance(&speed_y).unwrap_or(0.0),
        ]));

        let measurement_noise = DMatrix::from_diagonal(&DVector::from_vec(vec![
            error_var.x,
            error_var.y,
        ]));
        let measurement_noise_factor = cholesky_factor(&measurement_noise, "measurement noise")?;

        log::debug!(
            "constant velocity fit: n={}, mean_dt={:?}, var_v=({:.3e}, {:.3e})",
            observations.len(),
            mean_dt,
            var_vx,
            var_vy
        );

        Ok(ParameterBundle {
            initial_state,
            initial_covariance,
            transition: Box::new(ConstantVelocityTransition),
            process_noise: Box::new(ConstantVelocityProcessNoise { var_vx, var_vy }),
            control_matrix: DMatrix::zeros(4, 4),
            control_input: DVector::zeros(4),
            observation_matrix: Self::observation_matrix(),
            measurement_noise_factor,
        })
    }
}
