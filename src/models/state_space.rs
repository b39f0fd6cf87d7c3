//! State-space model contract
//!
//! A [`StateSpaceModel`] turns one group's observations into the full
//! parameter set of a linear-Gaussian model. Time-varying matrices are value
//! objects evaluated at a time delta rather than closures.

use std::fmt;

use nalgebra::{DMatrix, DVector};

use crate::filter::errors::TrajectoryError;
use crate::types::Observation;

/// A matrix that depends on the time elapsed since the previous observation
pub trait TimeVaryingMatrix: fmt::Debug + Send + Sync {
    /// Evaluate at time delta `dt` (must accept `dt = 0`)
    fn at(&self, dt: f64) -> DMatrix<f64>;
}

/// Matrix that ignores the time delta
#[derive(Debug, Clone, PartialEq)]
pub struct ConstantMatrix(pub DMatrix<f64>);

impl TimeVaryingMatrix for ConstantMatrix {
    fn at(&self, _dt: f64) -> DMatrix<f64> {
        self.0.clone()
    }
}

/// Parameters of a linear-Gaussian state-space model
///
/// Movement: `x_t = F(Δt)·x_{t-1} + B·u + w`, `w ~ N(0, W(Δt))`
/// Measurement: `z_t = H·x_t + v`, `v ~ N(0, R)`
///
/// `measurement_noise_factor` holds the lower Cholesky factor of `R`;
/// `process_noise` evaluates to a covariance.
#[derive(Debug)]
pub struct ParameterBundle {
    /// Initial state mean (x0)
    pub initial_state: DVector<f64>,
    /// Initial state covariance (P0)
    pub initial_covariance: DMatrix<f64>,
    /// State transition F(Δt)
    pub transition: Box<dyn TimeVaryingMatrix>,
    /// Process noise covariance W(Δt)
    pub process_noise: Box<dyn TimeVaryingMatrix>,
    /// Control matrix (B)
    pub control_matrix: DMatrix<f64>,
    /// Control input (u)
    pub control_input: DVector<f64>,
    /// Observation matrix (H)
    pub observation_matrix: DMatrix<f64>,
    /// Cholesky factor of the measurement noise covariance (R)
    pub measurement_noise_factor: DMatrix<f64>,
}

impl ParameterBundle {
    /// State dimension
    #[inline]
    pub fn x_dim(&self) -> usize {
        self.initial_state.len()
    }

    /// Measurement dimension
    #[inline]
    pub fn z_dim(&self) -> usize {
        self.observation_matrix.nrows()
    }

    /// Check that every matrix agrees with the state and measurement dimensions.
    pub fn validate(&self) -> Result<(), TrajectoryError> {
        let n = self.x_dim();
        let m = self.z_dim();
        let check_shape = |context: &str, matrix: &DMatrix<f64>, rows: usize, cols: usize| {
            if matrix.nrows() != rows || matrix.ncols() != cols {
                Err(TrajectoryError::dimension(
                    context,
                    &format!("{}x{}", rows, cols),
                    format!("{}x{}", matrix.nrows(), matrix.ncols()),
                ))
            } else {
                Ok(())
            }
        };

        if m != 2 {
            return Err(TrajectoryError::dimension(
                "observation matrix",
                &format!("2x{}", n),
                format!("{}x{}", m, self.observation_matrix.ncols()),
            ));
        }
        check_shape("initial covariance", &self.initial_covariance, n, n)?;
        check_shape("transition", &self.transition.at(0.0), n, n)?;
        check_shape("process noise", &self.process_noise.at(0.0), n, n)?;
        check_shape("control matrix", &self.control_matrix, n, self.control_input.len())?;
        check_shape("observation matrix", &self.observation_matrix, m, n)?;
        check_shape("measurement noise", &self.measurement_noise_factor, m, m)?;
        Ok(())
    }
}

/// Strategy that derives a [`ParameterBundle`] from one group's observations
pub trait StateSpaceModel: fmt::Debug + Send + Sync {
    /// Registry name of this model
    fn name(&self) -> &str;

    /// Fit the model parameters to a time-ordered, non-empty observation stream
    fn build(&self, observations: &[Observation]) -> Result<ParameterBundle, TrajectoryError>;
}
