//! Linear Kalman filter engine
//!
//! Runs predict / innovate / update over one group's time-ordered
//! observations using the parameters of a [`ParameterBundle`]. The engine
//! holds no state between runs.

use nalgebra::{DMatrix, DVector};

use crate::common::linalg::{covariance_from_factor, log_gaussian_pdf, symmetrize};
use crate::filter::errors::TrajectoryError;
use crate::models::state_space::ParameterBundle;
use crate::reporter::{NoOpReporter, StepReporter};
use crate::types::Observation;

/// Gaussian state estimate
#[derive(Debug, Clone, PartialEq)]
pub struct FilterState {
    /// State mean
    pub mean: DVector<f64>,
    /// State covariance
    pub covariance: DMatrix<f64>,
}

/// Measurement residual and the quantities derived from it
#[derive(Debug, Clone, PartialEq)]
pub struct Innovation {
    /// `y = z - H·x_pred`
    pub residual: DVector<f64>,
    /// `S = H·P_pred·Hᵀ + R`
    pub covariance: DMatrix<f64>,
    /// `K = P_pred·Hᵀ·S⁻¹`
    pub gain: DMatrix<f64>,
}

/// Result of filtering one group
#[derive(Debug, Clone, PartialEq)]
pub struct FilterRun {
    /// Filtered positions, one per input observation, in input order
    pub estimates: Vec<Observation>,
    /// State after the last update
    pub final_state: FilterState,
    /// Sum of innovation log-densities `log N(y_i; 0, S_i)`
    pub log_likelihood: f64,
}

/// Kalman filter bound to one parameter bundle
#[derive(Debug)]
pub struct KalmanEngine<'a> {
    params: &'a ParameterBundle,
    /// `R` reconstructed from its Cholesky factor
    measurement_covariance: DMatrix<f64>,
}

impl<'a> KalmanEngine<'a> {
    /// Validate the bundle and prepare the engine.
    pub fn new(params: &'a ParameterBundle) -> Result<Self, TrajectoryError> {
        params.validate()?;
        let measurement_covariance = covariance_from_factor(&params.measurement_noise_factor);
        Ok(Self {
            params,
            measurement_covariance,
        })
    }

    /// Measurement noise covariance `R`
    pub fn measurement_covariance(&self) -> &DMatrix<f64> {
        &self.measurement_covariance
    }

    /// `(x0, P0)` from the bundle
    pub fn initial_state(&self) -> FilterState {
        FilterState {
            mean: self.params.initial_state.clone(),
            covariance: self.params.initial_covariance.clone(),
        }
    }

    /// Propagate `state` forward by `dt`.
    pub fn predict(&self, state: &FilterState, dt: f64) -> FilterState {
        let f = self.params.transition.at(dt);
        let w = self.params.process_noise.at(dt);
        let control = &self.params.control_matrix * &self.params.control_input;

        let mean = &f * &state.mean + control;
        let covariance = &f * &state.covariance * f.transpose() + w;
        FilterState {
            mean,
            covariance: symmetrize(&covariance),
        }
    }

    /// Compare the predicted state with measurement `z`.
    pub fn innovate(
        &self,
        predicted: &FilterState,
        z: &DVector<f64>,
    ) -> Result<Innovation, TrajectoryError> {
        let h = &self.params.observation_matrix;
        let residual = z - h * &predicted.mean;
        let s = symmetrize(&(h * &predicted.covariance * h.transpose() + &self.measurement_covariance));

        // K = P·Hᵀ·S⁻¹ = (S⁻¹·H·P)ᵀ for symmetric P and S
        let gain = match s.clone().cholesky() {
            Some(chol) => chol.solve(&(h * &predicted.covariance)).transpose(),
            None => match s.clone().try_inverse() {
                Some(s_inv) => &predicted.covariance * h.transpose() * s_inv,
                None => {
                    return Err(TrajectoryError::numerical(
                        "innovation covariance is not invertible",
                    ))
                }
            },
        };

        Ok(Innovation {
            residual,
            covariance: s,
            gain,
        })
    }

    /// Correct the predicted state with an innovation.
    pub fn update(&self, predicted: &FilterState, innovation: &Innovation) -> FilterState {
        let n = predicted.mean.len();
        let mean = &predicted.mean + &innovation.gain * &innovation.residual;
        let i_minus_kh =
            DMatrix::identity(n, n) - &innovation.gain * &self.params.observation_matrix;
        let covariance = i_minus_kh * &predicted.covariance;
        FilterState {
            mean,
            covariance: symmetrize(&covariance),
        }
    }

    /// Filter a time-ordered observation stream.
    pub fn run(&self, observations: &[Observation]) -> Result<FilterRun, TrajectoryError> {
        self.run_with_reporter(observations, &mut NoOpReporter)
    }

    /// Filter a time-ordered observation stream, reporting every step.
    ///
    /// The first observation is innovated against `(x0, P0)` directly; later
    /// ones are predicted forward by their time delta first. Observations
    /// must be sorted by time.
    pub fn run_with_reporter(
        &self,
        observations: &[Observation],
        reporter: &mut dyn StepReporter,
    ) -> Result<FilterRun, TrajectoryError> {
        let h = &self.params.observation_matrix;
        let mut state = self.initial_state();
        let mut estimates = Vec::with_capacity(observations.len());
        let mut log_likelihood = 0.0;

        for (step, obs) in observations.iter().enumerate() {
            let predicted = if step == 0 {
                state
            } else {
                let dt = obs.time - observations[step - 1].time;
                if dt < 0.0 {
                    return Err(TrajectoryError::InputType {
                        description: format!(
                            "observations are not sorted by time (t={} follows t={})",
                            obs.time,
                            observations[step - 1].time
                        ),
                    });
                }
                let predicted = self.predict(&state, dt);
                reporter.on_prediction(step, &predicted);
                predicted
            };

            let z = DVector::from_vec(vec![obs.x, obs.y]);
            let innovation = self.innovate(&predicted, &z)?;
            reporter.on_innovation(step, &innovation);
            log_likelihood += log_gaussian_pdf(
                &innovation.residual,
                &DVector::zeros(innovation.residual.len()),
                &innovation.covariance,
            );

            state = self.update(&predicted, &innovation);
            reporter.on_update(step, &state);

            let position = h * &state.mean;
            if position.iter().any(|v| !v.is_finite()) {
                return Err(TrajectoryError::numerical(format!(
                    "filtered position at step {} is not finite",
                    step
                )));
            }
            estimates.push(obs.moved_to(position[0], position[1]));
        }

        Ok(FilterRun {
            estimates,
            final_state: state,
            log_likelihood,
        })
    }
}
