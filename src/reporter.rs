//! Observability for filter execution.
//!
//! This module provides the [`StepReporter`] trait for debugging and research
//! instrumentation. Reporters receive callbacks at key points of a Kalman run
//! and of group dispatch without touching the core algorithm.
//!
//! The default [`NoOpReporter`] has empty callbacks that compile away.
//!
//! # Example
//!
//! ```
//! use trajectory_noise_rs::filter::KalmanEngine;
//! use trajectory_noise_rs::models::{ConstantVelocity, StateSpaceModel};
//! use trajectory_noise_rs::reporter::DebugReporter;
//! use trajectory_noise_rs::types::Observation;
//!
//! let obs: Vec<Observation> = (0..10)
//!     .map(|i| Observation::new(i as f64, i as f64, 0.0))
//!     .collect();
//! let params = ConstantVelocity::default().build(&obs).unwrap();
//!
//! let mut reporter = DebugReporter::new();
//! KalmanEngine::new(&params).unwrap().run_with_reporter(&obs, &mut reporter).unwrap();
//! assert_eq!(reporter.update_events().len(), 10);
//! ```

use crate::filter::errors::InsufficientDataWarning;
use crate::filter::kalman::{FilterRun, FilterState, Innovation};
use crate::types::GroupId;

// ============================================================================
// StepReporter Trait
// ============================================================================

/// Observability trait for filter step execution.
///
/// All methods have default empty implementations, so you only need
/// to override the events you care about. Callbacks receive references;
/// clone inside the callback if the data must outlive it.
///
/// # Example
///
/// ```
/// use trajectory_noise_rs::filter::kalman::FilterState;
/// use trajectory_noise_rs::reporter::StepReporter;
///
/// struct CountingReporter {
///     updates: usize,
/// }
///
/// impl StepReporter for CountingReporter {
///     fn on_update(&mut self, _step: usize, _state: &FilterState) {
///         self.updates += 1;
///     }
/// }
/// ```
pub trait StepReporter {
    /// Called after the state is propagated to observation `step`.
    ///
    /// Not called for the first observation of a group.
    fn on_prediction(&mut self, _step: usize, _predicted: &FilterState) {}

    /// Called after the residual, its covariance and the gain are computed.
    fn on_innovation(&mut self, _step: usize, _innovation: &Innovation) {}

    /// Called after the measurement update of observation `step`.
    fn on_update(&mut self, _step: usize, _updated: &FilterState) {}

    /// Called once a group has been filtered.
    fn on_group_complete(&mut self, _group: &GroupId, _run: &FilterRun) {}

    /// Called when a group is passed through unfiltered.
    fn on_insufficient_data(&mut self, _warning: &InsufficientDataWarning) {}
}

// ============================================================================
// NoOpReporter
// ============================================================================

/// Zero-cost reporter that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpReporter;

impl NoOpReporter {
    /// Create a new no-op reporter.
    pub fn new() -> Self {
        Self
    }
}

impl StepReporter for NoOpReporter {}

// ============================================================================
// DebugReporter
// ============================================================================

/// Reporter that captures all events for debugging.
///
/// Stores clones of every state and innovation, so memory grows with the
/// number of observations filtered.
#[derive(Debug, Clone, Default)]
pub struct DebugReporter {
    /// (step, predicted state)
    predictions: Vec<(usize, FilterState)>,

    /// (step, innovation)
    innovations: Vec<(usize, Innovation)>,

    /// (step, updated state)
    updates: Vec<(usize, FilterState)>,

    /// Completed groups
    groups: Vec<(GroupId, FilterRun)>,

    /// Groups passed through unfiltered
    warnings: Vec<InsufficientDataWarning>,
}

impl DebugReporter {
    /// Create a new debug reporter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all captured events.
    pub fn clear(&mut self) {
        self.predictions.clear();
        self.innovations.clear();
        self.updates.clear();
        self.groups.clear();
        self.warnings.clear();
    }

    /// Get captured prediction events.
    pub fn prediction_events(&self) -> &[(usize, FilterState)] {
        &self.predictions
    }

    /// Get captured innovation events.
    pub fn innovation_events(&self) -> &[(usize, Innovation)] {
        &self.innovations
    }

    /// Get captured update events.
    pub fn update_events(&self) -> &[(usize, FilterState)] {
        &self.updates
    }

    /// Get completed groups.
    pub fn group_events(&self) -> &[(GroupId, FilterRun)] {
        &self.groups
    }

    /// Get insufficient-data warnings.
    pub fn warnings(&self) -> &[InsufficientDataWarning] {
        &self.warnings
    }

    /// Total number of captured events across all types.
    pub fn total_events(&self) -> usize {
        self.predictions.len()
            + self.innovations.len()
            + self.updates.len()
            + self.groups.len()
            + self.warnings.len()
    }
}

impl StepReporter for DebugReporter {
    fn on_prediction(&mut self, step: usize, predicted: &FilterState) {
        self.predictions.push((step, predicted.clone()));
    }

    fn on_innovation(&mut self, step: usize, innovation: &Innovation) {
        self.innovations.push((step, innovation.clone()));
    }

    fn on_update(&mut self, step: usize, updated: &FilterState) {
        self.updates.push((step, updated.clone()));
    }

    fn on_group_complete(&mut self, group: &GroupId, run: &FilterRun) {
        self.groups.push((group.clone(), run.clone()));
    }

    fn on_insufficient_data(&mut self, warning: &InsufficientDataWarning) {
        self.warnings.push(warning.clone());
    }
}

// ============================================================================
// LoggingReporter
// ============================================================================

/// Reporter that emits events through the `log` crate.
///
/// # Log Levels
///
/// - `on_group_complete`: INFO
/// - `on_insufficient_data`: DEBUG (the dispatcher already warns)
/// - `on_prediction`, `on_innovation`, `on_update`: TRACE
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingReporter {
    /// Whether to include state vectors in step messages
    verbose: bool,
}

impl LoggingReporter {
    /// Create a new logging reporter.
    pub fn new() -> Self {
        Self { verbose: false }
    }

    /// Create a verbose logging reporter that includes state details.
    pub fn verbose() -> Self {
        Self { verbose: true }
    }
}

impl StepReporter for LoggingReporter {
    fn on_prediction(&mut self, step: usize, predicted: &FilterState) {
        if self.verbose {
            log::trace!("Step {} predicted: mean={:?}", step, predicted.mean.as_slice());
        } else {
            log::trace!("Step {} predicted", step);
        }
    }

    fn on_innovation(&mut self, step: usize, innovation: &Innovation) {
        log::trace!(
            "Step {} innovation: |y|={:.4}",
            step,
            innovation.residual.norm()
        );
    }

    fn on_update(&mut self, step: usize, updated: &FilterState) {
        if self.verbose {
            log::trace!("Step {} updated: mean={:?}", step, updated.mean.as_slice());
        } else {
            log::trace!("Step {} updated", step);
        }
    }

    fn on_group_complete(&mut self, group: &GroupId, run: &FilterRun) {
        log::info!(
            "Group {} filtered: {} observations, log-likelihood={:.3}",
            group,
            run.estimates.len(),
            run.log_likelihood
        );
    }

    fn on_insufficient_data(&mut self, warning: &InsufficientDataWarning) {
        log::debug!("Pass-through: {}", warning);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{DMatrix, DVector};

    fn state() -> FilterState {
        FilterState {
            mean: DVector::from_vec(vec![1.0, 2.0]),
            covariance: DMatrix::identity(2, 2),
        }
    }

    fn innovation() -> Innovation {
        Innovation {
            residual: DVector::from_vec(vec![0.5, -0.5]),
            covariance: DMatrix::identity(2, 2) * 2.0,
            gain: DMatrix::identity(2, 2) * 0.5,
        }
    }

    #[test]
    fn test_noop_reporter() {
        let mut reporter = NoOpReporter::new();
        reporter.on_prediction(1, &state());
        reporter.on_innovation(1, &innovation());
        reporter.on_update(1, &state());
    }

    #[test]
    fn test_logging_reporter_levels() {
        let mut quiet = LoggingReporter::new();
        let mut verbose = LoggingReporter::verbose();
        for reporter in [&mut quiet, &mut verbose] {
            reporter.on_prediction(1, &state());
            reporter.on_innovation(1, &innovation());
            reporter.on_update(1, &state());
        }
        assert_ne!(format!("{:?}", quiet), format!("{:?}", verbose));
    }

    #[test]
    fn test_debug_reporter_captures_events() {
        let mut reporter = DebugReporter::new();
        assert_eq!(reporter.total_events(), 0);

        reporter.on_prediction(1, &state());
        reporter.on_innovation(1, &innovation());
        reporter.on_update(1, &state());
        reporter.on_insufficient_data(&InsufficientDataWarning {
            group: GroupId::Int(4),
            samples: 2,
            min_samples: 5,
        });

        assert_eq!(reporter.prediction_events().len(), 1);
        assert_eq!(reporter.innovation_events()[0].1.gain[(0, 0)], 0.5);
        assert_eq!(reporter.update_events()[0].1.mean[1], 2.0);
        assert_eq!(reporter.warnings()[0].group, GroupId::Int(4));
        assert_eq!(reporter.total_events(), 4);

        reporter.clear();
        assert_eq!(reporter.total_events(), 0);
    }
}
