//! Per-group dispatch for the noise and Kalman paths
//!
//! Both entry points partition the table by group id, process every group on
//! its own and concatenate the results in order of first appearance.
//!
//! - [`denoise`] filters groups with more than `min_samples` observations and
//!   passes smaller groups through with an [`InsufficientDataWarning`].
//! - [`add_noise`] perturbs every group, with no size gate.

use rand::RngCore;

use crate::config::{FilterConfig, NoiseConfig};
use crate::filter::errors::{InsufficientDataWarning, TrajectoryError};
use crate::filter::kalman::KalmanEngine;
use crate::models::noise::NoiseModel;
use crate::models::registry::{ModelChoice, NoiseRegistry, StateSpaceRegistry};
use crate::models::state_space::StateSpaceModel;
use crate::reporter::{NoOpReporter, StepReporter};
use crate::types::observation::sorted_by_time;
use crate::types::{Observation, ObservationTable};

pub use crate::config::DEFAULT_MIN_SAMPLES;

/// Result of the Kalman path
#[derive(Debug, Clone, PartialEq)]
pub struct DenoiseOutput {
    /// Filtered groups (time-sorted) and passed-through groups (input order)
    pub table: ObservationTable,
    /// One entry per group that was too small to filter
    pub warnings: Vec<InsufficientDataWarning>,
}

fn require_finite_times(table: &ObservationTable) -> Result<(), TrajectoryError> {
    match table.rows().iter().position(|o| !o.time.is_finite()) {
        Some(row) => Err(TrajectoryError::InputType {
            description: format!("row {} has a non-finite time", row),
        }),
        None => Ok(()),
    }
}

/// Kalman-filter every group of `table` with `model`.
pub fn denoise(
    table: &ObservationTable,
    model: &dyn StateSpaceModel,
    min_samples: usize,
) -> Result<DenoiseOutput, TrajectoryError> {
    denoise_with_reporter(table, model, min_samples, &mut NoOpReporter)
}

/// [`denoise`] with a reporter receiving every step and group event.
pub fn denoise_with_reporter(
    table: &ObservationTable,
    model: &dyn StateSpaceModel,
    min_samples: usize,
    reporter: &mut dyn StepReporter,
) -> Result<DenoiseOutput, TrajectoryError> {
    require_finite_times(table)?;

    let mut rows: Vec<Observation> = Vec::with_capacity(table.len());
    let mut warnings = Vec::new();

    for (group, observations) in table.partition() {
        if observations.len() <= min_samples {
            let warning = InsufficientDataWarning {
                group,
                samples: observations.len(),
                min_samples,
            };
            log::warn!("{}", warning);
            reporter.on_insufficient_data(&warning);
            warnings.push(warning);
            rows.extend(observations);
            continue;
        }

        let sorted = sorted_by_time(&observations);
        let params = model.build(&sorted)?;
        let run = KalmanEngine::new(&params)?.run_with_reporter(&sorted, reporter)?;
        log::debug!(
            "Filtered group {} with {}: {} observations",
            group,
            model.name(),
            sorted.len()
        );
        reporter.on_group_complete(&group, &run);
        rows.extend(run.estimates);
    }

    Ok(DenoiseOutput {
        table: ObservationTable::new(rows),
        warnings,
    })
}

/// Resolve the configured state-space model and run [`denoise`].
pub fn denoise_with_config(
    table: &ObservationTable,
    config: &FilterConfig,
    registry: &StateSpaceRegistry,
) -> Result<DenoiseOutput, TrajectoryError> {
    denoise_with_choice(
        table,
        ModelChoice::Named(config.model.clone()),
        config,
        registry,
    )
}

/// Resolve `choice` once, then run [`denoise`] with `config.min_samples`.
///
/// `config.model` is ignored; a named choice is looked up in `registry` and
/// built from `config`.
pub fn denoise_with_choice(
    table: &ObservationTable,
    choice: ModelChoice<dyn StateSpaceModel>,
    config: &FilterConfig,
    registry: &StateSpaceRegistry,
) -> Result<DenoiseOutput, TrajectoryError> {
    let model = choice.resolve(registry, config)?;
    denoise(table, model.as_ref(), config.min_samples)
}

/// Perturb every group of `table` with `model`.
///
/// Residuals are drawn along each group's time order and written back to the
/// rows they belong to, so rows keep their order within the group. Groups
/// draw from `rng` one after another.
pub fn add_noise(
    table: &ObservationTable,
    model: &dyn NoiseModel,
    rng: &mut dyn RngCore,
) -> Result<ObservationTable, TrajectoryError> {
    let mut rows: Vec<Observation> = Vec::with_capacity(table.len());

    for (group, observations) in table.partition() {
        let mut order: Vec<usize> = (0..observations.len()).collect();
        order.sort_by(|&a, &b| observations[a].time.total_cmp(&observations[b].time));
        let in_time_order: Vec<Observation> =
            order.iter().map(|&i| observations[i].clone()).collect();

        let residuals = model.sample_residuals(&in_time_order, &mut *rng)?;

        let mut noisy = observations;
        for (&i, e) in order.iter().zip(&residuals) {
            let moved = noisy[i].moved_to(noisy[i].x + e.x, noisy[i].y + e.y);
            noisy[i] = moved;
        }
        log::debug!(
            "Noised group {} with {}: {} observations",
            group,
            model.name(),
            noisy.len()
        );
        rows.extend(noisy);
    }

    Ok(ObservationTable::new(rows))
}

/// Resolve the configured noise model and run [`add_noise`].
pub fn add_noise_with_config(
    table: &ObservationTable,
    config: &NoiseConfig,
    registry: &NoiseRegistry,
    rng: &mut dyn RngCore,
) -> Result<ObservationTable, TrajectoryError> {
    add_noise_with_choice(
        table,
        ModelChoice::Named(config.model.clone()),
        config,
        registry,
        rng,
    )
}

/// Resolve `choice` once, then run [`add_noise`].
///
/// Resolution happens before any draw, so a failed lookup or an invalid
/// configuration leaves `rng` untouched.
pub fn add_noise_with_choice(
    table: &ObservationTable,
    choice: ModelChoice<dyn NoiseModel>,
    config: &NoiseConfig,
    registry: &NoiseRegistry,
    rng: &mut dyn RngCore,
) -> Result<ObservationTable, TrajectoryError> {
    let model = choice.resolve(registry, config)?;
    add_noise(table, model.as_ref(), rng)
}
