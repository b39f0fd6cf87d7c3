//! Name-to-strategy registries
//!
//! Registries are ordinary values owned by the caller and passed to whatever
//! needs to resolve a model name. There is no process-wide registry.

use std::collections::BTreeMap;
use std::fmt;

use nalgebra::DMatrix;

use crate::common::linalg::matrix_from_rows;
use crate::config::{FilterConfig, NoiseConfig};
use crate::filter::errors::TrajectoryError;
use crate::models::constant_velocity::ConstantVelocity;
use crate::models::noise::{IndependentNoise, NoiseModel, TemporalNoise};
use crate::models::state_space::StateSpaceModel;

/// Builds a noise model from its configuration
pub type NoiseFactory = fn(&NoiseConfig) -> Result<Box<dyn NoiseModel>, TrajectoryError>;

/// Builds a state-space model from its configuration
pub type StateSpaceFactory = fn(&FilterConfig) -> Result<Box<dyn StateSpaceModel>, TrajectoryError>;

/// Either a registry name or a caller-supplied strategy.
///
/// Resolved once when a call starts.
pub enum ModelChoice<M: ?Sized> {
    /// Look the model up by name
    Named(String),
    /// Use this strategy directly
    Custom(Box<M>),
}

impl<M: ?Sized + fmt::Debug> fmt::Debug for ModelChoice<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelChoice::Named(name) => f.debug_tuple("Named").field(name).finish(),
            ModelChoice::Custom(model) => f.debug_tuple("Custom").field(model).finish(),
        }
    }
}

impl<M: ?Sized> From<&str> for ModelChoice<M> {
    fn from(name: &str) -> Self {
        ModelChoice::Named(name.to_string())
    }
}

impl ModelChoice<dyn NoiseModel> {
    /// Resolve to a concrete noise model
    pub fn resolve(
        self,
        registry: &NoiseRegistry,
        config: &NoiseConfig,
    ) -> Result<Box<dyn NoiseModel>, TrajectoryError> {
        match self {
            ModelChoice::Named(name) => registry.create(&name, config),
            ModelChoice::Custom(model) => Ok(model),
        }
    }
}

impl ModelChoice<dyn StateSpaceModel> {
    /// Resolve to a concrete state-space model
    pub fn resolve(
        self,
        registry: &StateSpaceRegistry,
        config: &FilterConfig,
    ) -> Result<Box<dyn StateSpaceModel>, TrajectoryError> {
        match self {
            ModelChoice::Named(name) => registry.create(&name, config),
            ModelChoice::Custom(model) => Ok(model),
        }
    }
}

/// Registry of noise models
#[derive(Clone)]
pub struct NoiseRegistry {
    factories: BTreeMap<String, NoiseFactory>,
}

impl NoiseRegistry {
    /// Registry with no entries
    pub fn empty() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// Registry with `"independent"` and `"temporal"`
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        registry.register(IndependentNoise::NAME, build_independent);
        registry.register(TemporalNoise::NAME, build_temporal);
        registry
    }

    /// Add or replace an entry
    pub fn register(&mut self, name: &str, factory: NoiseFactory) {
        self.factories.insert(name.to_string(), factory);
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<String> {
        self.factories.keys().cloned().collect()
    }

    /// Build the model registered under `name`
    pub fn create(
        &self,
        name: &str,
        config: &NoiseConfig,
    ) -> Result<Box<dyn NoiseModel>, TrajectoryError> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| TrajectoryError::UnknownModel {
                name: name.to_string(),
                available: self.names(),
            })?;
        factory(config)
    }
}

impl Default for NoiseRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl fmt::Debug for NoiseRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NoiseRegistry")
            .field("models", &self.names())
            .finish()
    }
}

/// Registry of state-space models
#[derive(Clone)]
pub struct StateSpaceRegistry {
    factories: BTreeMap<String, StateSpaceFactory>,
}

impl StateSpaceRegistry {
    /// Registry with no entries
    pub fn empty() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// Registry with `"constant_velocity"`
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        registry.register(ConstantVelocity::NAME, build_constant_velocity);
        registry
    }

    /// Add or replace an entry
    pub fn register(&mut self, name: &str, factory: StateSpaceFactory) {
        self.factories.insert(name.to_string(), factory);
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<String> {
        self.factories.keys().cloned().collect()
    }

    /// Build the model registered under `name`
    pub fn create(
        &self,
        name: &str,
        config: &FilterConfig,
    ) -> Result<Box<dyn StateSpaceModel>, TrajectoryError> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| TrajectoryError::UnknownModel {
                name: name.to_string(),
                available: self.names(),
            })?;
        factory(config)
    }
}

impl Default for StateSpaceRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl fmt::Debug for StateSpaceRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateSpaceRegistry")
            .field("models", &self.names())
            .finish()
    }
}

fn required_matrix(
    rows: &Option<Vec<Vec<f64>>>,
    context: &str,
) -> Result<DMatrix<f64>, TrajectoryError> {
    match rows {
        Some(rows) => matrix_from_rows(rows, context),
        None => Err(TrajectoryError::dimension(context, "2x2", "missing")),
    }
}

fn build_independent(config: &NoiseConfig) -> Result<Box<dyn NoiseModel>, TrajectoryError> {
    let covariance = required_matrix(&config.covariance, "covariance")?;
    let mean = config.mean.clone().unwrap_or_else(|| vec![0.0]);
    Ok(Box::new(IndependentNoise::new(&mean, &covariance)?))
}

fn build_temporal(config: &NoiseConfig) -> Result<Box<dyn NoiseModel>, TrajectoryError> {
    let transition = required_matrix(&config.transition, "transition")?;
    let covariance = required_matrix(&config.covariance, "covariance")?;
    let intercept = config.intercept.clone().unwrap_or_else(|| vec![0.0]);
    Ok(Box::new(TemporalNoise::new(
        &intercept,
        &transition,
        &covariance,
        config.sampling_rate,
    )?))
}

fn build_constant_velocity(
    config: &FilterConfig,
) -> Result<Box<dyn StateSpaceModel>, TrajectoryError> {
    Ok(Box::new(ConstantVelocity::new(&config.error)?))
}
