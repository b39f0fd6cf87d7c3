//! Noise and state-space model strategies
//!
//! - [`noise`] - measurement-noise generators ([`NoiseModel`])
//! - [`state_space`] - the parameter contract consumed by the Kalman engine
//! - [`constant_velocity`] - the built-in 2-D constant-velocity model
//! - [`registry`] - name lookup for both families

pub mod constant_velocity;
pub mod noise;
pub mod registry;
pub mod state_space;

pub use constant_velocity::{ConstantVelocity, ConstantVelocityProcessNoise, ConstantVelocityTransition};
pub use noise::{IndependentNoise, NoiseModel, TemporalNoise};
pub use registry::{ModelChoice, NoiseRegistry, StateSpaceRegistry};
pub use state_space::{ConstantMatrix, ParameterBundle, StateSpaceModel, TimeVaryingMatrix};
