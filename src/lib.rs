/*!
# trajectory-noise-rs - trajectory noising and Kalman denoising

Tools for studying measurement error in 2-D movement data: inject
realistic noise into clean trajectories, and remove noise from observed
ones with a linear Kalman filter built from a constant-velocity model.

## Features

- Independent (i.i.d. Gaussian) and temporally correlated (VAR(1)) noise
- Constant-velocity state-space model fitted per trajectory
- Per-group dispatch with pass-through of groups too small to filter
- Name-based registries with caller-supplied custom strategies

## Modules

- [`types`] - Observation records and tables
- [`models`] - Noise models, state-space models and registries
- [`filter`] - Kalman engine and error types
- [`dispatch`] - Group-wise entry points
- [`reporter`] - Step-level observability
- [`config`] - Serializable configuration
- [`common`] - Low-level utilities

## Example

```rust
use trajectory_noise_rs::common::ground_truth::circular_trajectory;
use trajectory_noise_rs::dispatch::{add_noise, denoise};
use trajectory_noise_rs::models::{ConstantVelocity, IndependentNoise};
use trajectory_noise_rs::types::ObservationTable;
use nalgebra::DMatrix;
use rand::rngs::StdRng;
use rand::SeedableRng;

let truth = ObservationTable::new(circular_trajectory(10.0, 100, 1_i64));
let noise = IndependentNoise::new(&[0.0], &DMatrix::identity(2, 2)).unwrap();

let mut rng = StdRng::seed_from_u64(42);
let noisy = add_noise(&truth, &noise, &mut rng).unwrap();
let filtered = denoise(&noisy, &ConstantVelocity::default(), 5).unwrap();
assert_eq!(filtered.table.len(), 100);
```
*/

// ============================================================================
// Core modules
// ============================================================================

/// Observation records and tables
pub mod types;

/// Noise models, state-space models and registries
pub mod models;

/// Kalman engine and error types
pub mod filter;

/// Group-wise entry points for noising and denoising
pub mod dispatch;

/// Step-level observability hooks
pub mod reporter;

/// Serializable configuration
pub mod config;

/// Low-level utilities (linear algebra, statistics, metrics)
pub mod common;

// ============================================================================
// Re-exports for convenience
// ============================================================================

// Data
pub use types::{GroupId, Observation, ObservationTable};

// Errors
pub use filter::{InsufficientDataWarning, TrajectoryError};

// Engine
pub use filter::{FilterRun, KalmanEngine};

// Strategies
pub use models::{
    ConstantVelocity, IndependentNoise, ModelChoice, NoiseModel, NoiseRegistry, StateSpaceModel,
    StateSpaceRegistry, TemporalNoise,
};

// Dispatch
pub use dispatch::{add_noise, denoise, DenoiseOutput};

// Configuration
pub use config::{FilterConfig, NoiseConfig};

// Reporters
pub use reporter::{DebugReporter, LoggingReporter, NoOpReporter, StepReporter};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
