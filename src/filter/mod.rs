//! Kalman filtering and error types
//!
//! - [`KalmanEngine`] - predict / innovate / update over one group
//! - [`TrajectoryError`] - fatal errors shared by the whole crate
//! - [`InsufficientDataWarning`] - non-fatal pass-through notice

pub mod errors;
pub mod kalman;

pub use errors::{InsufficientDataWarning, TrajectoryError};
pub use kalman::{FilterRun, FilterState, Innovation, KalmanEngine};
