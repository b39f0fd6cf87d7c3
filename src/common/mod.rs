//! Common utilities shared by the noise models and the Kalman engine.
//!
//! Linear algebra helpers, NaN-aware statistics, evaluation metrics and
//! synthetic ground-truth trajectories.

pub mod ground_truth;
pub mod linalg;
pub mod metrics;
pub mod stats;
