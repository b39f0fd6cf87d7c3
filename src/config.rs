//! Serializable configuration for the noise and filter entry points
//!
//! Configurations are plain data. They name a model and carry its
//! parameters; the registries in [`crate::models::registry`] turn them into
//! strategy objects.
//!
//! # Example
//!
//! ```
//! use trajectory_noise_rs::config::{FilterConfig, NoiseConfig};
//!
//! let noise = NoiseConfig::from_json(
//!     r#"{"model": "temporal", "intercept": [5.0], "transition": [[0.5, 0.0], [0.0, 0.5]],
//!         "covariance": [[0.1, 0.0], [0.0, 0.1]]}"#,
//! ).unwrap();
//! assert_eq!(noise.sampling_rate, 1.0);
//!
//! let filter = FilterConfig::default();
//! assert_eq!(filter.min_samples, 5);
//! ```

use serde::{Deserialize, Serialize};

use crate::filter::errors::TrajectoryError;
use crate::models::constant_velocity::{ConstantVelocity, DEFAULT_MEASUREMENT_ERROR};
use crate::models::noise::temporal::DEFAULT_SAMPLING_RATE;
use crate::models::noise::IndependentNoise;

/// Groups with this many observations or fewer are not filtered
pub const DEFAULT_MIN_SAMPLES: usize = 5;

fn default_noise_model() -> String {
    IndependentNoise::NAME.to_string()
}

fn default_filter_model() -> String {
    ConstantVelocity::NAME.to_string()
}

fn default_sampling_rate() -> f64 {
    DEFAULT_SAMPLING_RATE
}

fn default_error() -> Vec<f64> {
    vec![DEFAULT_MEASUREMENT_ERROR]
}

fn default_min_samples() -> usize {
    DEFAULT_MIN_SAMPLES
}

/// Noise model selection and parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoiseConfig {
    /// Registry name of the noise model
    #[serde(default = "default_noise_model")]
    pub model: String,
    /// Residual mean (independent model); one value is broadcast
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mean: Option<Vec<f64>>,
    /// Residual or innovation covariance, as rows
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub covariance: Option<Vec<Vec<f64>>>,
    /// VAR(1) intercept (temporal model); one value is broadcast
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intercept: Option<Vec<f64>>,
    /// VAR(1) transition, as rows
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transition: Option<Vec<Vec<f64>>>,
    /// Reference sampling rate of the transition (observations per time unit)
    #[serde(default = "default_sampling_rate")]
    pub sampling_rate: f64,
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            model: default_noise_model(),
            mean: None,
            covariance: Some(vec![vec![1.0, 0.0], vec![0.0, 1.0]]),
            intercept: None,
            transition: None,
            sampling_rate: DEFAULT_SAMPLING_RATE,
        }
    }
}

impl NoiseConfig {
    /// Parse from JSON.
    pub fn from_json(json: &str) -> Result<Self, TrajectoryError> {
        serde_json::from_str(json).map_err(|e| {
            TrajectoryError::configuration(format!("invalid noise configuration: {}", e))
        })
    }

    /// Serialize to JSON string.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

/// State-space model selection and dispatch options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Registry name of the state-space model
    #[serde(default = "default_filter_model")]
    pub model: String,
    /// Measurement error standard deviation per axis; one value is broadcast
    #[serde(default = "default_error")]
    pub error: Vec<f64>,
    /// Groups with at most this many rows are passed through unfiltered
    #[serde(default = "default_min_samples")]
    pub min_samples: usize,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            model: default_filter_model(),
            error: default_error(),
            min_samples: DEFAULT_MIN_SAMPLES,
        }
    }
}

impl FilterConfig {
    /// Parse from JSON.
    pub fn from_json(json: &str) -> Result<Self, TrajectoryError> {
        serde_json::from_str(json).map_err(|e| {
            TrajectoryError::configuration(format!("invalid filter configuration: {}", e))
        })
    }

    /// Serialize to JSON string.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}
