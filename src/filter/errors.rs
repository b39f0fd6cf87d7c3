//! Error types for noise models, model builders and the Kalman engine
//!
//! Structural problems abort a call through [`TrajectoryError`]. Groups that
//! are too small to filter are not errors; they are reported with an
//! [`InsufficientDataWarning`] and passed through unchanged.

use std::fmt;

use crate::types::GroupId;

/// Errors that can occur while noising or filtering trajectories
#[derive(Debug, Clone, PartialEq)]
pub enum TrajectoryError {
    /// Input could not be interpreted as an observation table
    InputType {
        /// Description of what was wrong with the input
        description: String,
    },

    /// A required matrix is missing, ragged or not the mandated shape
    Dimension {
        /// Which parameter failed (e.g. "covariance", "transition")
        context: String,
        /// Expected shape, e.g. "2x2"
        expected: String,
        /// Shape that was actually supplied
        actual: String,
    },

    /// A matrix expected to be positive definite failed factorization,
    /// or a computation produced non-finite values
    Numerical {
        /// Description of which matrix or step failed
        context: String,
    },

    /// Invalid scalar configuration (e.g. non-positive sampling rate)
    Configuration {
        /// Description of the configuration issue
        description: String,
    },

    /// A model name was not found in the registry it was looked up in
    UnknownModel {
        /// The requested name
        name: String,
        /// Names the registry does know about
        available: Vec<String>,
    },
}

impl TrajectoryError {
    pub(crate) fn dimension(context: &str, expected: &str, actual: impl Into<String>) -> Self {
        TrajectoryError::Dimension {
            context: context.to_string(),
            expected: expected.to_string(),
            actual: actual.into(),
        }
    }

    pub(crate) fn numerical(context: impl Into<String>) -> Self {
        TrajectoryError::Numerical {
            context: context.into(),
        }
    }

    pub(crate) fn configuration(description: impl Into<String>) -> Self {
        TrajectoryError::Configuration {
            description: description.into(),
        }
    }
}

impl fmt::Display for TrajectoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrajectoryError::InputType { description } => {
                write!(f, "Input is not an observation table: {}", description)
            }
            TrajectoryError::Dimension {
                context,
                expected,
                actual,
            } => {
                write!(
                    f,
                    "Dimension error for {}: expected a {} matrix, got shape {}",
                    context, expected, actual
                )
            }
            TrajectoryError::Numerical { context } => {
                write!(f, "Numerical error: {}", context)
            }
            TrajectoryError::Configuration { description } => {
                write!(f, "Configuration error: {}", description)
            }
            TrajectoryError::UnknownModel { name, available } => {
                write!(
                    f,
                    "Unknown model '{}' (available: {})",
                    name,
                    available.join(", ")
                )
            }
        }
    }
}

impl std::error::Error for TrajectoryError {}

/// A group had too few observations to be filtered.
///
/// The group is returned unfiltered; the rest of the call proceeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsufficientDataWarning {
    /// Group that was passed through
    pub group: GroupId,
    /// Number of observations the group had
    pub samples: usize,
    /// Threshold the group failed to exceed
    pub min_samples: usize,
}

impl fmt::Display for InsufficientDataWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "group {} has {} observations (needs more than {}); returned unfiltered",
            self.group, self.samples, self.min_samples
        )
    }
}
