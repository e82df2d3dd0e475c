//! Error taxonomy shared by every fallible operation in the crate.
//!
//! Two kinds of failure abort an operation:
//!
//! - [`SimulationError::InvalidArgument`]: the caller supplied something
//!   unusable (an absent or ragged table, a probability outside `[0, 1]`,
//!   a zero count where a positive one is required, mismatched shapes).
//! - [`SimulationError::InvariantViolation`]: an internal invariant broke,
//!   e.g. an inverse-CDF scan found no index or a histogram bucket has zero
//!   width. These point at a normalization or precision bug in the input
//!   data, and retrying with the same input cannot help.
//!
//! Normalization checks are *not* errors; see
//! [`ValidationFailure`](crate::validate::ValidationFailure).

use thiserror::Error;

/// Failure of a core operation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    /// A required input is absent, out of range, or mis-shaped.
    #[error("invalid argument `{name}`: {reason}")]
    InvalidArgument {
        /// Name of the offending parameter.
        name: &'static str,
        /// Human-readable description of the problem.
        reason: String,
    },
    /// An internal invariant does not hold.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),
}

impl SimulationError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        SimulationError::InvalidArgument {
            name,
            reason: reason.into(),
        }
    }

    pub(crate) fn invariant(msg: impl Into<String>) -> Self {
        SimulationError::InvariantViolation(msg.into())
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SimulationError>;

/// Rejects a probability-like parameter outside the closed unit interval.
pub(crate) fn ensure_probability(name: &'static str, value: f64) -> Result<f64> {
    if value.is_nan() || !(0.0..=1.0).contains(&value) {
        return Err(SimulationError::invalid(
            name,
            format!("{value} should be from 0 to 1 (inclusive)"),
        ));
    }
    Ok(value)
}
