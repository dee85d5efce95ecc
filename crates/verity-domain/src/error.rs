//! Error types for the domain layer

use thiserror::Error;

/// Invalid numeric input to the confidence engine
///
/// These are caller bugs: zero-review items must be filtered before any
/// estimation is attempted.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// No ratings, so no proportion can be formed
    #[error("Review count must be positive")]
    ZeroReviews,

    /// Proportion outside [0, 1], including NaN
    #[error("Proportion out of range [0, 1]: {0}")]
    ProportionOutOfRange(f64),

    /// Confidence level outside (0, 1)
    #[error("Confidence level must be in (0, 1): {0}")]
    InvalidConfidenceLevel(f64),

    /// Beta shape parameters that do not describe a distribution
    #[error("Invalid Beta shape: alpha={alpha}, beta={beta}")]
    InvalidShape {
        /// Alpha shape parameter
        alpha: f64,
        /// Beta shape parameter
        beta: f64,
    },

    /// The quantile function returned a non-finite value
    #[error("Beta quantile did not converge (p={p}, alpha={alpha}, beta={beta})")]
    QuantileFailed {
        /// Probability requested
        p: f64,
        /// Alpha shape parameter
        alpha: f64,
        /// Beta shape parameter
        beta: f64,
    },
}

/// Failure reported by a distribution fetcher
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Transport failure
    #[error("Network error: {0}")]
    Network(String),

    /// The item has no histogram available
    #[error("No distribution available: {0}")]
    MissingData(String),

    /// The histogram could not be interpreted
    #[error("Malformed distribution: {0}")]
    Malformed(String),
}
