//! Confidence result and Beta parameter value objects

use crate::confidence_computation::{beta_pdf, BetaPdf};
use crate::DomainError;

/// Interval estimate on the true proportion of positive experiences
///
/// Produced by [`crate::confidence_interval`]. All three values lie in
/// `[0, 1]` and satisfy `lower <= proportion <= upper`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfidenceResult {
    /// Point estimate: positive ratings over total ratings
    pub proportion: f64,
    /// Lower bound of the interval
    pub lower: f64,
    /// Upper bound of the interval
    pub upper: f64,
}

impl ConfidenceResult {
    /// Get the width of the interval (uncertainty measure)
    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }

    /// Check if the interval contains a value
    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value <= self.upper
    }
}

/// Parameters of the Beta posterior for one item
///
/// With a uniform Beta(1, 1) prior and `num_positive` successes out of
/// `num_ratings` trials the posterior is
/// `Beta(num_positive + 1, num_ratings - num_positive + 1)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BetaParams {
    /// Posterior alpha, always >= 1
    pub alpha: f64,
    /// Posterior beta, always >= 1
    pub beta: f64,
    /// Proportion the parameters were derived from
    pub proportion: f64,
    /// `floor(proportion * num_ratings)`
    pub num_positive: u64,
    /// Total number of ratings
    pub num_ratings: u64,
}

impl BetaParams {
    /// Position of the observed success rate on `[0, 1]`
    ///
    /// Plots mark this point with their tick.
    pub fn peak_position(&self) -> f64 {
        self.num_positive as f64 / self.num_ratings as f64
    }

    /// Sample the posterior density at `resolution` evenly spaced points
    pub fn pdf(&self, resolution: usize) -> Result<BetaPdf, DomainError> {
        beta_pdf(self.alpha, self.beta, resolution)
    }
}

/// Interval and posterior parameters computed together for one item
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Estimate {
    /// The confidence interval
    pub result: ConfidenceResult,
    /// The Beta posterior parameters
    pub params: BetaParams,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_width_and_contains() {
        let ci = ConfidenceResult {
            proportion: 0.7,
            lower: 0.5,
            upper: 0.9,
        };
        assert!((ci.width() - 0.4).abs() < 1e-12);
        assert!(ci.contains(0.7));
        assert!(ci.contains(0.5));
        assert!(!ci.contains(0.95));
    }

    #[test]
    fn test_peak_position() {
        let params = BetaParams {
            alpha: 31.0,
            beta: 11.0,
            proportion: 0.75,
            num_positive: 30,
            num_ratings: 40,
        };
        assert_eq!(params.peak_position(), 0.75);
    }
}
