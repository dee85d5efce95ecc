//! Confidence computation module
//!
//! Recasts star ratings as Bernoulli trials ("positive" or not) with a fixed
//! but unknown success probability, then uses the Beta distribution, the
//! conjugate prior of the Bernoulli, to bound that probability.
//!
//! Two input shapes are supported:
//! - an average rating on `[1, 5]`, linearly rescaled to `[0, 1]`
//! - a 5-bucket star histogram, where 4 and 5 stars count as positive
//!
//! Quantiles and densities come from `statrs`.

use crate::{BetaParams, ConfidenceResult, DomainError, Distribution, Estimate, RatingData};
use statrs::distribution::{Beta, Continuous, ContinuousCDF};

/// Confidence level used when none is configured
pub const DEFAULT_CONFIDENCE_LEVEL: f64 = 0.95;

/// Number of density samples handed to plotting collaborators
pub const DEFAULT_PDF_RESOLUTION: usize = 200;

/// Proxy proportion of positive ratings from the average star rating
///
/// `(avg - 1) / 4`. The domain is not validated here: an input outside
/// `[1, 5]` (or NaN) yields a value outside `[0, 1]` (or NaN), which
/// [`confidence_interval`] rejects.
///
/// # Examples
///
/// ```
/// use verity_domain::proportion_from_average;
///
/// assert_eq!(proportion_from_average(3.0), 0.5);
/// ```
pub fn proportion_from_average(average_rating: f64) -> f64 {
    (average_rating - 1.0) / 4.0
}

/// Proportion of 4 and 5 star ratings in a histogram
///
/// No renormalization is performed.
pub fn proportion_from_distribution(distribution: &Distribution) -> f64 {
    let fractions = distribution.fractions();
    fractions[3] + fractions[4]
}

/// Number of positive ratings implied by a proportion
///
/// Validates the shared preconditions of every estimate.
fn count_positive(proportion: f64, review_count: u64) -> Result<u64, DomainError> {
    if review_count == 0 {
        return Err(DomainError::ZeroReviews);
    }
    if !(0.0..=1.0).contains(&proportion) {
        return Err(DomainError::ProportionOutOfRange(proportion));
    }

    let num_positive = (proportion * review_count as f64).floor() as u64;
    Ok(num_positive.min(review_count))
}

/// Derive the Beta posterior parameters for a proportion and review count
///
/// `num_positive = floor(proportion * review_count)`,
/// `alpha = num_positive + 1`, `beta = review_count - num_positive + 1`.
pub fn compute_beta_params(proportion: f64, review_count: u64) -> Result<BetaParams, DomainError> {
    let num_positive = count_positive(proportion, review_count)?;

    // Shapes are summed in f64; `review_count + 1` does not fit in a u64 at the top
    Ok(BetaParams {
        alpha: num_positive as f64 + 1.0,
        beta: (review_count - num_positive) as f64 + 1.0,
        proportion,
        num_positive,
        num_ratings: review_count,
    })
}

/// Exact (Clopper-Pearson) interval on the proportion of positive ratings
///
/// # Arguments
/// * `proportion` - observed share of positive ratings, in `[0, 1]`
/// * `review_count` - number of ratings, must be positive
/// * `confidence_level` - e.g. 0.95
///
/// # Examples
///
/// ```
/// use verity_domain::confidence_interval;
///
/// let ci = confidence_interval(0.9, 1000, 0.95).unwrap();
/// assert!(ci.lower > 0.87 && ci.upper < 0.92);
/// ```
pub fn confidence_interval(
    proportion: f64,
    review_count: u64,
    confidence_level: f64,
) -> Result<ConfidenceResult, DomainError> {
    if !(confidence_level > 0.0 && confidence_level < 1.0) {
        return Err(DomainError::InvalidConfidenceLevel(confidence_level));
    }
    let num_positive = count_positive(proportion, review_count)?;
    clopper_pearson(num_positive, review_count, confidence_level)
}

/// Interval and posterior parameters for either rating shape
pub fn evaluate(
    rating: &RatingData,
    review_count: u64,
    confidence_level: f64,
) -> Result<Estimate, DomainError> {
    let proportion = rating.proportion();
    let result = confidence_interval(proportion, review_count, confidence_level)?;
    let params = compute_beta_params(proportion, review_count)?;
    Ok(Estimate { result, params })
}

fn clopper_pearson(
    successes: u64,
    trials: u64,
    confidence_level: f64,
) -> Result<ConfidenceResult, DomainError> {
    let tail = (1.0 - confidence_level) / 2.0;
    let x = successes as f64;
    let n = trials as f64;
    let proportion = x / n;

    // The quantile is degenerate at the edges (a zero shape parameter)
    let lower = if successes == 0 {
        0.0
    } else {
        beta_quantile(tail, x, n - x + 1.0)?
    };
    let upper = if successes == trials {
        1.0
    } else {
        beta_quantile(1.0 - tail, x + 1.0, n - x)?
    };

    // Inverse CDF rounding must not push a bound past the point estimate
    Ok(ConfidenceResult {
        proportion,
        lower: lower.clamp(0.0, proportion),
        upper: upper.clamp(proportion, 1.0),
    })
}

fn beta_quantile(p: f64, alpha: f64, beta: f64) -> Result<f64, DomainError> {
    // Closed forms for a unit shape: the CDF is x^alpha or 1 - (1 - x)^beta.
    // These are the all-positive and no-positive bounds, where the numeric
    // inverse degrades badly as the other shape grows.
    if beta == 1.0 && alpha > 0.0 {
        return Ok((p.ln() / alpha).exp());
    }
    if alpha == 1.0 && beta > 0.0 {
        return Ok(-((1.0 - p).ln() / beta).exp_m1());
    }

    let dist = Beta::new(alpha, beta).map_err(|_| DomainError::InvalidShape { alpha, beta })?;
    let q = dist.inverse_cdf(p);
    if q.is_finite() {
        Ok(q)
    } else {
        Err(DomainError::QuantileFailed { p, alpha, beta })
    }
}

/// Sample the Beta density at `resolution` evenly spaced points on `[0, 1]`
///
/// Both endpoints are included. The returned iterator computes each point
/// lazily and cannot be restarted; call again for a fresh sequence.
pub fn beta_pdf(alpha: f64, beta: f64, resolution: usize) -> Result<BetaPdf, DomainError> {
    if !(alpha.is_finite() && beta.is_finite() && alpha > 0.0 && beta > 0.0) {
        return Err(DomainError::InvalidShape { alpha, beta });
    }
    let dist = Beta::new(alpha, beta).map_err(|_| DomainError::InvalidShape { alpha, beta })?;

    Ok(BetaPdf {
        dist,
        index: 0,
        resolution,
    })
}

/// Iterator over `(x, density)` pairs produced by [`beta_pdf`]
#[derive(Debug, Clone)]
pub struct BetaPdf {
    dist: Beta,
    index: usize,
    resolution: usize,
}

impl Iterator for BetaPdf {
    type Item = (f64, f64);

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.resolution {
            return None;
        }

        let x = if self.resolution == 1 {
            0.0
        } else {
            self.index as f64 / (self.resolution - 1) as f64
        };
        self.index += 1;

        Some((x, self.dist.pdf(x)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.resolution - self.index;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for BetaPdf {}

#[cfg(test)]
mod tests {
    use super::*;

    fn histogram() -> Distribution {
        Distribution::new([0.05, 0.04, 0.01, 0.10, 0.80])
    }

    #[test]
    fn test_proportion_from_average() {
        assert_eq!(proportion_from_average(1.0), 0.0);
        assert_eq!(proportion_from_average(5.0), 1.0);
        assert_eq!(proportion_from_average(3.0), 0.5);
    }

    #[test]
    fn test_proportion_from_average_nan_propagates() {
        assert!(proportion_from_average(f64::NAN).is_nan());
    }

    #[test]
    fn test_proportion_from_distribution() {
        assert!((proportion_from_distribution(&histogram()) - 0.90).abs() < 1e-12);
    }

    #[test]
    fn test_histogram_interval_example() {
        let proportion = proportion_from_distribution(&histogram());
        let ci = confidence_interval(proportion, 1000, DEFAULT_CONFIDENCE_LEVEL).unwrap();

        assert!((ci.proportion - 0.90).abs() < 1e-9);
        assert!(ci.lower > 0.87 && ci.lower < ci.proportion);
        assert!(ci.upper < 0.92 && ci.upper > ci.proportion);
    }

    #[test]
    fn test_zero_positive_forces_lower_bound() {
        let ci = confidence_interval(0.0, 50, 0.95).unwrap();
        assert_eq!(ci.lower, 0.0);
        assert_eq!(ci.proportion, 0.0);
        assert!(ci.upper > 0.0 && ci.upper < 0.1);
    }

    #[test]
    fn test_all_positive_forces_upper_bound() {
        let ci = confidence_interval(1.0, 50, 0.95).unwrap();
        assert_eq!(ci.upper, 1.0);
        assert_eq!(ci.proportion, 1.0);
        assert!(ci.lower > 0.9 && ci.lower < 1.0);
    }

    #[test]
    fn test_edge_bounds_with_many_reviews() {
        let all = confidence_interval(1.0, 10_000_000, 0.95).unwrap();
        assert_eq!(all.upper, 1.0);
        assert!(all.lower > 0.999_999_6 && all.lower < 1.0);

        let none = confidence_interval(0.0, 10_000_000, 0.95).unwrap();
        assert_eq!(none.lower, 0.0);
        assert!(none.upper > 0.0 && none.upper < 4e-7);
    }

    #[test]
    fn test_unit_shape_quantiles_match_statrs() {
        let tail = 0.025;
        let numeric = Beta::new(20.0, 1.0).unwrap().inverse_cdf(tail);
        assert!((beta_quantile(tail, 20.0, 1.0).unwrap() - numeric).abs() < 1e-6);

        let numeric = Beta::new(1.0, 20.0).unwrap().inverse_cdf(1.0 - tail);
        assert!((beta_quantile(1.0 - tail, 1.0, 20.0).unwrap() - numeric).abs() < 1e-6);

        // 0.025^(1/10)
        let ci = confidence_interval(1.0, 10, 0.95).unwrap();
        assert!((ci.lower - 0.691_503).abs() < 1e-5);
    }

    #[test]
    fn test_beta_params_at_max_review_count() {
        let all = compute_beta_params(1.0, u64::MAX).unwrap();
        assert_eq!(all.num_positive, u64::MAX);
        assert_eq!(all.beta, 1.0);
        assert!(all.alpha > 1.8e19);

        let none = compute_beta_params(0.0, u64::MAX).unwrap();
        assert_eq!(none.num_positive, 0);
        assert_eq!(none.alpha, 1.0);
        assert!(none.beta > 1.8e19);
    }

    #[test]
    fn test_single_review() {
        let ci = confidence_interval(1.0, 1, 0.95).unwrap();
        assert_eq!(ci.upper, 1.0);
        // Beta(1, 1) quantile at 0.025
        assert!((ci.lower - 0.025).abs() < 1e-6);
    }

    #[test]
    fn test_zero_reviews_rejected() {
        assert_eq!(
            confidence_interval(0.5, 0, 0.95),
            Err(DomainError::ZeroReviews)
        );
        assert_eq!(compute_beta_params(0.5, 0), Err(DomainError::ZeroReviews));
    }

    #[test]
    fn test_out_of_range_proportion_rejected() {
        assert!(matches!(
            confidence_interval(1.5, 10, 0.95),
            Err(DomainError::ProportionOutOfRange(_))
        ));
        assert!(matches!(
            confidence_interval(proportion_from_average(f64::NAN), 10, 0.95),
            Err(DomainError::ProportionOutOfRange(_))
        ));
    }

    #[test]
    fn test_invalid_confidence_level_rejected() {
        assert!(matches!(
            confidence_interval(0.5, 10, 1.0),
            Err(DomainError::InvalidConfidenceLevel(_))
        ));
    }

    #[test]
    fn test_interval_narrows_with_evidence() {
        let small = confidence_interval(0.8, 20, 0.95).unwrap();
        let large = confidence_interval(0.8, 2000, 0.95).unwrap();
        assert!(large.width() < small.width());
    }

    #[test]
    fn test_beta_params() {
        let params = compute_beta_params(0.75, 40).unwrap();
        assert_eq!(params.num_positive, 30);
        assert_eq!(params.alpha, 31.0);
        assert_eq!(params.beta, 11.0);
        assert_eq!(params.num_ratings, 40);
    }

    #[test]
    fn test_beta_params_floor() {
        // 0.5 * 7 = 3.5 -> 3
        let params = compute_beta_params(0.5, 7).unwrap();
        assert_eq!(params.num_positive, 3);
        assert_eq!(params.beta, 5.0);
    }

    #[test]
    fn test_evaluate_both_shapes() {
        let coarse = evaluate(&RatingData::Coarse { average_rating: 4.6 }, 500, 0.95).unwrap();
        let refined = evaluate(
            &RatingData::Refined {
                distribution: histogram(),
            },
            500,
            0.95,
        )
        .unwrap();

        assert!((coarse.params.proportion - 0.9).abs() < 1e-9);
        assert!((refined.params.proportion - 0.9).abs() < 1e-9);
        assert!(coarse.result.contains(coarse.result.proportion));
    }

    #[test]
    fn test_beta_pdf_samples() {
        let points: Vec<_> = beta_pdf(3.0, 2.0, DEFAULT_PDF_RESOLUTION).unwrap().collect();
        assert_eq!(points.len(), DEFAULT_PDF_RESOLUTION);
        assert_eq!(points[0].0, 0.0);
        assert_eq!(points[DEFAULT_PDF_RESOLUTION - 1].0, 1.0);
        assert!(points.iter().all(|(_, y)| y.is_finite() && *y >= 0.0));
    }

    #[test]
    fn test_beta_pdf_uniform() {
        let pdf = beta_pdf(1.0, 1.0, 11).unwrap();
        assert_eq!(pdf.len(), 11);
        for (x, y) in pdf.skip(1).take(9) {
            assert!((y - 1.0).abs() < 1e-9, "density at {} was {}", x, y);
        }
    }

    #[test]
    fn test_beta_pdf_is_fresh_each_call() {
        let params = compute_beta_params(0.9, 100).unwrap();
        let mut first = params.pdf(5).unwrap();
        first.next();
        let second = params.pdf(5).unwrap();
        assert_eq!(first.len(), 4);
        assert_eq!(second.len(), 5);
    }

    #[test]
    fn test_beta_pdf_invalid_shape() {
        assert!(matches!(
            beta_pdf(0.0, 1.0, 10),
            Err(DomainError::InvalidShape { .. })
        ));
    }
}
