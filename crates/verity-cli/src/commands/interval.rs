//! Interval command implementation.

use crate::cli::IntervalArgs;
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use verity_domain::{evaluate, Estimate, RatingData};

/// Execute the interval command.
pub fn execute_interval(args: IntervalArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let level = args.level.unwrap_or(config.enricher.confidence_level);
    let (rating, estimate) = interval_for(&args, level)?;
    let reviews = args.rating.reviews;
    tracing::debug!(tier = %rating.tier(), reviews, level, "Computed interval");

    println!(
        "{}",
        formatter.format_estimate(&rating, reviews, level, &estimate)?
    );
    Ok(())
}

fn interval_for(args: &IntervalArgs, level: f64) -> Result<(RatingData, Estimate)> {
    let rating = args.rating.rating_data()?;
    let estimate = evaluate(&rating, args.rating.reviews, level)?;
    Ok((rating, estimate))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::RatingArgs;
    use crate::error::CliError;
    use verity_domain::DomainError;

    fn args(reviews: u64, rating: Option<f64>, dist: Option<Vec<f64>>) -> IntervalArgs {
        IntervalArgs {
            rating: RatingArgs {
                reviews,
                rating,
                dist,
            },
            level: None,
        }
    }

    #[test]
    fn test_interval_from_average() {
        let (rating, estimate) = interval_for(&args(1000, Some(4.6), None), 0.95).unwrap();
        assert_eq!(rating, RatingData::Coarse { average_rating: 4.6 });
        assert!((estimate.result.proportion - 0.9).abs() < 0.002);
        assert!(estimate.result.lower < 0.9 && estimate.result.upper > 0.9);
    }

    #[test]
    fn test_wider_level_gives_wider_interval() {
        let a = args(80, None, Some(vec![0.1, 0.1, 0.1, 0.2, 0.5]));
        let (_, narrow) = interval_for(&a, 0.8).unwrap();
        let (_, wide) = interval_for(&a, 0.99).unwrap();
        assert!(wide.result.width() > narrow.result.width());
    }

    #[test]
    fn test_zero_reviews_rejected() {
        let result = interval_for(&args(0, Some(4.0), None), 0.95);
        assert!(matches!(
            result,
            Err(CliError::Domain(DomainError::ZeroReviews))
        ));
    }
}
