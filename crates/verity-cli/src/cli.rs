//! CLI command definitions and argument parsing.

use crate::error::{CliError, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;
use verity_domain::{Distribution, RatingData};

/// Verity CLI - Confidence intervals for star ratings.
#[derive(Debug, Parser)]
#[command(name = "verity")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true, env = "VERITY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Compute the confidence interval for one item
    Interval(IntervalArgs),

    /// Sample the Beta posterior density for one item
    Pdf(PdfArgs),

    /// Run an enrichment session over a page fixture
    Simulate(SimulateArgs),
}

/// Rating data for a single item.
#[derive(Debug, Args)]
pub struct RatingArgs {
    /// Total number of ratings
    #[arg(short = 'n', long)]
    pub reviews: u64,

    /// Average star rating (1-5)
    #[arg(short, long, conflicts_with = "dist", required_unless_present = "dist")]
    pub rating: Option<f64>,

    /// Star histogram as five fractions, 1 star first (e.g. 0.05,0.04,0.01,0.1,0.8)
    #[arg(short, long, value_delimiter = ',')]
    pub dist: Option<Vec<f64>>,
}

impl RatingArgs {
    /// Rating data described by the arguments.
    pub fn rating_data(&self) -> Result<RatingData> {
        match (&self.rating, &self.dist) {
            (_, Some(values)) => {
                let distribution = Distribution::from_slice(values).ok_or_else(|| {
                    CliError::InvalidInput(format!(
                        "--dist needs five non-negative fractions, got {:?}",
                        values
                    ))
                })?;
                Ok(RatingData::Refined { distribution })
            }
            (Some(average_rating), None) => Ok(RatingData::Coarse {
                average_rating: *average_rating,
            }),
            (None, None) => Err(CliError::InvalidInput(
                "either --rating or --dist is required".to_string(),
            )),
        }
    }
}

/// Arguments for the interval command.
#[derive(Debug, Args)]
pub struct IntervalArgs {
    #[command(flatten)]
    pub rating: RatingArgs,

    /// Confidence level in (0, 1); defaults to the configured level
    #[arg(short, long)]
    pub level: Option<f64>,
}

/// Arguments for the pdf command.
#[derive(Debug, Args)]
pub struct PdfArgs {
    #[command(flatten)]
    pub rating: RatingArgs,

    /// Number of sample points; defaults to the configured resolution
    #[arg(long)]
    pub resolution: Option<usize>,
}

/// Arguments for the simulate command.
#[derive(Debug, Args)]
pub struct SimulateArgs {
    /// JSON page fixture
    pub page: PathBuf,

    /// Scroll offsets to visit in order (e.g. 400,800,0)
    #[arg(short, long, value_delimiter = ',')]
    pub scroll: Vec<f64>,

    /// Execution context the session is registered under
    #[arg(long, default_value = "cli")]
    pub context: String,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_command() {
        let cli = Cli::parse_from(["verity", "interval", "-n", "120", "--rating", "4.3"]);
        match cli.command {
            Command::Interval(args) => {
                assert_eq!(args.rating.reviews, 120);
                assert_eq!(
                    args.rating.rating_data().unwrap(),
                    RatingData::Coarse { average_rating: 4.3 }
                );
                assert!(args.level.is_none());
            }
            _ => panic!("Expected Interval command"),
        }
    }

    #[test]
    fn test_dist_is_split_on_commas() {
        let cli = Cli::parse_from([
            "verity",
            "pdf",
            "--reviews",
            "10",
            "--dist",
            "0.1,0.1,0.1,0.2,0.5",
            "--resolution",
            "5",
        ]);
        let Command::Pdf(args) = cli.command else {
            panic!("Expected Pdf command");
        };
        assert_eq!(args.resolution, Some(5));
        assert!(matches!(
            args.rating.rating_data().unwrap(),
            RatingData::Refined { .. }
        ));
    }

    #[test]
    fn test_dist_needs_five_values() {
        let cli = Cli::parse_from(["verity", "interval", "-n", "10", "-d", "0.5,0.5"]);
        let Command::Interval(args) = cli.command else {
            panic!("Expected Interval command");
        };
        assert!(args.rating.rating_data().is_err());
    }

    #[test]
    fn test_rating_and_dist_conflict() {
        let result = Cli::try_parse_from([
            "verity", "interval", "-n", "10", "-r", "4.0", "-d", "0,0,0,0,1",
        ]);
        assert!(result.is_err());

        let result = Cli::try_parse_from(["verity", "interval", "-n", "10"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_simulate_command_with_globals() {
        let cli = Cli::parse_from([
            "verity", "-vv", "--format", "json", "simulate", "page.json", "--scroll", "400,800,0",
        ]);
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.format, Some(CliFormat::Json)));
        let Command::Simulate(args) = cli.command else {
            panic!("Expected Simulate command");
        };
        assert_eq!(args.page, PathBuf::from("page.json"));
        assert_eq!(args.scroll, vec![400.0, 800.0, 0.0]);
        assert_eq!(args.context, "cli");
    }
}
