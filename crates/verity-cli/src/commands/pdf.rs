//! Pdf command implementation.

use crate::cli::PdfArgs;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use verity_domain::{compute_beta_params, BetaParams};

/// Execute the pdf command.
pub fn execute_pdf(args: PdfArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let resolution = args.resolution.unwrap_or(config.enricher.pdf_resolution);
    let (params, points) = sample(&args, resolution)?;

    println!("{}", formatter.format_pdf(&params, &points)?);
    Ok(())
}

fn sample(args: &PdfArgs, resolution: usize) -> Result<(BetaParams, Vec<(f64, f64)>)> {
    if resolution == 0 {
        return Err(CliError::InvalidInput(
            "--resolution must be positive".to_string(),
        ));
    }

    let rating = args.rating.rating_data()?;
    let params = compute_beta_params(rating.proportion(), args.rating.reviews)?;
    let points = params.pdf(resolution)?.collect();
    Ok((params, points))
}
