//! Output formatting for the CLI.

use crate::commands::simulate::SimulationReport;
use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use verity_domain::{BetaParams, ConfidenceResult, Estimate, RatingData, Tier};
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format a single interval estimate.
    pub fn format_estimate(
        &self,
        rating: &RatingData,
        reviews: u64,
        confidence_level: f64,
        estimate: &Estimate,
    ) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let average_rating = match rating {
                    RatingData::Coarse { average_rating } => Some(*average_rating),
                    RatingData::Refined { .. } => None,
                };
                let value = serde_json::json!({
                    "tier": rating.tier().as_str(),
                    "reviews": reviews,
                    "average_rating": average_rating,
                    "confidence_level": confidence_level,
                    "proportion": estimate.result.proportion,
                    "lower": estimate.result.lower,
                    "upper": estimate.result.upper,
                    "beta": beta_json(&estimate.params),
                });
                Ok(serde_json::to_string_pretty(&value)?)
            }
            OutputFormat::Table => {
                let mut builder = Builder::default();
                builder.push_record(["Tier", "Level", "Proportion", "Lower", "Upper", "Alpha", "Beta"]);
                builder.push_record([
                    self.colorize_tier(rating.tier()),
                    format!("{:.2}", confidence_level),
                    format!("{:.4}", estimate.result.proportion),
                    format!("{:.4}", estimate.result.lower),
                    format!("{:.4}", estimate.result.upper),
                    format!("{}", estimate.params.alpha),
                    format!("{}", estimate.params.beta),
                ]);

                Ok(format!(
                    "{}\n\n{}",
                    basic_text(rating, reviews, &estimate.result),
                    styled(builder)
                ))
            }
        }
    }

    /// Format sampled posterior density points.
    pub fn format_pdf(&self, params: &BetaParams, points: &[(f64, f64)]) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let points: Vec<serde_json::Value> = points
                    .iter()
                    .map(|(x, density)| serde_json::json!({ "x": x, "density": density }))
                    .collect();
                let value = serde_json::json!({
                    "beta": beta_json(params),
                    "points": points,
                });
                Ok(serde_json::to_string_pretty(&value)?)
            }
            OutputFormat::Table => {
                let mut builder = Builder::default();
                builder.push_record(["x", "density"]);
                for (x, density) in points {
                    builder.push_record([format!("{:.4}", x), format!("{:.6}", density)]);
                }

                let header = self.info(&format!(
                    "Beta({}, {}), peak at {:.4}",
                    params.alpha,
                    params.beta,
                    params.peak_position()
                ));
                Ok(format!("{}\n{}", header, styled(builder)))
            }
        }
    }

    /// Format the outcome of a simulated session.
    pub fn format_simulation(&self, report: &SimulationReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let items: Vec<serde_json::Value> = report
                    .items
                    .iter()
                    .map(|item| {
                        serde_json::json!({
                            "id": item.id.as_str(),
                            "reviews": item.reviews,
                            "state": item.state.as_str(),
                            "tier": item.tier.map(|t| t.as_str()),
                            "renders": item.renders,
                            "interval": item.result.map(|r| serde_json::json!({
                                "proportion": r.proportion,
                                "lower": r.lower,
                                "upper": r.upper,
                            })),
                        })
                    })
                    .collect();
                let m = &report.metrics;
                let value = serde_json::json!({
                    "context": report.context,
                    "items": items,
                    "metrics": {
                        "signals_received": m.signals_received,
                        "signals_coalesced": m.signals_coalesced,
                        "passes_run": m.passes_run,
                        "rendered_coarse": m.rendered_at(Tier::Coarse),
                        "rendered_refined": m.rendered_at(Tier::Refined),
                        "skipped_no_reviews": m.skipped_no_reviews,
                        "coarse_unavailable": m.coarse_unavailable,
                        "refinements_started": m.refinements_started,
                        "refinements_succeeded": m.refinements_succeeded,
                        "refinements_failed": m.refinements_failed,
                        "deferred_by_cap": m.deferred_by_cap,
                    },
                });
                Ok(serde_json::to_string_pretty(&value)?)
            }
            OutputFormat::Table => {
                if report.items.is_empty() {
                    return Ok(self.warning("No items on the page."));
                }

                let mut builder = Builder::default();
                builder.push_record(["ID", "Reviews", "State", "Tier", "Renders", "Interval"]);
                for item in &report.items {
                    let tier = item
                        .tier
                        .map(|t| self.colorize_tier(t))
                        .unwrap_or_else(|| "-".to_string());
                    let interval = item
                        .result
                        .map(|r| format!("{:.3} [{:.3}, {:.3}]", r.proportion, r.lower, r.upper))
                        .unwrap_or_else(|| "-".to_string());
                    builder.push_record([
                        item.id.to_string(),
                        item.reviews.to_string(),
                        item.state.to_string(),
                        tier,
                        item.renders.to_string(),
                        interval,
                    ]);
                }

                Ok(format!(
                    "{}\n{}",
                    styled(builder),
                    self.success(&format!(
                        "Session '{}': {} refined, {} failed, {} passes for {} signals",
                        report.context,
                        report.metrics.refinements_succeeded,
                        report.metrics.refinements_failed,
                        report.metrics.passes_run,
                        report.metrics.signals_received
                    ))
                ))
            }
        }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    fn colorize_tier(&self, tier: Tier) -> String {
        match tier {
            Tier::Coarse => self.colorize(tier.as_str(), "yellow"),
            Tier::Refined => self.colorize(tier.as_str(), "cyan"),
        }
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            "cyan" => text.cyan().to_string(),
            _ => text.to_string(),
        }
    }
}

/// Plain-text summary of an interval, one fact per line.
///
/// The score fragment appears only when an average rating is known.
pub fn basic_text(rating: &RatingData, reviews: u64, result: &ConfidenceResult) -> String {
    let score = match rating {
        RatingData::Coarse { average_rating } => format!("score {}, ", average_rating),
        RatingData::Refined { .. } => String::new(),
    };
    [
        format!("CI for {}n={} is", score, reviews),
        format!("proportion: {}", result.proportion),
        format!("lower: {}", result.lower),
        format!("upper: {}", result.upper),
    ]
    .join("\n")
}

fn beta_json(params: &BetaParams) -> serde_json::Value {
    serde_json::json!({
        "alpha": params.alpha,
        "beta": params.beta,
        "num_positive": params.num_positive,
        "num_ratings": params.num_ratings,
        "peak": params.peak_position(),
    })
}

fn styled(builder: Builder) -> String {
    let mut table = builder.build();
    table
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()));
    table.to_string()
}
