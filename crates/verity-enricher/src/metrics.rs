//! Metrics collection for enrichment sessions

use std::collections::HashMap;
use verity_domain::Tier;

/// Counters collected while a session runs
///
/// Tracks renders per tier, signal coalescing and fetch outcomes.
#[derive(Debug, Clone, Default)]
pub struct EnrichmentMetrics {
    /// Estimates handed to the renderer, per tier
    pub rendered: HashMap<Tier, usize>,

    /// Viewport-change signals received
    pub signals_received: usize,

    /// Signals dropped because a pass was already scheduled
    pub signals_coalesced: usize,

    /// Partition passes run at frame boundaries
    pub passes_run: usize,

    /// Items never estimated because they had no reviews
    pub skipped_no_reviews: usize,

    /// Items whose coarse estimate could not be computed
    pub coarse_unavailable: usize,

    /// Distribution fetches started
    pub refinements_started: usize,

    /// Fetches that produced a refined estimate
    pub refinements_succeeded: usize,

    /// Fetches that failed (item keeps its coarse estimate)
    pub refinements_failed: usize,

    /// Visible items left for a later pass by the in-flight cap
    pub deferred_by_cap: usize,
}

impl EnrichmentMetrics {
    /// Create new empty metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an estimate handed to the renderer
    pub fn record_render(&mut self, tier: Tier) {
        *self.rendered.entry(tier).or_insert(0) += 1;
    }

    /// Renders at a given tier
    pub fn rendered_at(&self, tier: Tier) -> usize {
        self.rendered.get(&tier).copied().unwrap_or(0)
    }

    /// Get total renders across tiers
    pub fn total_rendered(&self) -> usize {
        self.rendered.values().sum()
    }

    /// Fetches started but not yet resolved
    pub fn refinements_outstanding(&self) -> usize {
        self.refinements_started - self.refinements_succeeded - self.refinements_failed
    }

    /// Reset all metrics
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Generate a summary report of metrics
    pub fn summary(&self) -> String {
        let lines = [
            "Enrichment Metrics Summary".to_string(),
            "==========================".to_string(),
            format!(
                "Signals: {} received, {} coalesced",
                self.signals_received, self.signals_coalesced
            ),
            format!("Passes: {}", self.passes_run),
            format!(
                "Rendered: {} coarse, {} refined",
                self.rendered_at(Tier::Coarse),
                self.rendered_at(Tier::Refined)
            ),
            format!(
                "Refinements: {} started, {} succeeded, {} failed, {} deferred",
                self.refinements_started,
                self.refinements_succeeded,
                self.refinements_failed,
                self.deferred_by_cap
            ),
            format!(
                "Skipped: {} without reviews, {} without a coarse estimate",
                self.skipped_no_reviews, self.coarse_unavailable
            ),
        ];

        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = EnrichmentMetrics::new();
        assert_eq!(metrics.total_rendered(), 0);
        assert_eq!(metrics.passes_run, 0);
        assert_eq!(metrics.refinements_outstanding(), 0);
    }

    #[test]
    fn test_record_render() {
        let mut metrics = EnrichmentMetrics::new();
        metrics.record_render(Tier::Coarse);
        metrics.record_render(Tier::Coarse);
        metrics.record_render(Tier::Refined);

        assert_eq!(metrics.rendered_at(Tier::Coarse), 2);
        assert_eq!(metrics.rendered_at(Tier::Refined), 1);
        assert_eq!(metrics.total_rendered(), 3);
    }

    #[test]
    fn test_outstanding_and_reset() {
        let mut metrics = EnrichmentMetrics::new();
        metrics.refinements_started = 5;
        metrics.refinements_succeeded = 2;
        metrics.refinements_failed = 1;
        assert_eq!(metrics.refinements_outstanding(), 2);

        metrics.reset();
        assert_eq!(metrics.refinements_started, 0);
    }

    #[test]
    fn test_summary_mentions_counts() {
        let mut metrics = EnrichmentMetrics::new();
        metrics.signals_received = 7;
        metrics.signals_coalesced = 6;
        let summary = metrics.summary();
        assert!(summary.contains("7 received, 6 coalesced"));
    }
}
