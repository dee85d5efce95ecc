//! Frame-synchronized enrichment scheduler
//!
//! Holds the session's items and the working set of items still at
//! `CoarseReady`. Viewport-change signals schedule at most one partition pass
//! per frame; the pass promotes exactly the visible items to
//! `RefinedPending` and hands them back to the caller for fetching.

use crate::{EnricherConfig, EnricherError, EnrichmentMetrics};
use std::collections::HashMap;
use verity_domain::traits::{GeometryProvider, Renderer};
use verity_domain::{
    is_visible, Distribution, EnrichmentState, FetchError, Item, ItemId, ItemRecord, RatingData,
    Tier,
};

/// Kind of viewport change that triggered a signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewportSignal {
    /// The display surface was resized
    Resize,
    /// The display surface was scrolled
    Scroll,
}

/// What the scheduler did with a signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalOutcome {
    /// A pass is now scheduled for the next frame
    Scheduled,
    /// A pass was already scheduled; the signal was dropped
    Coalesced,
}

/// Enrichment scheduler for one session
///
/// Single-threaded: every method takes `&mut self` and runs to completion,
/// so the `pass_scheduled` flag is the only synchronization needed.
///
/// # Examples
///
/// ```
/// use verity_enricher::{EnricherConfig, EnrichmentScheduler, SignalOutcome, ViewportSignal};
///
/// let mut scheduler = EnrichmentScheduler::new(EnricherConfig::default()).unwrap();
/// assert_eq!(scheduler.signal(ViewportSignal::Scroll), SignalOutcome::Scheduled);
/// assert_eq!(scheduler.signal(ViewportSignal::Scroll), SignalOutcome::Coalesced);
/// ```
#[derive(Debug)]
pub struct EnrichmentScheduler {
    config: EnricherConfig,
    items: HashMap<ItemId, Item>,
    working_set: Vec<ItemId>,
    pass_scheduled: bool,
    in_flight: usize,
    metrics: EnrichmentMetrics,
}

impl EnrichmentScheduler {
    /// Create an empty scheduler
    pub fn new(config: EnricherConfig) -> Result<Self, EnricherError> {
        config.validate()?;
        Ok(Self {
            config,
            items: HashMap::new(),
            working_set: Vec::new(),
            pass_scheduled: false,
            in_flight: 0,
            metrics: EnrichmentMetrics::new(),
        })
    }

    /// Get the configuration
    pub fn config(&self) -> &EnricherConfig {
        &self.config
    }

    /// Get a reference to the current metrics
    pub fn metrics(&self) -> &EnrichmentMetrics {
        &self.metrics
    }

    /// Whether a pass is waiting for the next frame
    pub fn pass_scheduled(&self) -> bool {
        self.pass_scheduled
    }

    /// Items still waiting to be refined
    pub fn working_set(&self) -> &[ItemId] {
        &self.working_set
    }

    /// Refinement fetches started and not yet completed
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Look up a tracked item
    pub fn item(&self, id: &ItemId) -> Option<&Item> {
        self.items.get(id)
    }

    /// Enrichment state of a tracked item
    pub fn state_of(&self, id: &ItemId) -> Option<EnrichmentState> {
        self.items.get(id).map(Item::state)
    }

    /// Register a session's items and render their coarse estimates
    ///
    /// Items with reviews climb `Unenriched → CoarsePending → CoarseReady`
    /// synchronously and join the working set. Items without reviews stay
    /// `Unenriched`; items whose average rating gives no valid estimate stay
    /// `CoarsePending`. Neither is ever refined. Duplicate ids are ignored.
    ///
    /// Returns the number of items added to the working set.
    pub fn admit<R: Renderer>(
        &mut self,
        records: impl IntoIterator<Item = ItemRecord>,
        renderer: &mut R,
    ) -> Result<usize, EnricherError> {
        let mut admitted = 0;

        for record in records {
            if self.items.contains_key(&record.id) {
                tracing::debug!(item = %record.id, "Ignoring duplicate item");
                continue;
            }

            let mut item = Item::from_record(record);
            if !item.has_reviews() {
                self.metrics.skipped_no_reviews += 1;
                self.items.insert(item.id.clone(), item);
                continue;
            }

            item.advance(EnrichmentState::CoarsePending)?;
            match item.estimate(&item.rating, self.config.confidence_level) {
                Ok(estimate) => {
                    item.advance(EnrichmentState::CoarseReady)?;
                    renderer.render(&item.id, &estimate.result, &estimate.params);
                    item.record_estimate(estimate);
                    self.metrics.record_render(Tier::Coarse);
                    self.working_set.push(item.id.clone());
                    admitted += 1;
                }
                Err(e) => {
                    tracing::warn!(item = %item.id, error = %e, "Coarse estimate unavailable");
                    self.metrics.coarse_unavailable += 1;
                }
            }
            self.items.insert(item.id.clone(), item);
        }

        tracing::info!(
            "Admitted {} of {} items for enrichment",
            admitted,
            self.items.len()
        );
        Ok(admitted)
    }

    /// Handle a viewport-change signal
    ///
    /// At most one pass is scheduled per frame; any further signal before
    /// [`run_pass`](Self::run_pass) is dropped.
    pub fn signal(&mut self, signal: ViewportSignal) -> SignalOutcome {
        self.metrics.signals_received += 1;

        if self.pass_scheduled {
            self.metrics.signals_coalesced += 1;
            tracing::trace!(?signal, "Pass already scheduled, coalescing");
            return SignalOutcome::Coalesced;
        }

        self.pass_scheduled = true;
        tracing::debug!(?signal, "Scheduled refinement pass");
        SignalOutcome::Scheduled
    }

    fn has_capacity(&self) -> bool {
        self.config
            .max_in_flight
            .map_or(true, |cap| self.in_flight < cap)
    }

    /// Partition the working set at a frame boundary
    ///
    /// Visible items move to `RefinedPending` before this returns; the caller
    /// must start one distribution fetch per returned id and report it back
    /// through [`complete_refinement`](Self::complete_refinement). Offscreen
    /// items, and visible ones over the in-flight cap, stay in the working set.
    ///
    /// Does nothing unless a pass was scheduled.
    pub fn run_pass<G: GeometryProvider>(&mut self, geometry: &G) -> Vec<ItemId> {
        if !self.pass_scheduled {
            return Vec::new();
        }

        let viewport = geometry.viewport_rect();
        let candidates = std::mem::take(&mut self.working_set);
        let mut still_offscreen = Vec::with_capacity(candidates.len());
        let mut promoted = Vec::new();

        for id in candidates {
            if !is_visible(&geometry.bounding_rect(&id), &viewport) {
                still_offscreen.push(id);
                continue;
            }
            if !self.has_capacity() {
                self.metrics.deferred_by_cap += 1;
                still_offscreen.push(id);
                continue;
            }

            let Some(item) = self.items.get_mut(&id) else {
                tracing::error!(item = %id, "Working set entry has no tracked item");
                continue;
            };
            if let Err(e) = item.advance(EnrichmentState::RefinedPending) {
                tracing::error!(item = %id, error = %e, "Dropping item from working set");
                continue;
            }

            self.in_flight += 1;
            self.metrics.refinements_started += 1;
            promoted.push(id);
        }

        self.working_set = still_offscreen;
        self.pass_scheduled = false;
        self.metrics.passes_run += 1;

        tracing::debug!(
            "Pass promoted {} items, {} still waiting",
            promoted.len(),
            self.working_set.len()
        );
        promoted
    }

    /// Apply the outcome of a distribution fetch
    ///
    /// On success the item becomes `RefinedReady` and its refined estimate is
    /// rendered. On failure it stays `RefinedPending` and keeps showing the
    /// coarse estimate; it is not retried.
    ///
    /// Returns whether a refined estimate was rendered.
    pub fn complete_refinement<R: Renderer>(
        &mut self,
        id: &ItemId,
        outcome: Result<Distribution, FetchError>,
        renderer: &mut R,
    ) -> bool {
        let Some(item) = self.items.get_mut(id) else {
            tracing::warn!(item = %id, "Refinement completed for unknown item");
            return false;
        };
        if item.state() != EnrichmentState::RefinedPending {
            tracing::warn!(item = %id, state = %item.state(), "Ignoring unexpected refinement");
            return false;
        }
        self.in_flight = self.in_flight.saturating_sub(1);

        let distribution = match outcome {
            Ok(distribution) => distribution,
            Err(e) => {
                tracing::warn!(item = %id, error = %e, "Distribution fetch failed, keeping coarse estimate");
                self.metrics.refinements_failed += 1;
                return false;
            }
        };

        let rating = RatingData::Refined { distribution };
        let estimate = match item.estimate(&rating, self.config.confidence_level) {
            Ok(estimate) => estimate,
            Err(e) => {
                tracing::warn!(item = %id, error = %e, "Refined estimate unavailable, keeping coarse estimate");
                self.metrics.refinements_failed += 1;
                return false;
            }
        };

        if let Err(e) = item.advance(EnrichmentState::RefinedReady) {
            tracing::error!(item = %id, error = %e, "Refinement rejected");
            return false;
        }
        item.rating = rating;
        item.record_estimate(estimate);
        renderer.render(id, &estimate.result, &estimate.params);

        self.metrics.refinements_succeeded += 1;
        self.metrics.record_render(Tier::Refined);
        true
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;
    use verity_domain::{BetaParams, ConfidenceResult, Rect};

    struct Silent;

    impl Renderer for Silent {
        fn render(&mut self, _id: &ItemId, _result: &ConfidenceResult, _params: &BetaParams) {}
    }

    struct Column(f64);

    impl GeometryProvider for Column {
        fn bounding_rect(&self, id: &ItemId) -> Rect {
            let index: f64 = id.as_str().parse().unwrap_or(f64::MAX);
            Rect::from_origin(0.0, index * 100.0, 200.0, 99.0)
        }

        fn viewport_rect(&self) -> Rect {
            Rect::from_origin(0.0, self.0, 1000.0, 250.0)
        }
    }

    #[derive(Debug, Clone)]
    enum Step {
        Signal,
        Frame,
        Scroll(f64),
    }

    fn any_step() -> impl Strategy<Value = Step> {
        prop_oneof![
            Just(Step::Signal),
            Just(Step::Frame),
            (0.0f64..2000.0).prop_map(Step::Scroll),
        ]
    }

    proptest! {
        /// Property: every signal either schedules the next pass or is coalesced,
        /// and no item is ever promoted twice
        #[test]
        fn test_signals_account_for_passes(steps in prop::collection::vec(any_step(), 0..60)) {
            let mut scheduler = EnrichmentScheduler::new(EnricherConfig::default()).unwrap();
            let records = (0..20).map(|i| ItemRecord::new(i.to_string(), 4.0, 10));
            scheduler.admit(records, &mut Silent).unwrap();

            let mut geometry = Column(0.0);
            let mut promoted = std::collections::HashSet::new();
            for step in steps {
                match step {
                    Step::Signal => {
                        scheduler.signal(ViewportSignal::Scroll);
                    }
                    Step::Frame => {
                        for id in scheduler.run_pass(&geometry) {
                            prop_assert!(promoted.insert(id));
                        }
                    }
                    Step::Scroll(y) => geometry.0 = y,
                }
            }

            let metrics = scheduler.metrics();
            let pending = usize::from(scheduler.pass_scheduled());
            prop_assert_eq!(
                metrics.signals_received,
                metrics.signals_coalesced + metrics.passes_run + pending
            );
            prop_assert_eq!(promoted.len() + scheduler.working_set().len(), 20);
        }
    }
}
