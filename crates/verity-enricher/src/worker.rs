//! Cooperative worker driving an enrichment session

use crate::scheduler::{EnrichmentScheduler, ViewportSignal};
use crate::EnrichmentMetrics;
use futures::future::{FutureExt, LocalBoxFuture};
use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::mpsc::UnboundedReceiver;
use verity_domain::traits::{DistributionFetcher, FrameScheduler, GeometryProvider, Renderer};
use verity_domain::{Distribution, FetchError, ItemId};

type FetchOutcome = (ItemId, Result<Distribution, FetchError>);

/// Worker that runs one session's scheduler on a single task
///
/// Signals, frame boundaries and fetch completions are multiplexed with
/// `tokio::select!`; nothing runs in parallel. Fetches for promoted items
/// are all polled concurrently with no cap beyond the scheduler's
/// `max_in_flight`.
///
/// # Examples
///
/// ```no_run
/// use verity_enricher::{EnricherConfig, EnrichmentScheduler, EnrichmentWorker, IntervalFrames};
///
/// let config = EnricherConfig::default();
/// let frames = IntervalFrames::new(config.frame_interval());
/// let scheduler = EnrichmentScheduler::new(config).unwrap();
/// let worker = EnrichmentWorker::new(scheduler, frames);
/// assert!(!worker.scheduler().pass_scheduled());
/// ```
pub struct EnrichmentWorker<F> {
    scheduler: EnrichmentScheduler,
    frames: F,
}

impl<F: FrameScheduler> EnrichmentWorker<F> {
    /// Create a worker around an (already admitted) scheduler
    pub fn new(scheduler: EnrichmentScheduler, frames: F) -> Self {
        Self { scheduler, frames }
    }

    /// Get the scheduler
    pub fn scheduler(&self) -> &EnrichmentScheduler {
        &self.scheduler
    }

    /// Get mutable access to the scheduler (e.g. to admit items)
    pub fn scheduler_mut(&mut self) -> &mut EnrichmentScheduler {
        &mut self.scheduler
    }

    /// Get a reference to the scheduler's current metrics
    pub fn metrics(&self) -> &EnrichmentMetrics {
        self.scheduler.metrics()
    }

    /// Run until the signal channel closes and all work has drained
    ///
    /// A pass already scheduled when the channel closes still runs, and every
    /// fetch it starts is awaited. A fetch that never resolves keeps the
    /// worker alive; there is no timeout.
    ///
    /// Per-item problems (failed fetches, unusable estimates) are logged and
    /// counted, never returned.
    pub async fn run<D, G, R>(
        &mut self,
        mut signals: UnboundedReceiver<ViewportSignal>,
        fetcher: &D,
        geometry: &G,
        renderer: &mut R,
    ) where
        D: DistributionFetcher,
        G: GeometryProvider,
        R: Renderer,
    {
        let Self { scheduler, frames } = self;
        let mut in_flight: FuturesUnordered<LocalBoxFuture<'_, FetchOutcome>> =
            FuturesUnordered::new();
        let mut signals_open = true;

        tracing::info!("Enrichment worker started ({} items waiting)", scheduler.working_set().len());

        loop {
            tokio::select! {
                biased;

                signal = signals.recv(), if signals_open => match signal {
                    Some(signal) => {
                        scheduler.signal(signal);
                    }
                    None => {
                        tracing::debug!("Signal channel closed");
                        signals_open = false;
                    }
                },

                Some((id, outcome)) = in_flight.next(), if !in_flight.is_empty() => {
                    scheduler.complete_refinement(&id, outcome, renderer);
                }

                _ = frames.next_frame(), if scheduler.pass_scheduled() => {
                    for id in scheduler.run_pass(geometry) {
                        let fetch = async move {
                            let outcome = fetcher.fetch_distribution(&id).await;
                            (id, outcome)
                        };
                        in_flight.push(fetch.boxed_local());
                    }
                }

                else => break,
            }

            if !signals_open && !scheduler.pass_scheduled() && in_flight.is_empty() {
                break;
            }
        }

        tracing::info!(
            "Enrichment worker stopped. Final metrics:\n{}",
            scheduler.metrics().summary()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EnricherConfig;
    use std::future::Future;
    use tokio::sync::mpsc;
    use verity_domain::{BetaParams, ConfidenceResult, ItemRecord, Rect, Tier};

    /// Frame boundary available immediately
    struct ImmediateFrames;

    impl FrameScheduler for ImmediateFrames {
        fn next_frame(&mut self) -> impl Future<Output = ()> {
            std::future::ready(())
        }
    }

    struct EverythingVisible;

    impl GeometryProvider for EverythingVisible {
        fn bounding_rect(&self, _id: &ItemId) -> Rect {
            Rect::new(10.0, 10.0, 20.0, 20.0)
        }

        fn viewport_rect(&self) -> Rect {
            Rect::new(0.0, 0.0, 100.0, 100.0)
        }
    }

    /// Succeeds for every id except "broken"
    struct FixedFetcher;

    impl DistributionFetcher for FixedFetcher {
        fn fetch_distribution(
            &self,
            id: &ItemId,
        ) -> impl Future<Output = Result<Distribution, FetchError>> {
            let broken = id.as_str() == "broken";
            async move {
                tokio::task::yield_now().await;
                if broken {
                    Err(FetchError::MissingData("no histogram".to_string()))
                } else {
                    Ok(Distribution::new([0.1, 0.1, 0.1, 0.2, 0.5]))
                }
            }
        }
    }

    #[derive(Default)]
    struct CountingRenderer {
        count: usize,
    }

    impl Renderer for CountingRenderer {
        fn render(&mut self, _id: &ItemId, _result: &ConfidenceResult, _params: &BetaParams) {
            self.count += 1;
        }
    }

    fn worker(records: Vec<ItemRecord>, renderer: &mut CountingRenderer) -> EnrichmentWorker<ImmediateFrames> {
        let mut scheduler = EnrichmentScheduler::new(EnricherConfig::default()).unwrap();
        scheduler.admit(records, renderer).unwrap();
        EnrichmentWorker::new(scheduler, ImmediateFrames)
    }

    #[tokio::test]
    async fn test_burst_of_signals_runs_one_pass() {
        let mut renderer = CountingRenderer::default();
        let mut worker = worker(
            vec![ItemRecord::new("a", 4.0, 10), ItemRecord::new("b", 3.0, 30)],
            &mut renderer,
        );

        let (tx, rx) = mpsc::unbounded_channel();
        for _ in 0..5 {
            tx.send(ViewportSignal::Scroll).unwrap();
        }
        drop(tx);

        worker
            .run(rx, &FixedFetcher, &EverythingVisible, &mut renderer)
            .await;

        let metrics = worker.metrics();
        assert_eq!(metrics.signals_received, 5);
        assert_eq!(metrics.signals_coalesced, 4);
        assert_eq!(metrics.passes_run, 1);
        assert_eq!(metrics.refinements_succeeded, 2);
        assert_eq!(metrics.rendered_at(Tier::Refined), 2);
        assert_eq!(renderer.count, 4);
    }

    #[tokio::test]
    async fn test_failed_fetch_does_not_stop_worker() {
        let mut renderer = CountingRenderer::default();
        let mut worker = worker(
            vec![ItemRecord::new("broken", 4.0, 10), ItemRecord::new("ok", 4.0, 10)],
            &mut renderer,
        );

        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(ViewportSignal::Resize).unwrap();
        drop(tx);

        worker
            .run(rx, &FixedFetcher, &EverythingVisible, &mut renderer)
            .await;

        assert_eq!(worker.metrics().refinements_failed, 1);
        assert_eq!(worker.metrics().refinements_succeeded, 1);
        assert_eq!(worker.metrics().refinements_outstanding(), 0);
    }

    #[tokio::test]
    async fn test_no_signals_no_passes() {
        let mut renderer = CountingRenderer::default();
        let mut worker = worker(vec![ItemRecord::new("a", 4.0, 10)], &mut renderer);

        let (tx, rx) = mpsc::unbounded_channel::<ViewportSignal>();
        drop(tx);

        worker
            .run(rx, &FixedFetcher, &EverythingVisible, &mut renderer)
            .await;

        assert_eq!(worker.metrics().passes_run, 0);
        assert_eq!(worker.scheduler().working_set().len(), 1);
    }
}
