//! Simulate command implementation.
//!
//! Plays the part of a host page: bootstraps a session for the context,
//! admits the fixture's items, then scrolls through the requested offsets
//! while the worker refines whatever comes into view.

use crate::cli::SimulateArgs;
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use crate::source::{CollectingRenderer, FixtureFetcher, FixtureSource, PageFixture, PageGeometry};
use std::time::Duration;
use verity_domain::traits::ItemSource;
use verity_domain::{ConfidenceResult, EnrichmentState, Item, ItemId, Tier};
use verity_enricher::{
    global_registry, ContextId, EnricherConfig, EnrichmentMetrics, EnrichmentScheduler,
    EnrichmentSession, EnrichmentWorker, IntervalFrames, SessionRegistry, ViewportSignal,
};

/// Final state of one fixture item.
#[derive(Debug, Clone)]
pub struct ItemOutcome {
    /// Item handle
    pub id: ItemId,
    /// Number of ratings
    pub reviews: u64,
    /// Enrichment state when the session ended
    pub state: EnrichmentState,
    /// Tier of the estimate on display, if any
    pub tier: Option<Tier>,
    /// Number of renders the item received
    pub renders: usize,
    /// Interval on display, if any
    pub result: Option<ConfidenceResult>,
}

/// Outcome of a simulated session.
#[derive(Debug, Clone)]
pub struct SimulationReport {
    /// Context the session ran under
    pub context: String,
    /// Items in page order
    pub items: Vec<ItemOutcome>,
    /// Session counters
    pub metrics: EnrichmentMetrics,
}

/// Execute the simulate command.
pub async fn execute_simulate(
    args: SimulateArgs,
    config: &Config,
    formatter: &Formatter,
) -> Result<()> {
    let fixture = PageFixture::load(&args.page)?;
    let context = ContextId::new(args.context);

    let report = simulate_session(
        global_registry(),
        &context,
        &fixture,
        &args.scroll,
        &config.enricher,
    )
    .await?;

    match report {
        Some(report) => println!("{}", formatter.format_simulation(&report)?),
        None => println!(
            "{}",
            formatter.warning(&format!("Session '{}' is already active", context))
        ),
    }
    Ok(())
}

/// Run one session over `fixture`, visiting `offsets` in order.
///
/// Returns `None` without doing anything when `registry` already holds a
/// session for `context`. The session is released once its worker stops.
pub async fn simulate_session(
    registry: &SessionRegistry<EnrichmentSession>,
    context: &ContextId,
    fixture: &PageFixture,
    offsets: &[f64],
    config: &EnricherConfig,
) -> Result<Option<SimulationReport>> {
    let mut receiver = None;
    let bootstrap = registry.bootstrap(context, || {
        let (session, rx) = EnrichmentSession::new(context.clone());
        receiver = Some(rx);
        session
    });
    let Some(signals) = receiver else {
        return Ok(None);
    };
    let session = bootstrap.into_handle();

    let records = FixtureSource::new(fixture).enumerate_items();
    let mut renderer = CollectingRenderer::new();
    let mut scheduler = match EnrichmentScheduler::new(config.clone()) {
        Ok(scheduler) => scheduler,
        Err(e) => {
            registry.release(context);
            return Err(e.into());
        }
    };
    scheduler.admit(records.clone(), &mut renderer)?;

    let geometry = PageGeometry::new(fixture);
    let fetcher = FixtureFetcher::new(fixture);
    let frames = IntervalFrames::new(config.frame_interval());
    let mut worker = EnrichmentWorker::new(scheduler, frames);

    // Give each offset a few frames so a pass observes it
    let settle = config.frame_interval() * 3;
    let producer = drive_viewport(&session, &geometry, offsets, settle);
    let consumer = worker.run(signals, &fetcher, &geometry, &mut renderer);
    tokio::join!(producer, consumer);
    registry.release(context);

    let items = records
        .into_iter()
        .map(|record| {
            let item = worker.scheduler().item(&record.id);
            ItemOutcome {
                state: item.map_or(EnrichmentState::Unenriched, Item::state),
                tier: item.and_then(Item::tier),
                renders: renderer.renders_of(&record.id).len(),
                result: item.and_then(Item::latest).map(|estimate| estimate.result),
                reviews: record.review_count,
                id: record.id,
            }
        })
        .collect();

    Ok(Some(SimulationReport {
        context: context.to_string(),
        items,
        metrics: worker.metrics().clone(),
    }))
}

async fn drive_viewport(
    session: &EnrichmentSession,
    geometry: &PageGeometry,
    offsets: &[f64],
    settle: Duration,
) {
    session.notify(ViewportSignal::Resize);
    for offset in offsets {
        tokio::time::sleep(settle).await;
        geometry.scroll_to(*offset);
        tracing::debug!(offset, "Scrolled");
        session.notify(ViewportSignal::Scroll);
    }
    tokio::time::sleep(settle).await;
    session.end();
}
