//! Verity Enricher
//!
//! Viewport-driven incremental enrichment of item confidence estimates.
//!
//! # Overview
//!
//! Every item with reviews gets a cheap coarse estimate (from its average
//! rating) as soon as the session starts. The more expensive refined
//! estimate (from the full star histogram) is fetched only once the item
//! scrolls into view, and at most once per item.
//!
//! # Architecture
//!
//! | Piece | Responsibility |
//! |-------|----------------|
//! | [`EnrichmentScheduler`] | working set, signal coalescing, tier transitions |
//! | [`EnrichmentWorker`] | single-task loop over signals, frames and fetches |
//! | [`IntervalFrames`] | tokio frame clock |
//! | [`SessionRegistry`] | at most one session per execution context |
//! | [`EnrichmentSession`] | handle the host uses to forward viewport changes |
//!
//! ## Enrichment ladder
//!
//! | State | Entered when | Rendered estimate |
//! |-------|--------------|-------------------|
//! | **Unenriched** | item enumerated | none |
//! | **CoarsePending** | session start, item has reviews | none |
//! | **CoarseReady** | coarse interval computed | coarse |
//! | **RefinedPending** | item visible at a frame boundary | coarse |
//! | **RefinedReady** | histogram fetched and evaluated | refined |
//!
//! # Usage
//!
//! ```no_run
//! use verity_enricher::{
//!     global_registry, ContextId, EnricherConfig, EnrichmentScheduler, EnrichmentSession,
//!     EnrichmentWorker, IntervalFrames, ViewportSignal,
//! };
//! # use verity_domain::traits::*;
//! # use verity_domain::*;
//! # async fn demo<S: ItemSource, D: DistributionFetcher, G: GeometryProvider, R: Renderer>(
//! #     mut source: S, fetcher: D, geometry: G, mut renderer: R,
//! # ) -> Result<(), verity_enricher::EnricherError> {
//! let context = ContextId::new("tab-1");
//! let mut receiver = None;
//! let bootstrap = global_registry().bootstrap(&context, || {
//!     let (session, rx) = EnrichmentSession::new(context.clone());
//!     receiver = Some(rx);
//!     session
//! });
//!
//! // Only the invocation that created the session runs a worker
//! if let Some(signals) = receiver {
//!     let config = EnricherConfig::default();
//!     let frames = IntervalFrames::new(config.frame_interval());
//!     let mut scheduler = EnrichmentScheduler::new(config)?;
//!     scheduler.admit(source.enumerate_items(), &mut renderer)?;
//!
//!     bootstrap.handle().notify(ViewportSignal::Resize);
//!     EnrichmentWorker::new(scheduler, frames)
//!         .run(signals, &fetcher, &geometry, &mut renderer)
//!         .await;
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration
//!
//! ```toml
//! [enricher]
//! confidence_level = 0.95
//! frame_interval_ms = 16
//! max_in_flight = 4
//! pdf_resolution = 200
//! ```

#![warn(missing_docs)]

mod bootstrap;
mod config;
mod error;
mod frames;
mod metrics;
mod scheduler;
mod session;
mod worker;

pub use bootstrap::{global_registry, Bootstrap, ContextId, SessionRegistry};
pub use config::EnricherConfig;
pub use error::EnricherError;
pub use frames::IntervalFrames;
pub use metrics::EnrichmentMetrics;
pub use scheduler::{EnrichmentScheduler, SignalOutcome, ViewportSignal};
pub use session::EnrichmentSession;
pub use worker::EnrichmentWorker;
