//! Trait definitions for external collaborators
//!
//! These traits define the boundaries between the enrichment core and the
//! host environment. Implementations live in other crates (or in tests).

use crate::{BetaParams, ConfidenceResult, Distribution, FetchError, ItemId, ItemRecord, Rect};
use std::future::Future;

/// Enumerates the items present when a session starts
pub trait ItemSource {
    /// Produce the session's items; may be empty
    fn enumerate_items(&mut self) -> Vec<ItemRecord>;
}

/// Fetches the full star histogram for an item
///
/// Asynchronous and fallible. The core never retries a failed fetch.
pub trait DistributionFetcher {
    /// Fetch the distribution for `id`
    fn fetch_distribution(
        &self,
        id: &ItemId,
    ) -> impl Future<Output = Result<Distribution, FetchError>>;
}

/// Side-effecting sink for estimates
pub trait Renderer {
    /// Display the latest estimate for an item
    fn render(&mut self, id: &ItemId, result: &ConfidenceResult, params: &BetaParams);
}

/// Synchronous geometry queries against the host display
pub trait GeometryProvider {
    /// Bounding rectangle of an item's representation
    fn bounding_rect(&self, id: &ItemId) -> Rect;

    /// Currently visible region
    fn viewport_rect(&self) -> Rect;
}

/// Source of rendering-frame boundaries
///
/// The core only relies on `next_frame` completing once, asynchronously,
/// after the current signal handling has finished.
pub trait FrameScheduler {
    /// Wait for the next rendering opportunity
    fn next_frame(&mut self) -> impl Future<Output = ()>;
}
