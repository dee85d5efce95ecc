//! Verity Domain Layer
//!
//! This crate contains the statistics and the item model that every other
//! Verity crate builds on. It has no runtime or I/O dependencies; the only
//! external collaborator is `statrs`, which supplies the regularized
//! incomplete beta function and its inverse.
//!
//! ## Key Concepts
//!
//! - **Item**: an externally observed product with a review count and either
//!   an average star rating or a full star histogram
//! - **Confidence Result**: `{proportion, lower, upper}` for the true share of
//!   positive experiences (exact Clopper-Pearson interval)
//! - **Beta Parameters**: the Beta posterior shape used by the interval and by
//!   distribution plots
//! - **Enrichment State**: the `Unenriched → … → RefinedReady` ladder each item
//!   climbs exactly once
//! - **Viewport Gate**: rectangle overlap test deciding which items are visible
//!
//! ## Architecture
//!
//! - Pure functions and value objects only
//! - Collaborators (item source, fetcher, renderer, geometry, frame clock)
//!   are traits in [`traits`]; implementations live in other crates

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod confidence;
pub mod confidence_computation;
pub mod error;
pub mod item;
pub mod tier;
pub mod traits;
pub mod viewport;

// Re-exports for convenience
pub use confidence::{BetaParams, ConfidenceResult, Estimate};
pub use confidence_computation::{
    beta_pdf, compute_beta_params, confidence_interval, evaluate, proportion_from_average,
    proportion_from_distribution, BetaPdf, DEFAULT_CONFIDENCE_LEVEL, DEFAULT_PDF_RESOLUTION,
};
pub use error::{DomainError, FetchError};
pub use item::{Distribution, Item, ItemId, ItemRecord, RatingData};
pub use tier::{EnrichmentState, InvalidTransition, Tier};
pub use viewport::{is_visible, Rect};
