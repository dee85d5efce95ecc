//! Page fixtures: the CLI's stand-in for a live listing page.
//!
//! A fixture is a JSON document describing where each item sits on the page,
//! what the listing shows for it, and the histogram a detail fetch would
//! return:
//!
//! ```json
//! {
//!   "viewport": { "width": 1280, "height": 800 },
//!   "fetch_latency_ms": 20,
//!   "items": [
//!     { "id": "B01", "rating_text": "4.5 out of 5 stars", "reviews_text": "1,234",
//!       "top": 0, "height": 300, "histogram": [5, 4, 1, 10, 80] },
//!     { "id": "B02", "rating": 3.9, "reviews": 57, "top": 320, "height": 300 }
//!   ]
//! }
//! ```

use crate::error::{CliError, Result};
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::collections::HashMap;
use std::future::Future;
use std::path::Path;
use std::time::Duration;
use verity_domain::traits::{DistributionFetcher, GeometryProvider, ItemSource, Renderer};
use verity_domain::{
    BetaParams, ConfidenceResult, Distribution, FetchError, ItemId, ItemRecord, Rect,
};

/// A listing page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageFixture {
    /// Visible window size
    #[serde(default)]
    pub viewport: ViewportSize,

    /// Simulated latency of every histogram fetch (in milliseconds)
    #[serde(default)]
    pub fetch_latency_ms: u64,

    /// Items in page order
    pub items: Vec<FixtureItem>,
}

/// Size of the visible window.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ViewportSize {
    /// Width in pixels
    pub width: f64,
    /// Height in pixels
    pub height: f64,
}

impl Default for ViewportSize {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 800.0,
        }
    }
}

/// One item on the page.
///
/// Ratings and review counts may be given as numbers or as the raw text a
/// listing displays; numbers win when both are present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureItem {
    /// Item handle
    pub id: String,

    /// Average star rating
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,

    /// Rating text such as "4.5 out of 5 stars"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating_text: Option<String>,

    /// Number of ratings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviews: Option<u64>,

    /// Review count text such as "1,234"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviews_text: Option<String>,

    /// Distance from the top of the page
    pub top: f64,

    /// Distance from the left of the page
    #[serde(default)]
    pub left: f64,

    /// Width in pixels
    #[serde(default = "default_item_width")]
    pub width: f64,

    /// Height in pixels
    pub height: f64,

    /// Star percentages a detail fetch returns, 1 star first
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub histogram: Option<Vec<f64>>,
}

fn default_item_width() -> f64 {
    300.0
}

impl PageFixture {
    /// Read a fixture from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| CliError::Fixture(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&contents)
    }

    /// Parse a fixture from JSON text.
    pub fn from_json_str(contents: &str) -> Result<Self> {
        let fixture: PageFixture = serde_json::from_str(contents)?;
        if !(fixture.viewport.width > 0.0 && fixture.viewport.height > 0.0) {
            return Err(CliError::Fixture("viewport must have a positive size".into()));
        }
        Ok(fixture)
    }

    /// Bottom edge of the lowest item.
    pub fn page_height(&self) -> f64 {
        self.items
            .iter()
            .map(|item| item.top + item.height)
            .fold(0.0, f64::max)
    }
}

impl FixtureItem {
    /// What a listing scrape would report for this item.
    pub fn record(&self) -> ItemRecord {
        let average_rating = match (self.rating, &self.rating_text) {
            (Some(rating), _) => rating,
            (None, Some(text)) => parse_rating_text(text),
            (None, None) => f64::NAN,
        };
        let review_count = match (self.reviews, &self.reviews_text) {
            (Some(reviews), _) => reviews,
            (None, Some(text)) => parse_review_count_text(text).unwrap_or_else(|| {
                tracing::warn!(item = %self.id, text = %text, "Unreadable review count");
                0
            }),
            (None, None) => 0,
        };
        ItemRecord::new(self.id.as_str(), average_rating, review_count)
    }

    /// Position on the page.
    pub fn rect(&self) -> Rect {
        Rect::from_origin(self.left, self.top, self.width, self.height)
    }
}

/// Read the score from text like "4.5 out of 5 stars".
///
/// Returns NaN when there is no leading number.
pub fn parse_rating_text(text: &str) -> f64 {
    text.split(" out of")
        .next()
        .map(str::trim)
        .and_then(|score| score.parse().ok())
        .unwrap_or(f64::NAN)
}

/// Read a review count from text like "1,234" or "2.345 ratings".
///
/// Thousands separators (`,` and `.`) are dropped before reading the
/// leading digits.
pub fn parse_review_count_text(text: &str) -> Option<u64> {
    let digits: String = text
        .trim()
        .chars()
        .filter(|c| *c != ',' && *c != '.')
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().ok()
}

/// Enumerates the items of a fixture.
pub struct FixtureSource<'a> {
    fixture: &'a PageFixture,
}

impl<'a> FixtureSource<'a> {
    /// Create a source over `fixture`.
    pub fn new(fixture: &'a PageFixture) -> Self {
        Self { fixture }
    }
}

impl ItemSource for FixtureSource<'_> {
    fn enumerate_items(&mut self) -> Vec<ItemRecord> {
        self.fixture.items.iter().map(FixtureItem::record).collect()
    }
}

/// Page layout with a scrollable viewport.
pub struct PageGeometry {
    rects: HashMap<ItemId, Rect>,
    viewport: ViewportSize,
    scroll: Cell<f64>,
}

impl PageGeometry {
    /// Lay out `fixture` with the viewport at the top of the page.
    pub fn new(fixture: &PageFixture) -> Self {
        let rects = fixture
            .items
            .iter()
            .map(|item| (ItemId::new(item.id.as_str()), item.rect()))
            .collect();
        Self {
            rects,
            viewport: fixture.viewport,
            scroll: Cell::new(0.0),
        }
    }

    /// Move the viewport to a vertical offset.
    pub fn scroll_to(&self, offset: f64) {
        self.scroll.set(offset);
    }

    /// Current vertical offset.
    pub fn scroll(&self) -> f64 {
        self.scroll.get()
    }
}

impl GeometryProvider for PageGeometry {
    fn bounding_rect(&self, id: &ItemId) -> Rect {
        // Unknown items are never visible
        self.rects.get(id).copied().unwrap_or(Rect::new(
            f64::NEG_INFINITY,
            f64::NEG_INFINITY,
            f64::NEG_INFINITY,
            f64::NEG_INFINITY,
        ))
    }

    fn viewport_rect(&self) -> Rect {
        Rect::from_origin(0.0, self.scroll.get(), self.viewport.width, self.viewport.height)
    }
}

/// Serves fixture histograms after a fixed delay.
pub struct FixtureFetcher {
    histograms: HashMap<ItemId, Option<Vec<f64>>>,
    latency: Duration,
}

impl FixtureFetcher {
    /// Create a fetcher over `fixture`.
    pub fn new(fixture: &PageFixture) -> Self {
        let histograms = fixture
            .items
            .iter()
            .map(|item| (ItemId::new(item.id.as_str()), item.histogram.clone()))
            .collect();
        Self {
            histograms,
            latency: Duration::from_millis(fixture.fetch_latency_ms),
        }
    }
}

impl DistributionFetcher for FixtureFetcher {
    fn fetch_distribution(
        &self,
        id: &ItemId,
    ) -> impl Future<Output = std::result::Result<Distribution, FetchError>> {
        let histogram = self.histograms.get(id).cloned().flatten();
        let latency = self.latency;
        let id = id.clone();

        async move {
            tokio::time::sleep(latency).await;
            let percentages = histogram
                .ok_or_else(|| FetchError::MissingData(format!("no histogram for {}", id)))?;
            let fractions: Vec<f64> = percentages.iter().map(|p| p / 100.0).collect();
            Distribution::from_slice(&fractions).ok_or_else(|| {
                FetchError::Malformed(format!("{}: expected five percentages, got {:?}", id, percentages))
            })
        }
    }
}

/// One estimate handed to the renderer.
#[derive(Debug, Clone, Copy)]
pub struct RenderEvent {
    /// Interval shown
    pub result: ConfidenceResult,
    /// Posterior shown
    pub params: BetaParams,
}

/// Renderer that keeps every estimate it is given.
///
/// Tiers are not tracked here; ask the scheduler's item for that.
#[derive(Debug, Default)]
pub struct CollectingRenderer {
    renders: HashMap<ItemId, Vec<RenderEvent>>,
}

impl CollectingRenderer {
    /// Create an empty renderer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every render of `id`, oldest first.
    pub fn renders_of(&self, id: &ItemId) -> &[RenderEvent] {
        self.renders.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Most recent render of `id`.
    pub fn latest(&self, id: &ItemId) -> Option<&RenderEvent> {
        self.renders_of(id).last()
    }
}

impl Renderer for CollectingRenderer {
    fn render(&mut self, id: &ItemId, result: &ConfidenceResult, params: &BetaParams) {
        tracing::debug!(
            item = %id,
            proportion = result.proportion,
            lower = result.lower,
            upper = result.upper,
            "Rendered estimate"
        );
        self.renders.entry(id.clone()).or_default().push(RenderEvent {
            result: *result,
            params: *params,
        });
    }
}
