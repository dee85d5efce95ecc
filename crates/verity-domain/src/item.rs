//! Item module - the entities under evaluation

use crate::{evaluate, DomainError, EnrichmentState, Estimate, InvalidTransition, Tier};
use std::fmt;

/// Opaque handle to an item's external representation
///
/// Owned by the collaborator that enumerated the item; the core only
/// compares and hashes it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ItemId(String);

impl ItemId {
    /// Create an id from any string-like handle
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrow the handle
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ItemId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Fraction of ratings at each star level, 1 star first
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Distribution([f64; 5]);

impl Distribution {
    /// Wrap five fractions (expected to sum to ~1)
    pub fn new(fractions: [f64; 5]) -> Self {
        Self(fractions)
    }

    /// Build from a slice, which must hold exactly five finite, non-negative values
    pub fn from_slice(values: &[f64]) -> Option<Self> {
        let fractions: [f64; 5] = values.try_into().ok()?;
        if fractions.iter().all(|f| f.is_finite() && *f >= 0.0) {
            Some(Self(fractions))
        } else {
            None
        }
    }

    /// Build from whole percentages such as `[5, 4, 1, 10, 80]`
    pub fn from_percentages(percentages: [f64; 5]) -> Self {
        Self(percentages.map(|p| p / 100.0))
    }

    /// The five fractions, 1 star first
    pub fn fractions(&self) -> &[f64; 5] {
        &self.0
    }
}

/// Rating data observed for an item, tagged by shape
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RatingData {
    /// Only the average star rating, nominally in `[1, 5]`
    Coarse {
        /// Average star rating
        average_rating: f64,
    },
    /// The full star histogram
    Refined {
        /// Star distribution
        distribution: Distribution,
    },
}

impl RatingData {
    /// Proportion of positive ratings implied by the data
    pub fn proportion(&self) -> f64 {
        match self {
            RatingData::Coarse { average_rating } => {
                crate::proportion_from_average(*average_rating)
            }
            RatingData::Refined { distribution } => {
                crate::proportion_from_distribution(distribution)
            }
        }
    }

    /// Tier this data shape supports
    pub fn tier(&self) -> Tier {
        match self {
            RatingData::Coarse { .. } => Tier::Coarse,
            RatingData::Refined { .. } => Tier::Refined,
        }
    }
}

/// What an item source reports for one item
#[derive(Debug, Clone, PartialEq)]
pub struct ItemRecord {
    /// Handle to the item's representation
    pub id: ItemId,
    /// Average star rating (NaN when it could not be read)
    pub average_rating: f64,
    /// Total ratings; zero means no data
    pub review_count: u64,
}

impl ItemRecord {
    /// Create a record
    pub fn new(id: impl Into<ItemId>, average_rating: f64, review_count: u64) -> Self {
        Self {
            id: id.into(),
            average_rating,
            review_count,
        }
    }
}

/// An item tracked for one session
///
/// Rating data is replaced when refined data arrives; the enrichment state
/// only moves forward.
#[derive(Debug, Clone)]
pub struct Item {
    /// Handle to the item's representation
    pub id: ItemId,
    /// Total ratings
    pub review_count: u64,
    /// Current rating data
    pub rating: RatingData,
    state: EnrichmentState,
    latest: Option<Estimate>,
}

impl Item {
    /// Start tracking an item at `Unenriched`
    pub fn from_record(record: ItemRecord) -> Self {
        Self {
            id: record.id,
            review_count: record.review_count,
            rating: RatingData::Coarse {
                average_rating: record.average_rating,
            },
            state: EnrichmentState::Unenriched,
            latest: None,
        }
    }

    /// Whether the item has any ratings to estimate from
    pub fn has_reviews(&self) -> bool {
        self.review_count > 0
    }

    /// Current enrichment state
    pub fn state(&self) -> EnrichmentState {
        self.state
    }

    /// Tier of the latest valid estimate, taken from the rating it was built on
    pub fn tier(&self) -> Option<Tier> {
        self.latest.as_ref().map(|_| self.rating.tier())
    }

    /// Latest valid estimate, if any
    pub fn latest(&self) -> Option<&Estimate> {
        self.latest.as_ref()
    }

    /// Advance one step along the enrichment ladder
    pub fn advance(&mut self, next: EnrichmentState) -> Result<(), InvalidTransition> {
        self.state = self.state.transition(next)?;
        Ok(())
    }

    /// Evaluate `rating` against this item's review count
    pub fn estimate(&self, rating: &RatingData, confidence_level: f64) -> Result<Estimate, DomainError> {
        evaluate(rating, self.review_count, confidence_level)
    }

    /// Store the estimate computed for the current state
    pub fn record_estimate(&mut self, estimate: Estimate) {
        self.latest = Some(estimate);
    }
}
