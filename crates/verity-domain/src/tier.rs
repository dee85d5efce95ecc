//! Tier module - enrichment quality levels for item estimates

use std::fmt;
use thiserror::Error;

/// Enrichment tier of an item's estimate
///
/// Items start at `Coarse` (average rating only) and may be advanced once to
/// `Refined` (full star histogram). Tiers never regress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tier {
    /// Estimate derived from the average star rating
    Coarse,

    /// Estimate derived from the star distribution histogram
    Refined,
}

impl Tier {
    /// Get the tier name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Coarse => "coarse",
            Tier::Refined => "refined",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-item enrichment state
///
/// ```text
/// Unenriched → CoarsePending → CoarseReady → RefinedPending → RefinedReady
/// ```
///
/// There are no backward transitions. A failed refinement leaves the item in
/// `RefinedPending`, still showing its coarse result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnrichmentState {
    /// Known to the session, no estimate attempted
    Unenriched,
    /// Coarse estimate being computed
    CoarsePending,
    /// Coarse estimate available
    CoarseReady,
    /// Distribution fetch started (or failed)
    RefinedPending,
    /// Refined estimate available
    RefinedReady,
}

impl EnrichmentState {
    /// Tier of the latest valid estimate for this state, if any
    ///
    /// A pending step has produced nothing yet, so it reports the tier of
    /// the step before it.
    pub fn tier(&self) -> Option<Tier> {
        match self {
            EnrichmentState::Unenriched | EnrichmentState::CoarsePending => None,
            EnrichmentState::CoarseReady | EnrichmentState::RefinedPending => Some(Tier::Coarse),
            EnrichmentState::RefinedReady => Some(Tier::Refined),
        }
    }

    /// Get the state name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            EnrichmentState::Unenriched => "unenriched",
            EnrichmentState::CoarsePending => "coarse-pending",
            EnrichmentState::CoarseReady => "coarse-ready",
            EnrichmentState::RefinedPending => "refined-pending",
            EnrichmentState::RefinedReady => "refined-ready",
        }
    }

    /// Whether the state admits no further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(self, EnrichmentState::RefinedReady)
    }

    /// Whether `next` is the single forward step allowed from this state
    pub fn can_transition_to(&self, next: EnrichmentState) -> bool {
        use EnrichmentState::*;
        matches!(
            (self, next),
            (Unenriched, CoarsePending)
                | (CoarsePending, CoarseReady)
                | (CoarseReady, RefinedPending)
                | (RefinedPending, RefinedReady)
        )
    }

    /// Move to `next`, rejecting anything but the allowed forward step
    pub fn transition(self, next: EnrichmentState) -> Result<EnrichmentState, InvalidTransition> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(InvalidTransition { from: self, to: next })
        }
    }
}

impl fmt::Display for EnrichmentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A transition not on the enrichment ladder
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Invalid enrichment transition: {from} -> {to}")]
pub struct InvalidTransition {
    /// State the item was in
    pub from: EnrichmentState,
    /// State that was requested
    pub to: EnrichmentState,
}

#[cfg(test)]
mod tests {
    use super::*;
    use EnrichmentState::*;

    #[test]
    fn test_tier_order_and_names() {
        assert!(Tier::Coarse < Tier::Refined);
        assert_eq!(Tier::Refined.to_string(), "refined");
    }

    #[test]
    fn test_full_ladder() {
        let state = Unenriched
            .transition(CoarsePending)
            .and_then(|s| s.transition(CoarseReady))
            .and_then(|s| s.transition(RefinedPending))
            .and_then(|s| s.transition(RefinedReady))
            .unwrap();
        assert!(state.is_terminal());
    }

    #[test]
    fn test_no_skipping_or_regressing() {
        assert!(Unenriched.transition(CoarseReady).is_err());
        assert!(CoarseReady.transition(RefinedReady).is_err());
        assert!(RefinedReady.transition(CoarseReady).is_err());
        assert!(RefinedPending.transition(CoarseReady).is_err());
        assert_eq!(
            RefinedPending.transition(RefinedPending),
            Err(InvalidTransition {
                from: RefinedPending,
                to: RefinedPending
            })
        );
    }

    #[test]
    fn test_state_tiers() {
        assert_eq!(Unenriched.tier(), None);
        assert_eq!(CoarsePending.tier(), None);
        assert_eq!(CoarseReady.tier(), Some(Tier::Coarse));
        assert_eq!(RefinedReady.tier(), Some(Tier::Refined));
    }

    #[test]
    fn test_pending_refinement_still_shows_coarse() {
        assert_eq!(RefinedPending.tier(), Some(Tier::Coarse));
    }
}
