use std::collections::HashSet;
use std::time::Instant;

use parley_models::{Bid, UtilitySpace};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use tracing::info;

use crate::error::CacheError;

/// A bid paired with our own utility for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoredBid {
    pub bid: Bid,
    pub utility: Decimal,
}

impl ScoredBid {
    pub fn new(bid: Bid, utility: Decimal) -> Self {
        Self { bid, utility }
    }

    /// Utility as a float, for comparison against aspiration levels.
    pub fn utility_f64(&self) -> f64 {
        self.utility.to_f64().unwrap_or(0.0)
    }
}

/// Every bid of the domain, scored once and sorted by own utility, best first.
///
/// Built at session start and read-only afterwards. Bids with equal utility
/// keep their enumeration order, so scans over the cache are deterministic.
#[derive(Debug, Clone)]
pub struct BidSpaceCache {
    bids: Vec<ScoredBid>,
}

impl BidSpaceCache {
    /// Enumerate and score the full bid space of `space`.
    pub fn build(space: &dyn UtilitySpace, max_bids: u64) -> Result<Self, CacheError> {
        let start = Instant::now();
        let domain = space.domain();
        let scored = domain
            .all_bids(max_bids)?
            .into_iter()
            .map(|bid| {
                let utility = space.utility(&bid);
                ScoredBid::new(bid, utility)
            })
            .collect::<Vec<_>>();

        if scored.is_empty() {
            return Err(CacheError::Empty(domain.name.clone()));
        }

        let cache = Self::from_scored(scored);
        info!(
            domain = %domain.name,
            bids = cache.len(),
            best_utility = %cache.best().utility,
            elapsed_ms = start.elapsed().as_millis(),
            "Bid space cached"
        );
        Ok(cache)
    }

    /// Sort already-scored bids into a cache.
    pub fn from_scored(mut bids: Vec<ScoredBid>) -> Self {
        bids.sort_by(|a, b| b.utility.cmp(&a.utility));
        Self { bids }
    }

    /// The highest own-utility bid.
    ///
    /// # Panics
    /// Never for caches created through `build`, which rejects empty spaces.
    pub fn best(&self) -> &ScoredBid {
        &self.bids[0]
    }

    /// The highest own-utility bid not in `proposed`.
    pub fn best_unproposed(&self, proposed: &HashSet<Bid>) -> Option<&ScoredBid> {
        self.bids.iter().find(|s| !proposed.contains(&s.bid))
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScoredBid> {
        self.bids.iter()
    }

    pub fn len(&self) -> usize {
        self.bids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bids.is_empty()
    }
}
