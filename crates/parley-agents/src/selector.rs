use std::collections::HashSet;

use parley_cache::{BidSpaceCache, ScoredBid};
use parley_models::{Bid, StrategyConfig};
use tracing::{debug, warn};

use crate::agreement::{honours_agreement, AgreedIssues};
use crate::concession::AspirationState;
use crate::opponent_model::OpponentModel;

/// How a bid was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionPath {
    /// Nothing proposed yet: our best bid, no search.
    Opening,
    /// Found inside the iso band after lowering it `retries` times.
    IsoBand { retries: usize },
    /// Retries or floor exhausted, or no opponent data to search with:
    /// best bid not yet proposed.
    Fallback,
}

#[derive(Debug, Clone)]
pub struct Selection<'a> {
    pub scored: &'a ScoredBid,
    pub predicted_opponent_utility: f64,
    pub path: SelectionPath,
}

/// Searches the bid space for the bid the opponent likes best among bids
/// close to our aspiration level.
#[derive(Debug, Clone)]
pub struct BidSelector {
    budget: usize,
    max_retries: usize,
    floor: f64,
}

impl BidSelector {
    pub fn new(budget: usize, max_retries: usize, floor: f64) -> Self {
        Self {
            budget,
            max_retries,
            floor,
        }
    }

    pub fn from_config(strategy: &StrategyConfig) -> Self {
        Self::new(
            strategy.search_budget,
            strategy.max_search_retries,
            strategy.iso_floor,
        )
    }

    /// Pick the next bid to propose.
    ///
    /// Scans the iso band `(iso_level - iso_increment, iso_level + iso_increment)`
    /// for unproposed bids that keep the agreed values, choosing the one with
    /// the highest predicted opponent utility (first in cache order on ties).
    /// An empty band lowers the aspiration by one increment and retries, up
    /// to `max_retries` times and never below the configured floor or
    /// `minimum_utility`, whichever is higher; after that the best unproposed
    /// bid is returned.
    pub fn search<'c>(
        &self,
        model: Option<&OpponentModel>,
        cache: &'c BidSpaceCache,
        aspiration: &mut AspirationState,
        agreed: &AgreedIssues,
        proposed: &HashSet<Bid>,
        minimum_utility: f64,
    ) -> Selection<'c> {
        if proposed.is_empty() {
            return Selection {
                scored: cache.best(),
                predicted_opponent_utility: model
                    .map_or(0.0, |m| m.predicted_utility(&cache.best().bid)),
                path: SelectionPath::Opening,
            };
        }
        let model = match model {
            Some(model) if model.offer_count() > 0 => model,
            _ => {
                let scored = Self::best_unproposed(cache, proposed);
                return Selection {
                    scored,
                    predicted_opponent_utility: model
                        .map_or(0.0, |m| m.predicted_utility(&scored.bid)),
                    path: SelectionPath::Fallback,
                };
            }
        };

        let floor = self.floor.max(minimum_utility);
        let mut retries = 0;
        loop {
            if let Some((scored, predicted)) = self.scan_band(model, cache, aspiration, agreed, proposed)
            {
                debug!(
                    iso_level = aspiration.iso_level(),
                    retries,
                    own_utility = %scored.utility,
                    predicted,
                    "Selected bid from iso band"
                );
                return Selection {
                    scored,
                    predicted_opponent_utility: predicted,
                    path: SelectionPath::IsoBand { retries },
                };
            }
            if retries >= self.max_retries || !aspiration.step_down(floor) {
                break;
            }
            retries += 1;
        }

        let scored = Self::best_unproposed(cache, proposed);
        warn!(
            iso_level = aspiration.iso_level(),
            retries,
            own_utility = %scored.utility,
            "Iso band search exhausted, falling back to best unproposed bid"
        );
        Selection {
            scored,
            predicted_opponent_utility: model.predicted_utility(&scored.bid),
            path: SelectionPath::Fallback,
        }
    }

    fn best_unproposed<'c>(cache: &'c BidSpaceCache, proposed: &HashSet<Bid>) -> &'c ScoredBid {
        cache.best_unproposed(proposed).unwrap_or_else(|| {
            warn!("Every bid has been proposed, repeating the best bid");
            cache.best()
        })
    }

    fn scan_band<'c>(
        &self,
        model: &OpponentModel,
        cache: &'c BidSpaceCache,
        aspiration: &AspirationState,
        agreed: &AgreedIssues,
        proposed: &HashSet<Bid>,
    ) -> Option<(&'c ScoredBid, f64)> {
        let iso = aspiration.iso_level();
        let increment = aspiration.iso_increment();
        let mut best: Option<(&ScoredBid, f64)> = None;
        let mut considered = 0;

        for scored in cache.iter() {
            if proposed.contains(&scored.bid) {
                continue;
            }
            let utility = scored.utility_f64();
            // Sorted descending: nothing further down can reach the band.
            if considered >= self.budget || utility <= iso - increment {
                break;
            }
            if (utility - iso).abs() >= increment || !honours_agreement(&scored.bid, agreed) {
                continue;
            }

            considered += 1;
            let predicted = model.predicted_utility(&scored.bid);
            if best.map_or(true, |(_, b)| predicted > b) {
                best = Some((scored, predicted));
            }
        }
        best
    }
}
