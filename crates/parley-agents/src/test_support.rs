//! Fixtures shared by unit tests, integration tests and the replay binary's
//! tests: a small two-issue domain with a known utility table, a manually
//! driven clock, and an opponent that replays a fixed script of offers.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use parley_cache::BidSpaceCache;
use parley_models::{Bid, Domain, LinearAdditiveProfile, Value, ValueSet};
use rust_decimal_macros::dec;

use crate::clock::ProgressClock;

/// Build a bid from `(issue, value)` pairs.
pub fn bid(pairs: &[(&str, &str)]) -> Bid {
    pairs.iter().map(|(issue, value)| (*issue, *value)).collect()
}

/// `issue1` in {A, B}, `issue2` in {X, Y, Z}.
pub fn two_issue_domain() -> Domain {
    Domain::new(
        "two-issue",
        BTreeMap::from([
            ("issue1".to_string(), ValueSet::discrete(["A", "B"])),
            ("issue2".to_string(), ValueSet::discrete(["X", "Y", "Z"])),
        ]),
    )
}

/// Equal issue weights; A=1, B=0.4 and Z=1, Y=0.6, X=0.2.
///
/// Own utilities, best first: A/Z 1.0, A/Y 0.8, B/Z 0.7, A/X 0.6, B/Y 0.5,
/// B/X 0.3.
pub fn two_issue_profile() -> LinearAdditiveProfile {
    LinearAdditiveProfile::new(
        "two-issue-buyer",
        two_issue_domain(),
        BTreeMap::from([
            ("issue1".to_string(), dec!(0.5)),
            ("issue2".to_string(), dec!(0.5)),
        ]),
        BTreeMap::from([
            (
                "issue1".to_string(),
                BTreeMap::from([(Value::from("A"), dec!(1)), (Value::from("B"), dec!(0.4))]),
            ),
            (
                "issue2".to_string(),
                BTreeMap::from([
                    (Value::from("X"), dec!(0.2)),
                    (Value::from("Y"), dec!(0.6)),
                    (Value::from("Z"), dec!(1)),
                ]),
            ),
        ]),
    )
    .expect("two-issue profile is valid")
}

pub fn two_issue_cache() -> BidSpaceCache {
    BidSpaceCache::build(&two_issue_profile(), 1_000).expect("two-issue domain fits the cache")
}

/// Progress set by hand.
#[derive(Debug)]
pub struct ManualClock {
    bits: AtomicU64,
}

impl ManualClock {
    pub fn new(progress: f64) -> Self {
        Self {
            bits: AtomicU64::new(progress.to_bits()),
        }
    }

    pub fn set(&self, progress: f64) {
        self.bits.store(progress.to_bits(), Ordering::Relaxed);
    }
}

impl ProgressClock for ManualClock {
    fn progress(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::Relaxed)).clamp(0.0, 1.0)
    }
}

/// Replays a fixed list of offers, optionally starting over at the end.
#[derive(Debug, Clone)]
pub struct ScriptedOpponent {
    offers: Vec<Bid>,
    position: usize,
    cycle: bool,
}

impl ScriptedOpponent {
    pub fn new(offers: Vec<Bid>) -> Self {
        Self {
            offers,
            position: 0,
            cycle: false,
        }
    }

    /// Repeat the script forever.
    pub fn cycling(offers: Vec<Bid>) -> Self {
        Self {
            cycle: true,
            ..Self::new(offers)
        }
    }

    /// Script built from `(issue1, issue2)` value pairs of the two-issue domain.
    pub fn two_issue(pairs: &[(&str, &str)]) -> Self {
        Self::new(
            pairs
                .iter()
                .map(|(a, b)| bid(&[("issue1", *a), ("issue2", *b)]))
                .collect(),
        )
    }

    pub fn next_offer(&mut self) -> Option<Bid> {
        if self.position >= self.offers.len() {
            if !self.cycle || self.offers.is_empty() {
                return None;
            }
            self.position = 0;
        }
        let offer = self.offers[self.position].clone();
        self.position += 1;
        Some(offer)
    }
}
