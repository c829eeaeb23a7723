use std::collections::BTreeMap;

use parley_models::Value;
use tracing::warn;

use crate::estimator::IssueEstimator;

/// Beta(alpha, beta) posterior over "the opponent picks this value".
#[derive(Debug, Clone, Copy, PartialEq)]
struct BetaValueEstimator {
    alpha: u32,
    beta: u32,
}

impl Default for BetaValueEstimator {
    fn default() -> Self {
        Self { alpha: 1, beta: 1 }
    }
}

impl BetaValueEstimator {
    fn observe(&mut self, chosen: bool) {
        if chosen {
            self.alpha += 1;
        } else {
            self.beta += 1;
        }
    }

    fn mean(&self) -> f64 {
        f64::from(self.alpha) / f64::from(self.alpha + self.beta)
    }
}

/// Bayesian estimator: every value of the issue starts at a uniform Beta(1, 1)
/// prior; each offer is a success for the chosen value and a failure for the
/// rest.
#[derive(Debug, Clone)]
pub struct BayesianIssueEstimator {
    issue: String,
    values: BTreeMap<Value, BetaValueEstimator>,
    bids_received: u32,
    max_alpha: u32,
    weight: f64,
}

impl BayesianIssueEstimator {
    pub fn new(issue: &str, values: &[Value]) -> Self {
        Self {
            issue: issue.to_string(),
            values: values
                .iter()
                .map(|v| (v.clone(), BetaValueEstimator::default()))
                .collect(),
            bids_received: 0,
            max_alpha: 1,
            weight: 0.0,
        }
    }

    pub fn issue(&self) -> &str {
        &self.issue
    }

    pub fn posterior(&self, value: &Value) -> Option<(u32, u32)> {
        self.values.get(value).map(|e| (e.alpha, e.beta))
    }

    /// How far the most chosen value's alpha sits above an equal split of
    /// the offers, relative to the maximum possible excess.
    fn recompute_weight(&mut self) {
        let num_values = self.values.len();
        if num_values <= 1 {
            // Nothing to choose between; the issue carries no signal.
            self.weight = 0.0;
            return;
        }
        let received = f64::from(self.bids_received);
        let equal_share = received / num_values as f64;
        self.weight = ((f64::from(self.max_alpha) - equal_share) / (received - equal_share)).max(0.0);
    }
}

impl IssueEstimator for BayesianIssueEstimator {
    fn update(&mut self, value: &Value) {
        if !self.values.contains_key(value) {
            warn!(issue = %self.issue, value = %value, "Ignoring value outside the issue domain");
            return;
        }
        self.bids_received += 1;

        for (candidate, estimator) in self.values.iter_mut() {
            estimator.observe(candidate == value);
        }
        self.max_alpha = self
            .values
            .values()
            .map(|e| e.alpha)
            .max()
            .unwrap_or(1);
        self.recompute_weight();
    }

    fn utility_of(&self, value: &Value) -> f64 {
        self.values.get(value).map_or(0.0, BetaValueEstimator::mean)
    }

    fn weight(&self) -> f64 {
        self.weight
    }

    fn bids_received(&self) -> u32 {
        self.bids_received
    }
}
