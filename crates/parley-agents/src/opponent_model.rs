use std::collections::BTreeMap;

use parley_models::{Bid, Domain, EstimatorKind, Value};
use tracing::debug;

use crate::error::AgentError;
use crate::estimator::{build_estimator, IssueEstimator};

/// Online model of the opponent's preferences, learned from its offers.
///
/// One estimator per issue. After every update the issue weights are
/// normalized to sum to 1; if every estimator reports zero weight the model
/// falls back to uniform weights.
#[derive(Debug)]
pub struct OpponentModel {
    domain: Domain,
    kind: EstimatorKind,
    estimators: BTreeMap<String, Box<dyn IssueEstimator>>,
    weights: BTreeMap<String, f64>,
    offers: Vec<Bid>,
}

impl OpponentModel {
    pub fn new(domain: &Domain, kind: EstimatorKind) -> Result<Self, AgentError> {
        let estimators = domain
            .issues
            .iter()
            .map(|(issue, values)| Ok((issue.clone(), build_estimator(kind, issue, values)?)))
            .collect::<Result<BTreeMap<_, _>, AgentError>>()?;

        let mut model = Self {
            domain: domain.clone(),
            kind,
            estimators,
            weights: BTreeMap::new(),
            offers: Vec::new(),
        };
        model.normalize();
        Ok(model)
    }

    /// Record one opponent offer. Bids that do not fit the domain are
    /// rejected before any state changes.
    pub fn update(&mut self, bid: &Bid) -> Result<(), AgentError> {
        self.domain.validate_bid(bid)?;
        self.offers.push(bid.clone());

        for (issue, estimator) in self.estimators.iter_mut() {
            if let Some(value) = bid.value(issue) {
                estimator.update(value);
            }
        }
        self.normalize();

        debug!(offers = self.offers.len(), weights = ?self.weights, "Opponent model updated");
        Ok(())
    }

    fn normalize(&mut self) {
        let total: f64 = self.estimators.values().map(|e| e.weight()).sum();
        let uniform = 1.0 / self.estimators.len().max(1) as f64;

        self.weights = self
            .estimators
            .iter()
            .map(|(issue, estimator)| {
                let weight = if total > 0.0 && total.is_finite() {
                    estimator.weight() / total
                } else {
                    uniform
                };
                (issue.clone(), weight)
            })
            .collect();
    }

    /// Estimated opponent utility of `bid`, in [0, 1]. Zero until the first
    /// offer has been observed.
    pub fn predicted_utility(&self, bid: &Bid) -> f64 {
        if self.offers.is_empty() {
            return 0.0;
        }
        let utility: f64 = self
            .estimators
            .iter()
            .filter_map(|(issue, estimator)| {
                let value = bid.value(issue)?;
                Some(self.weights.get(issue).copied().unwrap_or(0.0) * estimator.utility_of(value))
            })
            .sum();
        utility.clamp(0.0, 1.0)
    }

    /// Normalized issue weights; they sum to 1.
    pub fn normalized_weights(&self) -> &BTreeMap<String, f64> {
        &self.weights
    }

    pub fn weight_of(&self, issue: &str) -> Option<f64> {
        self.weights.get(issue).copied()
    }

    pub fn value_utility(&self, issue: &str, value: &Value) -> Option<f64> {
        self.estimators.get(issue).map(|e| e.utility_of(value))
    }

    pub fn estimator(&self, issue: &str) -> Option<&dyn IssueEstimator> {
        self.estimators.get(issue).map(|e| e.as_ref())
    }

    pub fn kind(&self) -> EstimatorKind {
        self.kind
    }

    pub fn offers(&self) -> &[Bid] {
        &self.offers
    }

    pub fn offer_count(&self) -> usize {
        self.offers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_models::ValueSet;

    fn domain() -> Domain {
        let mut issues = BTreeMap::new();
        issues.insert("issue1".to_string(), ValueSet::discrete(["A", "B"]));
        issues.insert("issue2".to_string(), ValueSet::discrete(["X", "Y", "Z"]));
        Domain::new("two_issue", issues)
    }

    fn bid(a: &str, b: &str) -> Bid {
        [("issue1", a), ("issue2", b)].into_iter().collect()
    }

    fn weight_sum(model: &OpponentModel) -> f64 {
        model.normalized_weights().values().sum()
    }

    #[test]
    fn predicted_utility_is_zero_without_offers() {
        let model = OpponentModel::new(&domain(), EstimatorKind::Frequency).unwrap();
        assert_eq!(model.predicted_utility(&bid("A", "X")), 0.0);
        assert!((weight_sum(&model) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn first_offer_falls_back_to_uniform_weights() {
        // Bayesian weight after one offer on a two-value issue is
        // (2 - 0.5) / (1 - 0.5) = 3, so use a domain where every estimator is silent.
        let mut issues = BTreeMap::new();
        issues.insert("fixed1".to_string(), ValueSet::discrete(["only"]));
        issues.insert("fixed2".to_string(), ValueSet::discrete(["only"]));
        let domain = Domain::new("fixed", issues);

        let mut model = OpponentModel::new(&domain, EstimatorKind::Bayesian).unwrap();
        let offer: Bid = [("fixed1", "only"), ("fixed2", "only")].into_iter().collect();
        model.update(&offer).unwrap();

        assert_eq!(model.weight_of("fixed1"), Some(0.5));
        assert_eq!(model.weight_of("fixed2"), Some(0.5));
        assert!(model.predicted_utility(&offer) > 0.0);
    }

    #[test]
    fn rigid_issue_dominates_weights() {
        let mut model = OpponentModel::new(&domain(), EstimatorKind::Frequency).unwrap();
        for b in ["X", "Y", "Z", "X", "Y"] {
            model.update(&bid("A", b)).unwrap();
            assert!((weight_sum(&model) - 1.0).abs() < 1e-9);
        }

        let w1 = model.weight_of("issue1").unwrap();
        let w2 = model.weight_of("issue2").unwrap();
        assert!(w1 > w2);
        assert_eq!(model.value_utility("issue1", &Value::from("A")), Some(1.0));
        assert_eq!(model.value_utility("issue1", &Value::from("B")), Some(0.0));

        assert!(model.predicted_utility(&bid("A", "Z")) > model.predicted_utility(&bid("B", "X")));
    }

    #[test]
    fn invalid_bid_leaves_model_untouched() {
        let mut model = OpponentModel::new(&domain(), EstimatorKind::Bayesian).unwrap();
        let result = model.update(&bid("A", "W"));
        assert!(matches!(result, Err(AgentError::InvalidBid(_))));
        assert_eq!(model.offer_count(), 0);
        assert_eq!(model.estimator("issue1").map(|e| e.bids_received()), Some(0));
    }

    #[test]
    fn continuous_domain_is_rejected() {
        let mut domain = domain();
        domain.issues.insert(
            "price".to_string(),
            ValueSet::Continuous {
                low: 0.0,
                high: 1.0,
            },
        );
        let err = OpponentModel::new(&domain, EstimatorKind::Frequency).unwrap_err();
        assert!(matches!(err, AgentError::NonDiscreteIssue { .. }));
    }
}
