use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::{Bid, Domain, Value};
use crate::error::ModelError;

/// Tolerance on the sum of issue weights.
const WEIGHT_SUM_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 6);

/// The agent's own, fully known preference function over a domain.
pub trait UtilitySpace: Send + Sync {
    fn domain(&self) -> &Domain;

    /// Exact utility of a bid, in [0, 1].
    fn utility(&self, bid: &Bid) -> Decimal;

    /// Our preferred value for an issue, regardless of the issue's weight.
    fn best_value(&self, issue: &str) -> Option<&Value>;
}

/// Linear additive utility: sum over issues of `weight(issue) * utility(value)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearAdditiveProfile {
    pub name: String,
    pub domain: Domain,
    pub issue_weights: BTreeMap<String, Decimal>,
    pub value_utilities: BTreeMap<String, BTreeMap<Value, Decimal>>,
}

impl LinearAdditiveProfile {
    pub fn new(
        name: impl Into<String>,
        domain: Domain,
        issue_weights: BTreeMap<String, Decimal>,
        value_utilities: BTreeMap<String, BTreeMap<Value, Decimal>>,
    ) -> Result<Self, ModelError> {
        let profile = Self {
            name: name.into(),
            domain,
            issue_weights,
            value_utilities,
        };
        profile.validate()?;
        Ok(profile)
    }

    /// Parse and validate a profile from JSON.
    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        let profile: Self = serde_json::from_str(json)?;
        profile.validate()?;
        Ok(profile)
    }

    /// Weights must cover every issue and sum to 1; every discrete value
    /// needs a utility in [0, 1].
    pub fn validate(&self) -> Result<(), ModelError> {
        let unit = |d: &Decimal| *d >= Decimal::ZERO && *d <= Decimal::ONE;

        for issue in self.issue_weights.keys() {
            if self.domain.value_set(issue).is_none() {
                return Err(ModelError::UnknownIssue {
                    issue: issue.clone(),
                });
            }
        }

        let mut total = Decimal::ZERO;
        for (issue, set) in &self.domain.issues {
            let values = set.as_discrete().ok_or_else(|| ModelError::NonDiscreteIssue {
                issue: issue.clone(),
            })?;
            let weight = self.issue_weights.get(issue).ok_or_else(|| {
                ModelError::InvalidProfile(format!("no weight for issue {issue}"))
            })?;
            if !unit(weight) {
                return Err(ModelError::InvalidProfile(format!(
                    "weight {weight} of issue {issue} is outside [0, 1]"
                )));
            }
            total += *weight;

            let utilities = self.value_utilities.get(issue).ok_or_else(|| {
                ModelError::InvalidProfile(format!("no value utilities for issue {issue}"))
            })?;
            for value in values {
                match utilities.get(value) {
                    Some(u) if unit(u) => {}
                    Some(u) => {
                        return Err(ModelError::InvalidProfile(format!(
                            "utility {u} of {issue}={value} is outside [0, 1]"
                        )))
                    }
                    None => {
                        return Err(ModelError::InvalidProfile(format!(
                            "no utility for {issue}={value}"
                        )))
                    }
                }
            }
        }

        if (total - Decimal::ONE).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(ModelError::InvalidProfile(format!(
                "issue weights sum to {total}, expected 1"
            )));
        }
        Ok(())
    }
}

impl UtilitySpace for LinearAdditiveProfile {
    fn domain(&self) -> &Domain {
        &self.domain
    }

    fn utility(&self, bid: &Bid) -> Decimal {
        self.issue_weights
            .iter()
            .map(|(issue, weight)| {
                let value_utility = bid
                    .value(issue)
                    .and_then(|v| self.value_utilities.get(issue)?.get(v))
                    .copied()
                    .unwrap_or(Decimal::ZERO);
                *weight * value_utility
            })
            .sum()
    }

    fn best_value(&self, issue: &str) -> Option<&Value> {
        self.value_utilities
            .get(issue)?
            .iter()
            .max_by(|a, b| a.1.cmp(b.1))
            .map(|(value, _)| value)
    }
}
