use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// One concrete option for an issue.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Value(String);

impl Value {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The possible values of a single issue.
///
/// Only `Discrete` sets can be negotiated over. `Continuous` exists so that
/// domain descriptions carrying numeric ranges can be loaded and then
/// rejected with a proper error instead of being silently discretised.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValueSet {
    Discrete { values: Vec<Value> },
    Continuous { low: f64, high: f64 },
}

impl ValueSet {
    pub fn discrete<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        ValueSet::Discrete {
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// The finite value list, or `None` for a continuous range.
    pub fn as_discrete(&self) -> Option<&[Value]> {
        match self {
            ValueSet::Discrete { values } => Some(values),
            ValueSet::Continuous { .. } => None,
        }
    }

    pub fn contains(&self, value: &Value) -> bool {
        match self {
            ValueSet::Discrete { values } => values.contains(value),
            ValueSet::Continuous { low, high } => value
                .as_str()
                .parse::<f64>()
                .map(|v| v >= *low && v <= *high)
                .unwrap_or(false),
        }
    }
}

/// The negotiation domain: every issue with its value set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Domain {
    pub name: String,
    pub issues: BTreeMap<String, ValueSet>,
}

impl Domain {
    pub fn new(name: impl Into<String>, issues: BTreeMap<String, ValueSet>) -> Self {
        Self {
            name: name.into(),
            issues,
        }
    }

    pub fn value_set(&self, issue: &str) -> Option<&ValueSet> {
        self.issues.get(issue)
    }

    /// Number of bids in the full cross-product. Saturates at `u64::MAX`.
    pub fn bid_space_size(&self) -> Result<u64, ModelError> {
        if self.issues.is_empty() {
            return Err(ModelError::EmptyDomain(self.name.clone()));
        }
        let mut size: u64 = 1;
        for (issue, set) in &self.issues {
            let values = set.as_discrete().ok_or_else(|| ModelError::NonDiscreteIssue {
                issue: issue.clone(),
            })?;
            if values.is_empty() {
                return Err(ModelError::EmptyIssue {
                    issue: issue.clone(),
                });
            }
            size = size.saturating_mul(values.len() as u64);
        }
        Ok(size)
    }

    /// Enumerate every bid of the domain.
    ///
    /// Fails for continuous issues and for spaces larger than `limit`.
    pub fn all_bids(&self, limit: u64) -> Result<Vec<Bid>, ModelError> {
        let size = self.bid_space_size()?;
        if size > limit {
            return Err(ModelError::BidSpaceTooLarge { size, limit });
        }

        let axes: Vec<(&String, &[Value])> = self
            .issues
            .iter()
            .filter_map(|(issue, set)| set.as_discrete().map(|values| (issue, values)))
            .collect();

        // Odometer over the value indices, last issue spinning fastest.
        let mut cursor = vec![0usize; axes.len()];
        let mut bids = Vec::with_capacity(size as usize);
        loop {
            let bid: Bid = axes
                .iter()
                .zip(&cursor)
                .map(|((issue, values), &i)| ((*issue).clone(), values[i].clone()))
                .collect();
            bids.push(bid);

            let mut axis = axes.len();
            loop {
                if axis == 0 {
                    return Ok(bids);
                }
                axis -= 1;
                cursor[axis] += 1;
                if cursor[axis] < axes[axis].1.len() {
                    break;
                }
                cursor[axis] = 0;
            }
        }
    }

    /// Check that a bid assigns exactly one in-domain value to every issue.
    pub fn validate_bid(&self, bid: &Bid) -> Result<(), ModelError> {
        for issue in bid.issues() {
            if !self.issues.contains_key(issue) {
                return Err(ModelError::UnknownIssue {
                    issue: issue.to_string(),
                });
            }
        }
        for (issue, set) in &self.issues {
            let value = bid.value(issue).ok_or_else(|| ModelError::MissingIssue {
                issue: issue.clone(),
            })?;
            if !set.contains(value) {
                return Err(ModelError::UnknownValue {
                    issue: issue.clone(),
                    value: value.to_string(),
                });
            }
        }
        Ok(())
    }
}

/// A complete assignment of one value to every issue. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Bid(BTreeMap<String, Value>);

impl Bid {
    pub fn new(values: BTreeMap<String, Value>) -> Self {
        Self(values)
    }

    pub fn value(&self, issue: &str) -> Option<&Value> {
        self.0.get(issue)
    }

    pub fn issues(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn issue_values(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Bid {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl fmt::Display for Bid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (issue, value)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{issue}={value}")?;
        }
        f.write_str("}")
    }
}
