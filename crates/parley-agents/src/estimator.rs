use std::fmt;

use parley_models::{EstimatorKind, Value, ValueSet};

use crate::bayesian::BayesianIssueEstimator;
use crate::error::AgentError;
use crate::frequency::FrequencyIssueEstimator;

/// Online estimate of how the opponent values one issue.
///
/// Implementations see the opponent's chosen value for the issue once per
/// received offer. `weight` is the unnormalized issue importance in
/// `[0, inf)`; the opponent model normalizes across issues.
pub trait IssueEstimator: Send + Sync + fmt::Debug {
    fn update(&mut self, value: &Value);

    /// Estimated opponent utility of `value`, in [0, 1].
    fn utility_of(&self, value: &Value) -> f64;

    fn weight(&self) -> f64;

    fn bids_received(&self) -> u32;
}

/// Build the estimator for one issue, rejecting non-discrete value sets.
pub fn build_estimator(
    kind: EstimatorKind,
    issue: &str,
    values: &ValueSet,
) -> Result<Box<dyn IssueEstimator>, AgentError> {
    let discrete = values
        .as_discrete()
        .ok_or_else(|| AgentError::NonDiscreteIssue {
            issue: issue.to_string(),
        })?;

    Ok(match kind {
        EstimatorKind::Frequency => Box::new(FrequencyIssueEstimator::new(issue)),
        EstimatorKind::Bayesian => Box::new(BayesianIssueEstimator::new(issue, discrete)),
    })
}
