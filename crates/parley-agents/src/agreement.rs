use std::collections::BTreeMap;

use parley_models::{Bid, Value};

/// Issues the opponent appears to have settled, with the settled value.
pub type AgreedIssues = BTreeMap<String, Value>;

/// Infer the agreed issues from the latest opponent offer.
///
/// An issue counts as agreed when the opponent's value equals our own best
/// value for it, or the value we offered in our last proposal. The result is
/// rebuilt from scratch on every offer.
pub fn infer_agreed_issues(
    offer: &Bid,
    best_values: &BTreeMap<String, Value>,
    last_own: Option<&Bid>,
) -> AgreedIssues {
    offer
        .issue_values()
        .filter(|(issue, value)| {
            best_values.get(*issue) == Some(*value)
                || last_own.and_then(|own| own.value(issue)) == Some(*value)
        })
        .map(|(issue, value)| (issue.to_string(), value.clone()))
        .collect()
}

/// Whether `bid` keeps every agreed value.
pub fn honours_agreement(bid: &Bid, agreed: &AgreedIssues) -> bool {
    agreed
        .iter()
        .all(|(issue, value)| bid.value(issue) == Some(value))
}
