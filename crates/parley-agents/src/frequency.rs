use std::collections::BTreeMap;

use parley_models::Value;

use crate::estimator::IssueEstimator;

/// Streak weight gained each time the opponent repeats its previous value.
const STREAK_STEP: f64 = 0.025;
const STREAK_CAP: f64 = 0.5;

#[derive(Debug, Clone, Default)]
struct ValueCounter {
    count: u32,
    utility: f64,
}

impl ValueCounter {
    /// Power-law transform of the count relative to the most frequent value.
    /// A low issue weight flattens differences between values.
    fn recalculate(&mut self, max_count: u32, weight: f64) {
        let exponent = 1.0 - weight;
        let scaled_max = (f64::from(max_count) + 1.0).powf(exponent) - 1.0;
        self.utility = if weight < 1.0 && scaled_max > 0.0 {
            let scaled = (f64::from(self.count) + 1.0).powf(exponent) - 1.0;
            (scaled / scaled_max).clamp(0.0, 1.0)
        } else if self.count == max_count {
            1.0
        } else {
            0.0
        };
    }
}

/// Frequency estimator: an issue matters to the opponent when it keeps
/// offering the same value (high max count, low entropy, long streaks).
#[derive(Debug, Clone)]
pub struct FrequencyIssueEstimator {
    issue: String,
    /// Only values seen so far; unseen values have utility 0.
    values: BTreeMap<Value, ValueCounter>,
    bids_received: u32,
    max_count: u32,
    previous: Option<Value>,
    frequency_weight: f64,
    streak_weight: f64,
}

impl FrequencyIssueEstimator {
    pub fn new(issue: &str) -> Self {
        Self {
            issue: issue.to_string(),
            values: BTreeMap::new(),
            bids_received: 0,
            max_count: 0,
            previous: None,
            frequency_weight: 0.0,
            streak_weight: 0.0,
        }
    }

    pub fn issue(&self) -> &str {
        &self.issue
    }

    pub fn count_of(&self, value: &Value) -> u32 {
        self.values.get(value).map_or(0, |c| c.count)
    }

    pub fn frequency_weight(&self) -> f64 {
        self.frequency_weight
    }

    pub fn streak_weight(&self) -> f64 {
        self.streak_weight
    }

    /// `1 - H / H_max` over the observed value distribution, where `H_max`
    /// is `log2(distinct values seen)`, or 1 with a single distinct value.
    fn inverse_entropy(&self) -> f64 {
        if self.bids_received == 0 {
            return 1.0;
        }
        let total = f64::from(self.bids_received);
        let entropy: f64 = self
            .values
            .values()
            .filter(|c| c.count > 0)
            .map(|c| {
                let p = f64::from(c.count) / total;
                -p * p.log2()
            })
            .sum();
        let max_entropy = if self.values.len() > 1 {
            (self.values.len() as f64).log2()
        } else {
            1.0
        };
        (1.0 - entropy / max_entropy).max(0.0)
    }
}

impl IssueEstimator for FrequencyIssueEstimator {
    fn update(&mut self, value: &Value) {
        self.bids_received += 1;

        match &self.previous {
            Some(previous) if previous == value => {
                self.streak_weight = (self.streak_weight + STREAK_STEP).min(STREAK_CAP);
            }
            Some(_) => self.streak_weight = 0.0,
            None => {}
        }
        self.previous = Some(value.clone());

        let counter = self.values.entry(value.clone()).or_default();
        counter.count += 1;
        self.max_count = self.max_count.max(counter.count);

        let max_share = f64::from(self.max_count) / f64::from(self.bids_received);
        self.frequency_weight = max_share * max_share * self.inverse_entropy();

        let (max_count, weight) = (self.max_count, self.frequency_weight);
        for counter in self.values.values_mut() {
            counter.recalculate(max_count, weight);
        }
    }

    fn utility_of(&self, value: &Value) -> f64 {
        self.values.get(value).map_or(0.0, |c| c.utility)
    }

    fn weight(&self) -> f64 {
        self.frequency_weight + self.streak_weight
    }

    fn bids_received(&self) -> u32 {
        self.bids_received
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(estimator: &mut FrequencyIssueEstimator, values: &[&str]) {
        for v in values {
            estimator.update(&Value::from(*v));
        }
    }

    #[test]
    fn constant_value_is_rigid() {
        let mut estimator = FrequencyIssueEstimator::new("issue1");
        feed(&mut estimator, &["A"; 5]);

        // One distinct value: H = 0, H_max = 1, full frequency weight.
        assert_eq!(estimator.frequency_weight(), 1.0);
        assert!((estimator.streak_weight() - 4.0 * STREAK_STEP).abs() < 1e-12);
        assert_eq!(estimator.utility_of(&Value::from("A")), 1.0);
        assert_eq!(estimator.utility_of(&Value::from("B")), 0.0);
    }

    #[test]
    fn streak_resets_on_change_and_caps() {
        let mut estimator = FrequencyIssueEstimator::new("issue1");
        feed(&mut estimator, &["A", "A", "A"]);
        assert!(estimator.streak_weight() > 0.0);

        feed(&mut estimator, &["B"]);
        assert_eq!(estimator.streak_weight(), 0.0);

        feed(&mut estimator, &["B"; 100]);
        assert_eq!(estimator.streak_weight(), STREAK_CAP);
    }

    #[test]
    fn cycling_values_have_low_weight() {
        let mut estimator = FrequencyIssueEstimator::new("issue2");
        feed(&mut estimator, &["X", "Y", "Z", "X", "Y"]);

        // max share 2/5, near-uniform distribution over three values.
        let expected_entropy = -(2.0 * 0.4 * 0.4f64.log2() + 0.2 * 0.2f64.log2());
        let expected = 0.16 * (1.0 - expected_entropy / 3f64.log2());
        assert!((estimator.frequency_weight() - expected).abs() < 1e-9);
        assert_eq!(estimator.streak_weight(), 0.0);

        let x = estimator.utility_of(&Value::from("X"));
        let y = estimator.utility_of(&Value::from("Y"));
        let z = estimator.utility_of(&Value::from("Z"));
        assert_eq!(x, 1.0);
        assert_eq!(y, 1.0);
        assert!(z > 0.0 && z < 1.0);
    }

    #[test]
    fn low_weight_flattens_value_utilities() {
        let mut flat = ValueCounter {
            count: 1,
            utility: 0.0,
        };
        flat.recalculate(4, 0.0);
        let mut steep = flat.clone();
        steep.recalculate(4, 0.9);

        // With weight 0 the transform is linear in (count + 1).
        assert!((flat.utility - 1.0 / 4.0).abs() < 1e-12);
        assert!(steep.utility > flat.utility);
    }

    #[test]
    fn utilities_stay_in_unit_interval() {
        let mut estimator = FrequencyIssueEstimator::new("issue");
        let sequence = ["a", "b", "a", "c", "a", "a", "d", "b", "a", "a", "a"];
        for v in sequence {
            estimator.update(&Value::from(v));
            for candidate in ["a", "b", "c", "d", "e"] {
                let u = estimator.utility_of(&Value::from(candidate));
                assert!((0.0..=1.0).contains(&u), "utility {u} for {candidate}");
            }
            assert!(estimator.weight() >= 0.0);
        }
        assert_eq!(estimator.count_of(&Value::from("a")), 7);
    }
}
