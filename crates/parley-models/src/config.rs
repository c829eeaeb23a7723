use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Top-level configuration for a negotiation agent.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ParleyConfig {
    #[serde(default)]
    pub strategy: StrategyConfig,
    #[serde(default)]
    pub time_pressure: TimePressureConfig,
    #[serde(default)]
    pub acceptance: AcceptanceConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

impl ParleyConfig {
    pub fn from_toml(s: &str) -> Result<Self, ModelError> {
        let config: Self =
            toml::from_str(s).map_err(|e| ModelError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        let s = &self.strategy;
        let unit = |name: &str, v: f64| {
            if (0.0..=1.0).contains(&v) {
                Ok(())
            } else {
                Err(ModelError::InvalidConfig(format!(
                    "{name} must be in [0, 1], got {v}"
                )))
            }
        };

        unit("strategy.initial_iso_level", s.initial_iso_level)?;
        unit("strategy.initial_minimum_utility", s.initial_minimum_utility)?;
        unit("strategy.iso_floor", s.iso_floor)?;
        unit("acceptance.late_progress", self.acceptance.late_progress)?;
        unit("acceptance.terminal_progress", self.acceptance.terminal_progress)?;

        if !(s.iso_increment > 0.0 && s.iso_increment < 1.0) {
            return Err(ModelError::InvalidConfig(format!(
                "strategy.iso_increment must be in (0, 1), got {}",
                s.iso_increment
            )));
        }
        if s.search_budget == 0 || s.max_search_retries == 0 || s.max_bid_space == 0 {
            return Err(ModelError::InvalidConfig(
                "strategy.search_budget, max_search_retries and max_bid_space must be positive"
                    .to_string(),
            ));
        }
        if s.stuck_window_own < 2 || s.stuck_window_opponent < 2 {
            return Err(ModelError::InvalidConfig(
                "stuck windows need at least two bids".to_string(),
            ));
        }

        // exp(1 / -(base - slope * p)) needs a positive denominator for all p in [0, 1].
        let tp = &self.time_pressure;
        if !tp.base.is_finite()
            || !tp.slope.is_finite()
            || tp.base <= 0.0
            || tp.base - tp.slope.max(0.0) <= 0.0
        {
            return Err(ModelError::InvalidConfig(format!(
                "time_pressure base {} and slope {} reach zero before the deadline",
                tp.base, tp.slope
            )));
        }

        if self.session.deadline_rounds == 0 {
            return Err(ModelError::InvalidConfig(
                "session.deadline_rounds must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Which opponent-preference estimator to run.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EstimatorKind {
    /// Value counts weighted by concentration and repeat streaks.
    #[default]
    Frequency,
    /// Beta-posterior mean per value.
    Bayesian,
}

/// Bid search and concession parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StrategyConfig {
    pub estimator: EstimatorKind,
    /// Own-utility target at session start.
    pub initial_iso_level: f64,
    /// Half-width of the iso band, also the step when the band is lowered.
    pub iso_increment: f64,
    /// Minimum acceptable utility before the first time-pressure refresh.
    pub initial_minimum_utility: f64,
    /// Qualifying candidates considered per band scan.
    pub search_budget: usize,
    /// Band lowerings allowed in a single search before falling back.
    pub max_search_retries: usize,
    /// The iso level is never lowered below this.
    pub iso_floor: f64,
    /// Own proposals compared by the stuck-negotiation rule.
    pub stuck_window_own: usize,
    /// Opponent offers compared by the stuck-negotiation rule.
    pub stuck_window_opponent: usize,
    /// Refuse to enumerate domains larger than this.
    pub max_bid_space: u64,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            estimator: EstimatorKind::Frequency,
            initial_iso_level: 0.95,
            iso_increment: 0.05,
            initial_minimum_utility: 0.90,
            search_budget: 10,
            max_search_retries: 40,
            iso_floor: 0.0,
            stuck_window_own: 4,
            stuck_window_opponent: 2,
            max_bid_space: 1_000_000,
        }
    }
}

/// Boulware curve `exp(1 / -(base - slope * progress))`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TimePressureConfig {
    pub base: f64,
    pub slope: f64,
}

impl Default for TimePressureConfig {
    fn default() -> Self {
        Self {
            base: 10.0,
            slope: 7.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AcceptanceConfig {
    /// Past this progress, offers above the minimum utility are accepted.
    pub late_progress: f64,
    /// Past this progress, any offer is accepted.
    pub terminal_progress: f64,
}

impl Default for AcceptanceConfig {
    fn default() -> Self {
        Self {
            late_progress: 0.8,
            terminal_progress: 0.99,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SessionConfig {
    /// Rounds until the deadline when progress is measured in rounds.
    pub deadline_rounds: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            deadline_rounds: 100,
        }
    }
}
