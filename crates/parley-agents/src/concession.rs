use parley_models::{ParleyConfig, TimePressureConfig};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Boulware time pressure: the minimum acceptable own utility at `progress`.
///
/// `exp(1 / -(base - slope * p))` stays close to its start value for most
/// of the session and drops towards the deadline.
pub fn minimum_utility(progress: f64, curve: &TimePressureConfig) -> f64 {
    let p = progress.clamp(0.0, 1.0);
    (1.0 / -(curve.base - curve.slope * p)).exp()
}

/// The own-utility target and the half-width of the band searched around it.
///
/// `iso_level` only ever moves down.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AspirationState {
    iso_level: f64,
    iso_increment: f64,
}

impl AspirationState {
    pub fn new(iso_level: f64, iso_increment: f64) -> Self {
        Self {
            iso_level,
            iso_increment,
        }
    }

    pub fn iso_level(&self) -> f64 {
        self.iso_level
    }

    pub fn iso_increment(&self) -> f64 {
        self.iso_increment
    }

    /// Lower the level to `level`. Returns false, leaving the level as is,
    /// when `level` is not below it.
    pub fn lower_to(&mut self, level: f64) -> bool {
        if level < self.iso_level {
            self.iso_level = level;
            true
        } else {
            false
        }
    }

    /// Lower the level by one increment, never below `floor`.
    /// Returns false once the floor has been reached.
    pub fn step_down(&mut self, floor: f64) -> bool {
        if self.iso_level <= floor {
            return false;
        }
        self.iso_level = (self.iso_level - self.iso_increment).max(floor);
        true
    }
}

/// Keeps the aspiration level in line with time pressure.
#[derive(Debug, Clone)]
pub struct ConcessionController {
    aspiration: AspirationState,
    minimum_utility: f64,
    curve: TimePressureConfig,
    own_window: usize,
    opponent_window: usize,
}

impl ConcessionController {
    pub fn new(config: &ParleyConfig) -> Self {
        let strategy = &config.strategy;
        Self {
            aspiration: AspirationState::new(strategy.initial_iso_level, strategy.iso_increment),
            minimum_utility: strategy.initial_minimum_utility,
            curve: config.time_pressure.clone(),
            own_window: strategy.stuck_window_own,
            opponent_window: strategy.stuck_window_opponent,
        }
    }

    /// Refresh the time-pressure minimum and apply the stuck rule.
    ///
    /// `own_utilities` are our proposals and `opponent_utilities` the
    /// opponent's offers, both as our own utility, oldest first. Returns
    /// true when the stuck rule lowered the aspiration.
    pub fn refresh(
        &mut self,
        progress: f64,
        own_utilities: &[f64],
        opponent_utilities: &[f64],
    ) -> bool {
        self.minimum_utility = minimum_utility(progress, &self.curve);

        if self.aspiration.iso_level() <= self.minimum_utility {
            return false;
        }
        if !self.is_stuck(own_utilities, opponent_utilities) {
            return false;
        }

        let from = self.aspiration.iso_level();
        let lowered = self.aspiration.lower_to(self.minimum_utility);
        if lowered {
            info!(
                from,
                to = self.minimum_utility,
                progress,
                "Negotiation stuck, dropping aspiration to time-pressure minimum"
            );
        }
        lowered
    }

    /// We have not conceded over our last proposals while the opponent's
    /// offers have not improved for us.
    fn is_stuck(&self, own: &[f64], opponent: &[f64]) -> bool {
        if own.len() < self.own_window || opponent.len() < self.opponent_window {
            return false;
        }
        let own_last = own[own.len() - 1];
        let own_earlier = own[own.len() - self.own_window];
        let opp_last = opponent[opponent.len() - 1];
        let opp_earlier = opponent[opponent.len() - self.opponent_window];

        own_last >= own_earlier && opp_last <= opp_earlier
    }

    pub fn aspiration(&self) -> &AspirationState {
        &self.aspiration
    }

    pub fn aspiration_mut(&mut self) -> &mut AspirationState {
        &mut self.aspiration
    }

    pub fn minimum_utility(&self) -> f64 {
        self.minimum_utility
    }
}
