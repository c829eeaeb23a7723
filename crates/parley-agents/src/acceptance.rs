use parley_cache::ScoredBid;
use parley_models::AcceptanceConfig;

/// Why an incoming offer was accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcceptReason {
    /// Late in the session and above the time-pressure minimum.
    LateAboveMinimum,
    /// At the deadline; any agreement beats none.
    Deadline,
    /// Our own next proposal would be no better than the offer.
    NoBetterCounter,
}

/// Decides whether to accept the opponent's last offer.
#[derive(Debug, Clone)]
pub struct AcceptanceEvaluator {
    late_progress: f64,
    terminal_progress: f64,
}

impl AcceptanceEvaluator {
    pub fn new(config: &AcceptanceConfig) -> Self {
        Self {
            late_progress: config.late_progress,
            terminal_progress: config.terminal_progress,
        }
    }

    /// The first acceptance condition that holds, if any.
    pub fn evaluate(
        &self,
        incoming: Option<&ScoredBid>,
        projected: &ScoredBid,
        minimum_utility: f64,
        progress: f64,
    ) -> Option<AcceptReason> {
        let incoming = incoming?;

        if incoming.utility_f64() > minimum_utility && progress > self.late_progress {
            Some(AcceptReason::LateAboveMinimum)
        } else if progress > self.terminal_progress {
            Some(AcceptReason::Deadline)
        } else if projected.utility <= incoming.utility {
            Some(AcceptReason::NoBetterCounter)
        } else {
            None
        }
    }

    pub fn accept(
        &self,
        incoming: Option<&ScoredBid>,
        projected: &ScoredBid,
        minimum_utility: f64,
        progress: f64,
    ) -> bool {
        self.evaluate(incoming, projected, minimum_utility, progress)
            .is_some()
    }
}
