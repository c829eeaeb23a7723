//! Parley - an automated bilateral negotiation agent.
//!
//! The agent learns the opponent's preferences from its offers and searches
//! its own bid space for offers near a conceding aspiration level that the
//! opponent is most likely to accept.
//!
//! # Library Usage
//!
//! ```rust,no_run
//! use parley::models::{Action, Bid, LinearAdditiveProfile, ParleyConfig};
//! use parley::agents::{Negotiator, RoundClock, SessionSink, JsonSink};
//! use parley::cache::BidSpaceCache;
//! ```

pub use parley_agents as agents;
pub use parley_cache as cache;
pub use parley_models as models;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use parley_agents::{Negotiator, ProgressClock, RoundClock};
use parley_models::{Action, Bid, LinearAdditiveProfile, ParleyConfig, SessionRecord};
use serde::Serialize;
use tracing::info;

/// Everything a replay produced: our action for each opponent offer, and
/// the end-of-session record.
#[derive(Debug, Clone, Serialize)]
pub struct ReplayOutcome {
    pub actions: Vec<Action>,
    pub record: SessionRecord,
}

/// Read and validate a TOML config file.
pub fn load_config(path: impl AsRef<Path>) -> Result<ParleyConfig> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config: {}", path.display()))?;
    ParleyConfig::from_toml(&text).with_context(|| "Failed to parse config")
}

/// Read and validate an own-preference profile from JSON.
pub fn load_profile(path: impl AsRef<Path>) -> Result<LinearAdditiveProfile> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read profile: {}", path.display()))?;
    LinearAdditiveProfile::from_json(&text)
        .with_context(|| format!("Invalid profile: {}", path.display()))
}

/// Build a negotiator for one session.
pub fn build_negotiator(
    config: &ParleyConfig,
    profile: LinearAdditiveProfile,
    clock: Arc<dyn ProgressClock>,
) -> Result<Negotiator> {
    Negotiator::new(config.clone(), Arc::new(profile), clock)
        .context("Failed to build negotiator")
}

/// Play a recorded sequence of opponent offers against the agent.
///
/// Each offer advances a round clock, is observed, and is answered with one
/// action. The replay stops at our first acceptance.
pub fn replay(
    config: &ParleyConfig,
    profile: LinearAdditiveProfile,
    offers: Vec<Bid>,
) -> Result<ReplayOutcome> {
    let clock = Arc::new(RoundClock::new(config.session.deadline_rounds));
    let mut negotiator = build_negotiator(config, profile, clock.clone())?;

    let mut actions = Vec::with_capacity(offers.len());
    for (i, offer) in offers.into_iter().enumerate() {
        clock.advance();
        negotiator
            .observe_offer(offer)
            .with_context(|| format!("Rejected opponent offer #{}", i + 1))?;

        let action = negotiator.take_turn();
        let accepted = action.is_accept();
        actions.push(action);
        if accepted {
            break;
        }
    }

    let record = negotiator.on_session_end();
    info!(
        session = %record.session_id,
        rounds = clock.round(),
        agreed = record.agreed(),
        "Replay finished"
    );
    Ok(ReplayOutcome { actions, record })
}
