use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parley_cache::{BidSpaceCache, ScoredBid};
use parley_models::session::RECORD_SCHEMA_VERSION;
use parley_models::{
    Action, Bid, OfferRecord, ParleyConfig, ProposalRecord, SessionRecord, UtilitySpace, Value,
};
use rust_decimal::prelude::ToPrimitive;
use tracing::{debug, info};
use uuid::Uuid;

use crate::acceptance::AcceptanceEvaluator;
use crate::agreement::{infer_agreed_issues, AgreedIssues};
use crate::clock::ProgressClock;
use crate::concession::{AspirationState, ConcessionController};
use crate::error::AgentError;
use crate::opponent_model::OpponentModel;
use crate::selector::BidSelector;

/// The negotiating agent: learns the opponent from its offers and decides,
/// on each of our turns, whether to accept or what to propose.
///
/// The surrounding protocol calls `observe_offer` when the opponent makes an
/// offer, `take_turn` when it is our move, and `on_session_end` when the
/// negotiation is over. Calls never overlap.
pub struct Negotiator {
    config: ParleyConfig,
    profile: Arc<dyn UtilitySpace>,
    clock: Arc<dyn ProgressClock>,
    cache: BidSpaceCache,
    best_values: BTreeMap<String, Value>,
    opponent: Option<OpponentModel>,
    concession: ConcessionController,
    selector: BidSelector,
    acceptance: AcceptanceEvaluator,
    agreed: AgreedIssues,
    last_received: Option<ScoredBid>,
    received: Vec<OfferRecord>,
    proposed: Vec<ProposalRecord>,
    proposed_bids: HashSet<Bid>,
    agreement: Option<Bid>,
    round: u32,
    session_id: Uuid,
    started_at: DateTime<Utc>,
}

impl Negotiator {
    /// Validate the config and score the full bid space of `profile`.
    pub fn new(
        config: ParleyConfig,
        profile: Arc<dyn UtilitySpace>,
        clock: Arc<dyn ProgressClock>,
    ) -> Result<Self, AgentError> {
        config
            .validate()
            .map_err(|e| AgentError::Config(e.to_string()))?;

        let cache = BidSpaceCache::build(profile.as_ref(), config.strategy.max_bid_space)?;
        let best_values: BTreeMap<String, Value> = profile
            .domain()
            .issues
            .keys()
            .filter_map(|issue| Some((issue.clone(), profile.best_value(issue)?.clone())))
            .collect();
        let session_id = Uuid::new_v4();

        info!(
            session = %session_id,
            domain = %profile.domain().name,
            bids = cache.len(),
            estimator = ?config.strategy.estimator,
            "Negotiator ready"
        );

        Ok(Self {
            concession: ConcessionController::new(&config),
            selector: BidSelector::from_config(&config.strategy),
            acceptance: AcceptanceEvaluator::new(&config.acceptance),
            config,
            profile,
            clock,
            cache,
            best_values,
            opponent: None,
            agreed: AgreedIssues::new(),
            last_received: None,
            received: Vec::new(),
            proposed: Vec::new(),
            proposed_bids: HashSet::new(),
            agreement: None,
            round: 0,
            session_id,
            started_at: Utc::now(),
        })
    }

    /// Feed one opponent offer into the model.
    ///
    /// The opponent model is created on the first offer. An offer that does
    /// not fit the domain is rejected and leaves all state unchanged.
    pub fn observe_offer(&mut self, bid: Bid) -> Result<(), AgentError> {
        if self.opponent.is_none() {
            self.opponent = Some(OpponentModel::new(
                self.profile.domain(),
                self.config.strategy.estimator,
            )?);
        }
        if let Some(model) = self.opponent.as_mut() {
            model.update(&bid)?;
        }

        self.round += 1;
        let utility = self.profile.utility(&bid);
        self.agreed = infer_agreed_issues(
            &bid,
            &self.best_values,
            self.proposed.last().map(|p| &p.bid),
        );

        debug!(
            round = self.round,
            bid = %bid,
            own_utility = %utility,
            agreed = self.agreed.len(),
            "Received offer"
        );

        self.received.push(OfferRecord {
            round: self.round,
            bid: bid.clone(),
            own_utility: utility,
            received_at: Utc::now(),
        });
        self.last_received = Some(ScoredBid::new(bid, utility));
        Ok(())
    }

    /// The opponent accepted one of our offers.
    pub fn observe_accept(&mut self, bid: Bid) {
        info!(session = %self.session_id, bid = %bid, "Opponent accepted");
        self.agreement = Some(bid);
    }

    /// Decide this turn's action.
    pub fn take_turn(&mut self) -> Action {
        let progress = self.clock.progress();

        let own_history: Vec<f64> = self
            .proposed
            .iter()
            .map(|p| p.own_utility.to_f64().unwrap_or(0.0))
            .collect();
        let opponent_history: Vec<f64> = self
            .received
            .iter()
            .map(|r| r.own_utility.to_f64().unwrap_or(0.0))
            .collect();
        self.concession
            .refresh(progress, &own_history, &opponent_history);
        let minimum_utility = self.concession.minimum_utility();

        let selection = self.selector.search(
            self.opponent.as_ref(),
            &self.cache,
            self.concession.aspiration_mut(),
            &self.agreed,
            &self.proposed_bids,
            minimum_utility,
        );
        let projected = selection.scored.clone();
        let predicted = selection.predicted_opponent_utility;
        let path = selection.path;

        if let Some(reason) = self.acceptance.evaluate(
            self.last_received.as_ref(),
            &projected,
            minimum_utility,
            progress,
        ) {
            if let Some(offer) = &self.last_received {
                info!(
                    session = %self.session_id,
                    round = self.round,
                    progress,
                    ?reason,
                    own_utility = %offer.utility,
                    "Accepting offer"
                );
                self.agreement = Some(offer.bid.clone());
                return Action::Accept(offer.bid.clone());
            }
        }

        let iso_level = self.concession.aspiration().iso_level();
        debug!(
            round = self.round,
            progress,
            ?path,
            iso_level,
            minimum_utility,
            own_utility = %projected.utility,
            predicted,
            "Proposing bid"
        );

        self.proposed_bids.insert(projected.bid.clone());
        self.proposed.push(ProposalRecord {
            round: self.round,
            bid: projected.bid.clone(),
            own_utility: projected.utility,
            predicted_opponent_utility: predicted,
            iso_level,
            proposed_at: Utc::now(),
        });
        Action::Propose(projected.bid)
    }

    /// Summarise the session for a session sink.
    pub fn on_session_end(&self) -> SessionRecord {
        let record = SessionRecord {
            session_id: self.session_id,
            schema_version: RECORD_SCHEMA_VERSION,
            started_at: self.started_at,
            ended_at: Utc::now(),
            received: self.received.clone(),
            proposed: self.proposed.clone(),
            agreement: self.agreement.clone(),
            final_iso_level: self.concession.aspiration().iso_level(),
            final_minimum_utility: self.concession.minimum_utility(),
            opponent_weights: self
                .opponent
                .as_ref()
                .map(|m| m.normalized_weights().clone())
                .unwrap_or_default(),
        };
        info!(
            session = %self.session_id,
            received = record.received.len(),
            proposed = record.proposed.len(),
            agreed = record.agreed(),
            "Session ended"
        );
        record
    }

    pub fn aspiration(&self) -> &AspirationState {
        self.concession.aspiration()
    }

    pub fn minimum_utility(&self) -> f64 {
        self.concession.minimum_utility()
    }

    pub fn opponent_model(&self) -> Option<&OpponentModel> {
        self.opponent.as_ref()
    }

    pub fn agreed_issues(&self) -> &AgreedIssues {
        &self.agreed
    }

    pub fn bid_space(&self) -> &BidSpaceCache {
        &self.cache
    }

    pub fn proposed_bids(&self) -> &HashSet<Bid> {
        &self.proposed_bids
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }
}
