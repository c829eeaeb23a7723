use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::Bid;

pub const RECORD_SCHEMA_VERSION: u32 = 1;

/// What the agent does on its turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "bid", rename_all = "snake_case")]
pub enum Action {
    /// Accept the opponent's last offer.
    Accept(Bid),
    /// Counter with a new offer.
    Propose(Bid),
}

impl Action {
    pub fn bid(&self) -> &Bid {
        match self {
            Action::Accept(bid) | Action::Propose(bid) => bid,
        }
    }

    pub fn is_accept(&self) -> bool {
        matches!(self, Action::Accept(_))
    }
}

/// An offer received from the opponent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OfferRecord {
    pub round: u32,
    pub bid: Bid,
    /// Our own utility for the offer.
    pub own_utility: Decimal,
    pub received_at: DateTime<Utc>,
}

/// An offer we sent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProposalRecord {
    pub round: u32,
    pub bid: Bid,
    pub own_utility: Decimal,
    /// Opponent model estimate at the time of proposing; 0 without data.
    pub predicted_opponent_utility: f64,
    pub iso_level: f64,
    pub proposed_at: DateTime<Utc>,
}

/// End-of-session summary handed to a session sink.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionRecord {
    pub session_id: Uuid,
    pub schema_version: u32,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub received: Vec<OfferRecord>,
    pub proposed: Vec<ProposalRecord>,
    pub agreement: Option<Bid>,
    pub final_iso_level: f64,
    pub final_minimum_utility: f64,
    /// Normalized opponent issue weights at the end of the session.
    pub opponent_weights: BTreeMap<String, f64>,
}

impl SessionRecord {
    pub fn agreed(&self) -> bool {
        self.agreement.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample_record() -> SessionRecord {
        let bid: Bid = [("issue1", "A"), ("issue2", "X")].into_iter().collect();
        let now = Utc::now();
        SessionRecord {
            session_id: Uuid::new_v4(),
            schema_version: RECORD_SCHEMA_VERSION,
            started_at: now,
            ended_at: now,
            received: vec![OfferRecord {
                round: 1,
                bid: bid.clone(),
                own_utility: dec!(0.42),
                received_at: now,
            }],
            proposed: vec![ProposalRecord {
                round: 1,
                bid: bid.clone(),
                own_utility: dec!(0.42),
                predicted_opponent_utility: 0.75,
                iso_level: 0.95,
                proposed_at: now,
            }],
            agreement: Some(bid),
            final_iso_level: 0.9,
            final_minimum_utility: 0.88,
            opponent_weights: BTreeMap::from([
                ("issue1".to_string(), 0.7),
                ("issue2".to_string(), 0.3),
            ]),
        }
    }

    #[test]
    fn roundtrip_session_record() {
        let record = sample_record();
        let json = serde_json::to_string(&record).unwrap();
        let deserialized: SessionRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(record, deserialized);
        assert!(deserialized.agreed());
    }

    #[test]
    fn action_serialization() {
        let bid: Bid = [("issue1", "B")].into_iter().collect();
        let json = serde_json::to_string(&Action::Accept(bid.clone())).unwrap();
        assert_eq!(json, r#"{"type":"accept","bid":{"issue1":"B"}}"#);

        let parsed: Action =
            serde_json::from_str(r#"{"type":"propose","bid":{"issue1":"B"}}"#).unwrap();
        assert_eq!(parsed, Action::Propose(bid.clone()));
        assert!(!parsed.is_accept());
        assert_eq!(parsed.bid(), &bid);
    }
}
