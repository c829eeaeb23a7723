//! End-to-end negotiation scenarios.
//!
//! Each test drives a `Negotiator` over the two-issue fixture domain with a
//! scripted opponent, the way a protocol driver would: observe the opponent's
//! offer, then take our turn.

use std::collections::HashSet;
use std::sync::Arc;

use parley_agents::test_support::{bid, two_issue_profile, ManualClock, ScriptedOpponent};
use parley_agents::{
    ConcessionController, JsonSink, MemorySink, Negotiator, ProgressClock, RoundClock, SessionSink,
};
use parley_models::{Action, Bid, EstimatorKind, ParleyConfig, SessionRecord, Value};
use rust_decimal::prelude::ToPrimitive;

fn negotiator(config: ParleyConfig, clock: Arc<dyn ProgressClock>) -> Negotiator {
    Negotiator::new(config, Arc::new(two_issue_profile()), clock).unwrap()
}

fn bayesian_config() -> ParleyConfig {
    let mut config = ParleyConfig::default();
    config.strategy.estimator = EstimatorKind::Bayesian;
    config
}

/// Play until someone accepts or the script runs out. Returns our actions.
fn play(
    agent: &mut Negotiator,
    clock: &RoundClock,
    opponent: &mut ScriptedOpponent,
    max_rounds: u32,
) -> Vec<Action> {
    let mut actions = Vec::new();
    for _ in 0..max_rounds {
        let Some(offer) = opponent.next_offer() else {
            break;
        };
        agent.observe_offer(offer).unwrap();
        clock.advance();
        let action = agent.take_turn();
        let accepted = action.is_accept();
        actions.push(action);
        if accepted {
            break;
        }
    }
    actions
}

#[test]
fn learns_the_rigid_issue() {
    for config in [ParleyConfig::default(), bayesian_config()] {
        let kind = config.strategy.estimator;
        let mut agent = negotiator(config, Arc::new(ManualClock::new(0.1)));
        let mut opponent =
            ScriptedOpponent::two_issue(&[("A", "X"), ("A", "Y"), ("A", "Z"), ("A", "X"), ("A", "Y")]);
        while let Some(offer) = opponent.next_offer() {
            agent.observe_offer(offer).unwrap();
        }

        let model = agent.opponent_model().unwrap();
        assert_eq!(model.offer_count(), 5);
        let w1 = model.weight_of("issue1").unwrap();
        let w2 = model.weight_of("issue2").unwrap();
        assert!(w1 > w2, "{kind:?}: issue1 {w1} should outweigh issue2 {w2}");

        let a = model.value_utility("issue1", &Value::from("A")).unwrap();
        let b = model.value_utility("issue1", &Value::from("B")).unwrap();
        assert!(a > b, "{kind:?}: A {a} should beat B {b}");
        if kind == EstimatorKind::Frequency {
            assert_eq!(a, 1.0);
            assert_eq!(b, 0.0);
        }
    }
}

#[test]
fn opening_without_offers_is_our_best_bid() {
    let mut agent = negotiator(ParleyConfig::default(), Arc::new(ManualClock::new(0.0)));
    assert_eq!(
        agent.take_turn(),
        Action::Propose(bid(&[("issue1", "A"), ("issue2", "Z")]))
    );
    assert_eq!(agent.round(), 0);
}

#[test]
fn never_repeats_a_proposal_while_unproposed_bids_remain() {
    let clock = Arc::new(ManualClock::new(0.1));
    let mut agent = negotiator(ParleyConfig::default(), clock);
    let mut opponent = ScriptedOpponent::cycling(vec![bid(&[("issue1", "B"), ("issue2", "X")])]);

    let mut seen: HashSet<Bid> = HashSet::new();
    let first = agent.take_turn();
    assert!(seen.insert(first.bid().clone()));

    for _ in 0..3 {
        agent.observe_offer(opponent.next_offer().unwrap()).unwrap();
        match agent.take_turn() {
            Action::Propose(bid) => assert!(seen.insert(bid.clone()), "repeated {bid}"),
            other => panic!("unexpected {other:?}"),
        }
    }
    assert_eq!(agent.proposed_bids().len(), 4);
}

#[test]
fn proposals_stay_at_or_below_the_aspiration_band() {
    let clock = Arc::new(ManualClock::new(0.2));
    let mut agent = negotiator(ParleyConfig::default(), clock);
    let mut opponent = ScriptedOpponent::cycling(vec![
        bid(&[("issue1", "B"), ("issue2", "Y")]),
        bid(&[("issue1", "B"), ("issue2", "X")]),
    ]);

    agent.take_turn();
    for _ in 0..3 {
        agent.observe_offer(opponent.next_offer().unwrap()).unwrap();
        if agent.take_turn().is_accept() {
            break;
        }
    }

    let record = agent.on_session_end();
    // Every proposal after the opening was made at or below the level it
    // was searched at, plus at most one increment.
    let increment = agent.aspiration().iso_increment();
    for proposal in record.proposed.iter().skip(1) {
        let utility = proposal.own_utility.to_f64().unwrap();
        assert!(utility < proposal.iso_level + increment, "{proposal:?}");
    }
    let levels: Vec<f64> = record.proposed.iter().map(|p| p.iso_level).collect();
    assert!(levels.windows(2).all(|w| w[1] <= w[0]), "{levels:?}");
}

#[test]
fn accepts_at_the_deadline() {
    let clock = Arc::new(ManualClock::new(0.5));
    let mut agent = negotiator(ParleyConfig::default(), clock.clone());
    agent.take_turn();

    let worst = bid(&[("issue1", "B"), ("issue2", "X")]);
    agent.observe_offer(worst.clone()).unwrap();
    assert!(!agent.take_turn().is_accept());

    clock.set(0.999);
    agent.observe_offer(worst.clone()).unwrap();
    assert_eq!(agent.take_turn(), Action::Accept(worst));
}

#[test]
fn stubborn_opponent_is_met_once_our_bids_run_out() {
    let clock = Arc::new(RoundClock::new(100));
    let mut agent = negotiator(ParleyConfig::default(), clock.clone());
    let offer = bid(&[("issue1", "B"), ("issue2", "X")]);
    let mut opponent = ScriptedOpponent::cycling(vec![offer.clone()]);

    assert!(!agent.take_turn().is_accept());
    let actions = play(&mut agent, &clock, &mut opponent, 100);

    assert_eq!(actions.last(), Some(&Action::Accept(offer.clone())));
    assert!(clock.round() < 10);
    let record = agent.on_session_end();
    assert_eq!(record.agreement, Some(offer));
    assert!(record.final_iso_level < 0.95);
}

#[test]
fn flat_histories_drop_aspiration_to_minimum() {
    let config = ParleyConfig::default();
    let mut controller = ConcessionController::new(&config);
    let start = controller.aspiration().iso_level();

    assert!(!controller.refresh(0.5, &[1.0, 1.0], &[0.3, 0.3]));
    assert!(controller.refresh(0.5, &[1.0, 1.0, 1.0, 1.0], &[0.3, 0.3]));
    assert!(controller.aspiration().iso_level() < start);
    assert_eq!(
        controller.aspiration().iso_level(),
        controller.minimum_utility()
    );
}

#[test]
fn session_record_reaches_the_sink() {
    let clock = Arc::new(RoundClock::new(20));
    let mut agent = negotiator(bayesian_config(), clock.clone());
    let mut opponent = ScriptedOpponent::two_issue(&[("B", "Y"), ("B", "X"), ("B", "Y")]);

    agent.take_turn();
    play(&mut agent, &clock, &mut opponent, 10);
    let record = agent.on_session_end();
    assert_eq!(record.received.len(), 3);
    let total: f64 = record.opponent_weights.values().sum();
    assert!((total - 1.0).abs() < 1e-9);

    let mut memory = MemorySink::default();
    memory.save(&record).unwrap();
    assert_eq!(memory.records[0].session_id, agent.session_id());

    let mut json = JsonSink::new(Vec::new(), true);
    json.save(&record).unwrap();
    let parsed: SessionRecord = serde_json::from_slice(&json.into_inner()).unwrap();
    assert_eq!(parsed.session_id, record.session_id);
    assert_eq!(parsed.received, record.received);
    assert_eq!(parsed.agreement, record.agreement);
}
