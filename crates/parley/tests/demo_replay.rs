//! Replays the bundled demo session end to end.

use std::path::PathBuf;

use parley::models::{Action, Bid};

fn workspace_file(relative: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../..")
        .join(relative)
}

#[test]
fn demo_session_replays() {
    let config = parley::load_config(workspace_file("config/parley.toml")).unwrap();
    let profile = parley::load_profile(workspace_file("demos/laptop-buyer.json")).unwrap();
    let offers: Vec<Bid> = serde_json::from_str(
        &std::fs::read_to_string(workspace_file("demos/seller-offers.json")).unwrap(),
    )
    .unwrap();
    let offer_count = offers.len();

    let outcome = parley::replay(&config, profile, offers).unwrap();

    assert!(!outcome.actions.is_empty());
    assert!(outcome.actions.len() <= offer_count);
    assert_eq!(outcome.record.received.len(), outcome.actions.len());
    // Our opening is our best bid: Apple, 32GB, 13in.
    let expected: Bid = [("brand", "Apple"), ("memory", "32GB"), ("screen", "13in")]
        .into_iter()
        .collect();
    assert_eq!(outcome.actions[0], Action::Propose(expected));

    let proposals: Vec<&Bid> = outcome
        .actions
        .iter()
        .filter(|a| !a.is_accept())
        .map(Action::bid)
        .collect();
    let unique: std::collections::HashSet<&Bid> = proposals.iter().copied().collect();
    assert_eq!(unique.len(), proposals.len());
}
