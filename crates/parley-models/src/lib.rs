pub mod config;
pub mod domain;
pub mod error;
pub mod profile;
pub mod session;

pub use config::{
    AcceptanceConfig, EstimatorKind, ParleyConfig, SessionConfig, StrategyConfig,
    TimePressureConfig,
};
pub use domain::{Bid, Domain, Value, ValueSet};
pub use error::ModelError;
pub use profile::{LinearAdditiveProfile, UtilitySpace};
pub use session::{Action, OfferRecord, ProposalRecord, SessionRecord};
