pub mod acceptance;
pub mod agreement;
pub mod bayesian;
pub mod clock;
pub mod concession;
pub mod error;
pub mod estimator;
pub mod frequency;
pub mod negotiator;
pub mod opponent_model;
pub mod selector;
pub mod sink;

pub mod test_support;

pub use acceptance::{AcceptReason, AcceptanceEvaluator};
pub use agreement::{honours_agreement, infer_agreed_issues, AgreedIssues};
pub use bayesian::BayesianIssueEstimator;
pub use clock::{DeadlineClock, ProgressClock, RoundClock};
pub use concession::{minimum_utility, AspirationState, ConcessionController};
pub use error::AgentError;
pub use estimator::{build_estimator, IssueEstimator};
pub use frequency::FrequencyIssueEstimator;
pub use negotiator::Negotiator;
pub use opponent_model::OpponentModel;
pub use selector::{BidSelector, Selection, SelectionPath};
pub use sink::{JsonSink, MemorySink, SessionSink};
