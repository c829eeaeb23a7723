use parley_cache::CacheError;
use parley_models::ModelError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Issue {issue} is not discrete; only finite value sets can be estimated")]
    NonDiscreteIssue { issue: String },

    #[error("Invalid bid: {0}")]
    InvalidBid(#[from] ModelError),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
