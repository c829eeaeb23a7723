use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Issue {issue} does not have a finite discrete value set")]
    NonDiscreteIssue { issue: String },

    #[error("Domain {0} has no issues")]
    EmptyDomain(String),

    #[error("Issue {issue} has no values")]
    EmptyIssue { issue: String },

    #[error("Bid space has {size} bids, limit is {limit}")]
    BidSpaceTooLarge { size: u64, limit: u64 },

    #[error("Bid is missing issue {issue}")]
    MissingIssue { issue: String },

    #[error("Bid sets unknown issue {issue}")]
    UnknownIssue { issue: String },

    #[error("Value {value} is not in the domain of issue {issue}")]
    UnknownValue { issue: String, value: String },

    #[error("Invalid profile: {0}")]
    InvalidProfile(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
