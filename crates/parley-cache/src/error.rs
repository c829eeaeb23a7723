use parley_models::ModelError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Domain error: {0}")]
    Model(#[from] ModelError),

    #[error("Bid space of domain {0} is empty")]
    Empty(String),
}
