pub mod bid_space;
pub mod error;

pub use bid_space::{BidSpaceCache, ScoredBid};
pub use error::CacheError;
