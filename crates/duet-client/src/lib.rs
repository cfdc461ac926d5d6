//! HTTP client for the duet API, plus the local pairing cache the client
//! keeps so it does not have to look its pair up on every start.

pub mod cache;
pub mod client;
pub mod error;

pub use cache::{CachedPair, PairCache, PairLookup};
pub use client::DuetClient;
pub use error::ClientError;
