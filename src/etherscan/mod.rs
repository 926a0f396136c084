pub mod client;
pub mod models;
pub mod pacer;

pub use client::{EtherscanClient, FetchError, MAX_TRIAL_COUNT};
pub use pacer::RequestPacer;
