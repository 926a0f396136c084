pub mod config;
pub mod crawler;
pub mod etherscan;
pub mod frontier;
pub mod models;
pub mod store;
pub mod validation;

#[cfg(test)]
pub mod tests;

// Re-export specific items for convenience
pub use config::{Cli, Config, ConfigError};
pub use crawler::{CrawlError, CrawlMode, CrawlSummary, Crawler};
pub use etherscan::client::{EtherscanClient, FetchError, MAX_TRIAL_COUNT};
pub use frontier::{neighbors_of, Frontier};
pub use models::{Address, ExploredEntry, ExploredIndex, TransactionRecord, TransactionTable};
pub use store::{RunPaths, StoreError};
pub use validation::{validate_eth_address, ValidationError};
