use std::env;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use dotenv::dotenv;
use thiserror::Error;

use crate::crawler::CrawlMode;
use crate::models::Address;
use crate::validation::ValidationError;

pub const DEFAULT_SEED_ADDRESS: &str = "0x0000000000000000000000000000000000000000";
const DEFAULT_API_URL: &str = "https://api.etherscan.io/api";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid seed address: {0}")]
    InvalidSeed(#[from] ValidationError),
}

/// Command-line surface of the crawler binary.
#[derive(Parser, Debug)]
#[command(
    name = "token-graph-crawler",
    about = "Rate-limited random-walk crawler for ERC-20 transfer graphs"
)]
pub struct Cli {
    /// Working directory holding this crawl target's state files.
    #[arg(long, default_value = "transaction_data")]
    pub root: PathBuf,

    /// Number of addresses to explore in this run.
    #[arg(long, default_value_t = 5)]
    pub node_count: usize,

    /// Address seeding the frontier when no prior state exists.
    #[arg(long)]
    pub initial_node: Option<String>,

    /// 0: errors only; 1: progress summaries; 2: every request.
    #[arg(long, default_value_t = 1)]
    pub verbose: u8,

    /// Etherscan API credential; lifts the inter-request pause when set.
    #[arg(long)]
    pub api_key: Option<String>,

    /// Do not admit newly discovered counterparties; only work through the
    /// pending list loaded from disk.
    #[arg(long)]
    pub no_expand: bool,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub root: PathBuf,
    pub node_count: usize,
    pub seed: Address,
    pub verbosity: u8,
    pub api_key: String,
    pub api_base_url: String,
    pub request_timeout: Duration,
    pub retry_delay: Duration,
    pub mode: CrawlMode,
}

impl Config {
    /// Resolve the CLI against the environment (.env included).
    pub fn from_cli(cli: Cli) -> Result<Self, ConfigError> {
        dotenv().ok();

        let api_key = cli
            .api_key
            .or_else(|| env::var("ETHERSCAN_API_KEY").ok())
            .unwrap_or_default();
        let api_base_url =
            env::var("ETHERSCAN_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let request_timeout = env::var("REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(30));
        let retry_delay = env::var("RETRY_DELAY_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(Duration::from_millis(500));
        let seed = Address::parse(cli.initial_node.as_deref().unwrap_or(DEFAULT_SEED_ADDRESS))?;

        Ok(Self {
            root: cli.root,
            node_count: cli.node_count,
            seed,
            verbosity: cli.verbose.min(2),
            api_key,
            api_base_url,
            request_timeout,
            retry_delay,
            mode: if cli.no_expand {
                CrawlMode::Drain
            } else {
                CrawlMode::Expand
            },
        })
    }

    /// Minimum spacing between upstream requests. An authenticated key has
    /// enough quota to go without a pause.
    pub fn rate_limit_interval(&self) -> Duration {
        if self.api_key.is_empty() {
            Duration::from_millis(500)
        } else {
            Duration::ZERO
        }
    }

    /// Console log directive for the chosen verbosity; `RUST_LOG` wins when
    /// set.
    pub fn log_filter(&self) -> &'static str {
        match self.verbosity {
            0 => "error",
            1 => "info",
            _ => "debug",
        }
    }
}
