use std::time::Duration;

use backon::{ConstantBuilder, Retryable};
use serde_json::Value;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::etherscan::models::{ApiEnvelope, ProxyEnvelope, RawTokenTransfer};
use crate::etherscan::pacer::RequestPacer;
use crate::models::{Address, TransactionTable};

/// Total attempts per upstream call, first try included.
pub const MAX_TRIAL_COUNT: usize = 10;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Rate limited by upstream: {0}")]
    RateLimitExceeded(String),

    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Malformed response: {0}")]
    Parse(String),

    #[error("Transport error: {0}")]
    Http(#[from] reqwest::Error),
}

impl FetchError {
    /// The retry policy in one visible place. A throttled, malformed, or
    /// unreachable upstream all look alike from here and all earn another
    /// attempt; nothing the upstream does is fatal to a crawl.
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::RateLimitExceeded(_)
            | FetchError::UpstreamUnavailable(_)
            | FetchError::Parse(_)
            | FetchError::Http(_) => true,
        }
    }
}

pub struct EtherscanClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    retry_delay: Duration,
    pacer: Mutex<RequestPacer>,
}

impl EtherscanClient {
    pub fn new(config: &Config) -> Result<Self, FetchError> {
        info!("Initializing Etherscan client for {}", config.api_base_url);
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: config.api_base_url.clone(),
            api_key: config.api_key.clone(),
            retry_delay: config.retry_delay,
            pacer: Mutex::new(RequestPacer::new(config.rate_limit_interval())),
        })
    }

    fn token_tx_url(&self, address: &Address) -> String {
        format!(
            "{}?module=account&action=tokentx&address={}&startblock=0&endblock=999999999&sort=asc&apikey={}",
            self.base_url, address, self.api_key
        )
    }

    fn get_code_url(&self, address: &Address) -> String {
        format!(
            "{}?module=proxy&action=eth_getCode&address={}&tag=latest&apikey={}",
            self.base_url, address, self.api_key
        )
    }

    /// Fetch the full ERC-20 transfer history of one address, retrying
    /// transient failures with a fixed backoff. Exhausting the retry budget
    /// surfaces the last error; the caller decides whether to absorb it.
    pub async fn fetch_token_transfers(
        &self,
        address: &Address,
    ) -> Result<TransactionTable, FetchError> {
        let rows = (|| self.token_transfers_once(address))
            .retry(
                ConstantBuilder::default()
                    .with_delay(self.retry_delay)
                    .with_max_times(MAX_TRIAL_COUNT - 1),
            )
            .when(FetchError::is_retryable)
            .notify(|err: &FetchError, dur: Duration| {
                warn!("Transfer fetch failed ({}); retrying in {:?}", err, dur);
            })
            .await?;

        let records: Vec<_> = rows.into_iter().map(RawTokenTransfer::into_record).collect();
        debug!("Address {}: {} transfer row(s)", address, records.len());

        // Classification is best effort; a fetch with transfers but no
        // wallet/contract verdict is still a usable result.
        let is_user = match self.classify_address(address).await {
            Ok(flag) => Some(flag),
            Err(e) => {
                warn!("Could not classify address {}: {}", address, e);
                None
            }
        };

        Ok(TransactionTable {
            address: address.clone(),
            records,
            is_user,
        })
    }

    /// Wallet-vs-contract heuristic via `eth_getCode`: an address with no
    /// code is a plain wallet. Contracts that are not deployed at query time
    /// (or were destroyed) also return empty code and read as wallets; that
    /// misclassification is a known property of the heuristic.
    pub async fn classify_address(&self, address: &Address) -> Result<bool, FetchError> {
        let code = (|| self.get_code_once(address))
            .retry(
                ConstantBuilder::default()
                    .with_delay(self.retry_delay)
                    .with_max_times(MAX_TRIAL_COUNT - 1),
            )
            .when(FetchError::is_retryable)
            .notify(|err: &FetchError, dur: Duration| {
                warn!("eth_getCode failed ({}); retrying in {:?}", err, dur);
            })
            .await?;

        let is_user = code == "0x";
        debug!("Address {} is a user wallet: {}", address, is_user);
        Ok(is_user)
    }

    async fn token_transfers_once(
        &self,
        address: &Address,
    ) -> Result<Vec<RawTokenTransfer>, FetchError> {
        let url = self.token_tx_url(address);
        info!("Retrieving node with address {} from URL: {}", address, url);

        let response = self.get_paced(&url).await?;
        let envelope: ApiEnvelope = response
            .json()
            .await
            .map_err(|e| FetchError::Parse(e.to_string()))?;

        match envelope.result {
            // An array is data even under status "0", which the API also
            // uses for "no transactions found".
            Value::Array(rows) => {
                if envelope.status != "1" {
                    warn!(
                        "Address {}: upstream flagged status {} ({}) with {} row(s)",
                        address,
                        envelope.status,
                        envelope.message,
                        rows.len()
                    );
                }
                serde_json::from_value(Value::Array(rows))
                    .map_err(|e| FetchError::Parse(e.to_string()))
            }
            Value::String(text) => Err(classify_error_text(&text, &envelope.message)),
            other => Err(FetchError::Parse(format!(
                "unexpected result payload: {}",
                other
            ))),
        }
    }

    async fn get_code_once(&self, address: &Address) -> Result<String, FetchError> {
        let url = self.get_code_url(address);
        debug!("Checking for contract code at {} via {}", address, url);

        let response = self.get_paced(&url).await?;
        let envelope: ProxyEnvelope = response
            .json()
            .await
            .map_err(|e| FetchError::Parse(e.to_string()))?;

        envelope
            .result
            .ok_or_else(|| FetchError::Parse("missing result in eth_getCode response".to_string()))
    }

    /// One paced GET. The pacer is stamped when the request finishes,
    /// successful or not, so the interval floor is measured from completion.
    async fn get_paced(&self, url: &str) -> Result<reqwest::Response, FetchError> {
        {
            let mut pacer = self.pacer.lock().await;
            if let Some(elapsed) = pacer.elapsed_since_last() {
                debug!(
                    "Sending request {:.2}s after the previous one completed",
                    elapsed.as_secs_f64()
                );
            }
            pacer.await_slot().await;
        }

        let result = self.http.get(url).send().await;
        self.pacer.lock().await.mark_executed();

        let response = result?;
        if !response.status().is_success() {
            return Err(FetchError::UpstreamUnavailable(format!(
                "HTTP {}",
                response.status()
            )));
        }
        Ok(response)
    }
}

fn classify_error_text(text: &str, message: &str) -> FetchError {
    let combined = format!("{} {}", message, text).to_lowercase();
    if combined.contains("rate limit") {
        FetchError::RateLimitExceeded(text.to_string())
    } else {
        FetchError::UpstreamUnavailable(text.to_string())
    }
}
