use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::models::{Address, TransactionRecord};

/// Response envelope shared by the account-module endpoints. `result` is an
/// array of rows on success and a plain string describing the problem on
/// throttling or outage, so it stays raw until inspected.
#[derive(Debug, Deserialize)]
pub struct ApiEnvelope {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: String,
    pub result: Value,
}

/// Envelope for `module=proxy` passthrough calls such as `eth_getCode`.
#[derive(Debug, Deserialize)]
pub struct ProxyEnvelope {
    pub result: Option<String>,
}

/// One row of the `tokentx` listing exactly as the API returns it: every
/// column is a decimal string.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawTokenTransfer {
    pub block_number: String,
    pub time_stamp: String,
    pub hash: String,
    pub nonce: String,
    pub block_hash: String,
    pub from: String,
    pub contract_address: String,
    pub to: String,
    pub value: String,
    pub token_name: String,
    pub token_symbol: String,
    pub token_decimal: String,
    pub transaction_index: String,
    pub gas: String,
    pub gas_price: String,
    pub gas_used: String,
    pub cumulative_gas_used: String,
    pub input: String,
    pub confirmations: String,
}

impl RawTokenTransfer {
    /// Convert into the domain record: addresses lowercased, the raw integer
    /// amount scaled down by 10^tokenDecimal, the decimals column dropped.
    pub fn into_record(self) -> TransactionRecord {
        let decimals: i32 = self.token_decimal.trim().parse().unwrap_or(0);
        let scale = 10f64.powi(decimals);
        let value = match self.value.trim().parse::<u128>() {
            Ok(v) => v as f64 / scale,
            Err(_) => {
                // Amounts wider than u128 lose precision but keep magnitude.
                let approx = self.value.trim().parse::<f64>().unwrap_or_else(|_| {
                    warn!("Unparsable value {:?} in tx {}", self.value, self.hash);
                    0.0
                });
                approx / scale
            }
        };

        TransactionRecord {
            block_number: self.block_number.trim().parse().unwrap_or(0),
            time_stamp: self.time_stamp.trim().parse().unwrap_or(0),
            hash: self.hash,
            from: Address::normalize(&self.from),
            contract_address: Address::normalize(&self.contract_address),
            to: Address::normalize(&self.to),
            value,
            token_name: self.token_name,
            token_symbol: self.token_symbol,
            gas: self.gas.trim().parse().unwrap_or(0),
            gas_price: self.gas_price.trim().parse().unwrap_or(0),
            gas_used: self.gas_used.trim().parse().unwrap_or(0),
        }
    }
}
