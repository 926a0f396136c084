use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::validation::{validate_eth_address, ValidationError};

/// Case-normalized wallet/contract identifier. Identity is the lowercased
/// string; equality is string equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    /// Strict parse for operator-supplied input (seed address).
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        validate_eth_address(input)?;
        Ok(Self::normalize(input))
    }

    /// Lenient normalization for wire data and state files: trim + lowercase.
    pub fn normalize(input: &str) -> Self {
        Address(input.trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One ERC-20 transfer row. The `value` is already scaled down by the token's
/// decimals; the decimals column itself is not retained.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub block_number: u64,
    pub time_stamp: i64,
    pub hash: String,
    pub from: Address,
    pub contract_address: Address,
    pub to: Address,
    pub value: f64,
    pub token_name: String,
    pub token_symbol: String,
    pub gas: u64,
    pub gas_price: u64,
    pub gas_used: u64,
}

/// Everything one fetch produced for a single address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionTable {
    pub address: Address,
    pub records: Vec<TransactionRecord>,
    /// `Some(true)` for a plain wallet, `Some(false)` for a contract, `None`
    /// when classification failed or was skipped.
    pub is_user: Option<bool>,
}

impl TransactionTable {
    /// Placeholder table recorded when a fetch had to be given up on.
    pub fn empty(address: Address) -> Self {
        Self {
            address,
            records: Vec::new(),
            is_user: None,
        }
    }
}

/// What we know about an address that has been explored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExploredEntry {
    /// Fetched during this run; the full table is retained.
    Fetched { table: TransactionTable },
    /// Explored in an earlier run; only the address survived persistence.
    Discarded,
}

/// Address → result mapping accumulated over one run and written out whole
/// as the run's snapshot.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExploredIndex {
    entries: HashMap<Address, ExploredEntry>,
}

impl ExploredIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_fetched(&mut self, table: TransactionTable) {
        self.entries
            .insert(table.address.clone(), ExploredEntry::Fetched { table });
    }

    /// Record an address explored in a prior run. Never downgrades an entry
    /// that already carries a table.
    pub fn mark_discarded(&mut self, address: Address) {
        self.entries.entry(address).or_insert(ExploredEntry::Discarded);
    }

    pub fn get(&self, address: &Address) -> Option<&ExploredEntry> {
        self.entries.get(address)
    }

    pub fn contains(&self, address: &Address) -> bool {
        self.entries.contains_key(address)
    }

    pub fn addresses(&self) -> impl Iterator<Item = &Address> {
        self.entries.keys()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
