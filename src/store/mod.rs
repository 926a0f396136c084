//! Flat-file persistence for crawl state: line-delimited address lists plus
//! a timestamped snapshot of the explored-address map.

pub mod snapshot;

pub use snapshot::{read_snapshot, write_snapshot};

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};

use crate::frontier::Frontier;
use crate::models::{Address, ExploredIndex};

pub const NODE_LIST_FILE: &str = "node_list.txt";
pub const EXPLORED_KEYS_FILE: &str = "explored_nodes_keys.txt";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// File layout of one crawl target's working directory.
#[derive(Debug, Clone)]
pub struct RunPaths {
    pub dir: PathBuf,
}

impl RunPaths {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn node_list(&self) -> PathBuf {
        self.dir.join(NODE_LIST_FILE)
    }

    pub fn explored_keys(&self) -> PathBuf {
        self.dir.join(EXPLORED_KEYS_FILE)
    }
}

/// Read a line-delimited address file. A missing file is `None`, not an
/// error; blank lines are skipped and entries are case-normalized.
pub fn load_addresses(path: &Path) -> Result<Option<Vec<Address>>, StoreError> {
    if !path.exists() {
        return Ok(None);
    }
    let contents = fs::read_to_string(path).map_err(|e| StoreError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let addresses = contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(Address::normalize)
        .collect();
    Ok(Some(addresses))
}

pub fn save_addresses<'a, I>(path: &Path, addresses: I) -> Result<(), StoreError>
where
    I: IntoIterator<Item = &'a Address>,
{
    let mut body = String::new();
    for address in addresses {
        body.push_str(address.as_str());
        body.push('\n');
    }
    fs::write(path, body).map_err(|e| StoreError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Write every artifact the run produced. Each write is independent: a
/// failure is logged and the remaining artifacts are still attempted.
pub fn persist_state(paths: &RunPaths, frontier: &Frontier, explored: &ExploredIndex) {
    match save_addresses(&paths.node_list(), frontier.pending()) {
        Ok(()) => info!(
            "Saved {} pending address(es) to {}",
            frontier.len(),
            paths.node_list().display()
        ),
        Err(e) => warn!("Failed to save pending addresses: {}", e),
    }

    match save_addresses(&paths.explored_keys(), frontier.visited()) {
        Ok(()) => info!(
            "Saved {} explored address(es) to {}",
            frontier.visited_len(),
            paths.explored_keys().display()
        ),
        Err(e) => warn!("Failed to save explored addresses: {}", e),
    }

    match write_snapshot(&paths.dir, explored) {
        Ok(path) => info!("Saved explored-node snapshot to {}", path.display()),
        Err(e) => warn!("Failed to save explored-node snapshot: {}", e),
    }
}
