use rand::rngs::StdRng;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::etherscan::client::EtherscanClient;
use crate::frontier::{neighbors_of, Frontier};
use crate::models::{ExploredIndex, TransactionTable};

#[derive(Error, Debug)]
pub enum CrawlError {
    #[error(
        "Frontier exhausted after exploring {explored} address(es); nothing left to crawl. \
         Seed a new address or reload pending state."
    )]
    FrontierExhausted { explored: usize },
}

/// Whether newly discovered counterparties join the frontier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlMode {
    /// Admit the neighbors of every fetched table (the default).
    Expand,
    /// Only work through addresses already pending; discoveries are ignored.
    Drain,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CrawlSummary {
    /// Iterations that produced data. Only these count toward the target.
    pub successes: usize,
    /// Addresses recorded with an empty placeholder table after the retry
    /// budget ran out.
    pub degraded: usize,
    /// True when the run was cut short by an external interrupt.
    pub interrupted: bool,
}

pub struct Crawler {
    client: EtherscanClient,
    rng: StdRng,
    target: usize,
    mode: CrawlMode,
}

impl Crawler {
    pub fn new(client: EtherscanClient, rng: StdRng, target: usize, mode: CrawlMode) -> Self {
        Self {
            client,
            rng,
            target,
            mode,
        }
    }

    /// Drive the crawl until `target` successful explorations, frontier
    /// exhaustion, or cancellation.
    ///
    /// Progress counting: a fetch that returned data counts toward the
    /// target. A fetch whose retries were exhausted is logged, recorded as
    /// an empty table, and the address still moves to the visited set so the
    /// sampler cannot redraw it — but it does not count.
    pub async fn run(
        &mut self,
        frontier: &mut Frontier,
        explored: &mut ExploredIndex,
        shutdown: CancellationToken,
    ) -> Result<CrawlSummary, CrawlError> {
        let mut summary = CrawlSummary::default();
        info!(
            "Starting crawl: target {} node(s), {} pending, {} visited",
            self.target,
            frontier.len(),
            frontier.visited_len()
        );

        while summary.successes < self.target {
            if shutdown.is_cancelled() {
                info!(
                    "Interrupt received; stopping after {} success(es)",
                    summary.successes
                );
                summary.interrupted = true;
                break;
            }

            let address = match frontier.select_next(&mut self.rng) {
                Some(address) => address,
                None => {
                    error!(
                        "Frontier drained before reaching the target of {}",
                        self.target
                    );
                    return Err(CrawlError::FrontierExhausted {
                        explored: summary.successes + summary.degraded,
                    });
                }
            };
            info!(
                "Progress: {}/{} exploring {}",
                summary.successes + 1,
                self.target,
                address
            );

            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("Interrupt received mid-fetch; abandoning {}", address);
                    summary.interrupted = true;
                    break;
                }
                result = self.client.fetch_token_transfers(&address) => match result {
                    Ok(table) => {
                        if self.mode == CrawlMode::Expand {
                            let neighbors = neighbors_of(&table);
                            debug!(
                                "Address {}: admitting up to {} neighbor(s)",
                                address,
                                neighbors.len()
                            );
                            frontier.admit(neighbors);
                        }
                        frontier.mark_explored(&address);
                        explored.insert_fetched(table);
                        summary.successes += 1;
                    }
                    Err(e) => {
                        warn!(
                            "Giving up on {} after exhausting retries: {}; recording an empty table",
                            address, e
                        );
                        frontier.mark_explored(&address);
                        explored.insert_fetched(TransactionTable::empty(address.clone()));
                        summary.degraded += 1;
                    }
                }
            }
        }

        info!(
            "Crawl finished: {} success(es), {} degraded, {} pending, {} visited",
            summary.successes,
            summary.degraded,
            frontier.len(),
            frontier.visited_len()
        );
        Ok(summary)
    }
}
