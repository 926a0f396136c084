use std::collections::HashSet;
use std::error::Error;
use std::fs;

use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use token_graph_crawler::config::{Cli, Config};
use token_graph_crawler::crawler::{CrawlMode, Crawler};
use token_graph_crawler::etherscan::client::EtherscanClient;
use token_graph_crawler::frontier::Frontier;
use token_graph_crawler::models::{Address, ExploredIndex};
use token_graph_crawler::store::{self, RunPaths};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let config = Config::from_cli(cli)?;

    fs::create_dir_all(&config.root)?;
    let _log_guard = init_tracing(&config);
    info!("Configuration loaded: {:?}", config);

    let paths = RunPaths::new(config.root.clone());

    let pending = match store::load_addresses(&paths.node_list())? {
        Some(addresses) => {
            info!(
                "Retrieved {} pending address(es) from {}",
                addresses.len(),
                paths.node_list().display()
            );
            addresses
        }
        None if config.mode == CrawlMode::Drain => {
            return Err(format!(
                "{} not found; an existing pending list is required when discoveries \
                 are not admitted — run an expanding crawl first",
                paths.node_list().display()
            )
            .into());
        }
        None => {
            info!("No pending-address file at {}", paths.node_list().display());
            Vec::new()
        }
    };

    let visited_keys = match store::load_addresses(&paths.explored_keys())? {
        Some(addresses) => {
            info!(
                "Retrieved {} explored address(es) from {}",
                addresses.len(),
                paths.explored_keys().display()
            );
            addresses
        }
        None => {
            info!(
                "No explored-address file at {}",
                paths.explored_keys().display()
            );
            Vec::new()
        }
    };

    let mut explored = ExploredIndex::new();
    for address in &visited_keys {
        explored.mark_discarded(address.clone());
    }
    let visited: HashSet<Address> = visited_keys.into_iter().collect();
    let mut frontier = Frontier::from_parts(pending, visited);

    if frontier.is_empty() && frontier.visited_len() == 0 {
        info!("No prior state; seeding the frontier with {}", config.seed);
        frontier.admit([config.seed.clone()]);
    }

    let target = match config.mode {
        CrawlMode::Expand => config.node_count,
        CrawlMode::Drain => config.node_count.min(frontier.len()),
    };

    let client = EtherscanClient::new(&config)?;
    let mut crawler = Crawler::new(client, StdRng::from_os_rng(), target, config.mode);

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received; finishing up and saving state");
            signal_token.cancel();
        }
    });

    let result = crawler.run(&mut frontier, &mut explored, shutdown).await;

    // State is written no matter how the run ended.
    store::persist_state(&paths, &frontier, &explored);

    match result {
        Ok(summary) => {
            info!(
                "Run complete: {} explored with data, {} degraded{}",
                summary.successes,
                summary.degraded,
                if summary.interrupted {
                    " (interrupted)"
                } else {
                    ""
                }
            );
            Ok(())
        }
        Err(e) => {
            error!("{}", e);
            Err(e.into())
        }
    }
}

fn init_tracing(config: &Config) -> tracing_appender::non_blocking::WorkerGuard {
    let file_appender = tracing_appender::rolling::never(&config.root, "crawler.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(config.log_filter()));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(file_writer),
        )
        .init();

    guard
}
