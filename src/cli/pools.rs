//! Pool listing view.

use std::time::Duration;

use indicatif::ProgressBar;
use tabled::{Table, Tabled};

use crate::adapter::evm::EvmChain;
use crate::adapter::route_cache::{RouteCache, POOLS_ROUTE_KEY};
use crate::app::{self, AppState};
use crate::config::Config;
use crate::error::Result;
use crate::port::ChainClient;

#[derive(Tabled)]
struct PoolRow {
    #[tabled(rename = "Pool")]
    name: String,
    #[tabled(rename = "Total Supply")]
    supply: String,
    #[tabled(rename = "Your Deposit")]
    deposit: String,
    #[tabled(rename = "Your Pool Share")]
    share: String,
}

/// Discover pools and render the listing table.
pub async fn execute(config: Config) -> Result<()> {
    let state = AppState::new();
    let notifiers = app::build_notifier_registry(&config);
    let chain = EvmChain::connect(&config).await?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_message("Discovering pools...");
    spinner.enable_steady_tick(Duration::from_millis(120));

    let summary = app::discovery::run(&chain, &state, &notifiers).await?;
    spinner.finish_and_clear();

    remember_listing(&config, chain.session().network_id);
    render(&state, summary.skipped);
    Ok(())
}

/// Cache the listing route so a detail view can fall back to it.
pub(super) fn remember_listing(config: &Config, network_id: u64) {
    if let Some(path) = &config.route_cache {
        let cache = RouteCache::new(path.clone());
        let route = format!("{POOLS_ROUTE_KEY}?network={network_id}");
        if let Err(e) = cache.store_listing(&route) {
            tracing::debug!(error = %e, "Could not update route cache");
        }
    }
}

/// Render the pool listing from the store.
pub(super) fn render(state: &AppState, skipped: usize) {
    let pools = state.pools();
    if pools.is_empty() {
        println!("No pools discovered.");
    } else {
        let rows: Vec<PoolRow> = pools
            .iter()
            .map(|entry| PoolRow {
                name: entry.name.clone(),
                supply: entry.total_supply.to_string(),
                deposit: entry.user_pool_balance.to_string(),
                share: format!("{}%", entry.share_percent()),
            })
            .collect();
        println!("{}", Table::new(rows));
    }

    if skipped > 0 {
        println!("({skipped} tokens skipped; see logs)");
    }
}
