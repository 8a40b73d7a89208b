//! Single-pool detail view.

use std::str::FromStr;
use std::time::Duration;

use alloy_primitives::Address;
use indicatif::ProgressBar;
use tabled::{Table, Tabled};

use crate::adapter::evm::EvmChain;
use crate::adapter::route_cache::RouteCache;
use crate::app::{self, AppState};
use crate::config::Config;
use crate::domain::PoolEntry;
use crate::error::{ConfigError, Result};

#[derive(Tabled)]
struct DetailRow {
    #[tabled(rename = "Pool")]
    name: String,
    #[tabled(rename = "Total Supply")]
    supply: String,
    #[tabled(rename = "Your LPT Balance")]
    lpt: String,
    #[tabled(rename = "Token Balance")]
    tokens: String,
    #[tabled(rename = "Your Pool Share")]
    share: String,
}

/// Show one pool, addressed by pool or token address.
///
/// An address that matches no entry falls back to the cached listing
/// route, mirroring the deep-link redirect of the original client.
pub async fn execute(config: Config, address: &str) -> Result<()> {
    let address = Address::from_str(address).map_err(|e| ConfigError::InvalidValue {
        field: "address",
        reason: e.to_string(),
    })?;

    let state = AppState::new();
    let notifiers = app::build_notifier_registry(&config);
    let chain = EvmChain::connect(&config).await?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_message("Discovering pools...");
    spinner.enable_steady_tick(Duration::from_millis(120));

    let summary = app::discovery::run(&chain, &state, &notifiers).await?;
    spinner.finish_and_clear();

    let entry = {
        let pools = state.pools();
        pools.by_pool(address).or_else(|| pools.by_token(address)).cloned()
    };

    match entry {
        Some(entry) => render(&entry),
        None => {
            // Deep link without a matching entry: redirect to the listing
            if let Some(route) = config
                .route_cache
                .as_ref()
                .and_then(|path| RouteCache::new(path.clone()).listing())
            {
                println!("No pool at {address}; returning to {route}");
            } else {
                println!("No pool at {address}");
            }
            super::pools::render(&state, summary.skipped);
        }
    }
    Ok(())
}

fn render(entry: &PoolEntry) {
    let row = DetailRow {
        name: entry.name.clone(),
        supply: entry.total_supply.to_string(),
        lpt: entry.user_pool_balance.to_string(),
        tokens: entry.user_token_balance.to_string(),
        share: format!("{}%", entry.share_percent()),
    };
    println!("{}", Table::new(vec![row]));
    println!();
    println!("Token:  {}", entry.token_address);
    println!("Pool:   {}", entry.pool_address);
}
