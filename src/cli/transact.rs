//! Deposit and redeem entry points.

use std::str::FromStr;
use std::sync::Arc;

use alloy_primitives::Address;
use rust_decimal::Decimal;

use crate::adapter::evm::EvmChain;
use crate::app::{self, AppState, TransactionOrchestrator};
use crate::config::Config;
use crate::domain::PoolAction;
use crate::error::{ChainError, ConfigError, Result};
use crate::port::{ChainClient, Event};

/// Run one deposit or redeem and print the outcome.
pub async fn execute(
    action: PoolAction,
    config: Config,
    token: &str,
    amount: Decimal,
) -> Result<()> {
    let token = Address::from_str(token).map_err(|e| ConfigError::InvalidValue {
        field: "token",
        reason: e.to_string(),
    })?;

    let state = Arc::new(AppState::new());
    let notifiers = Arc::new(app::build_notifier_registry(&config));
    let chain: Arc<dyn ChainClient> = Arc::new(EvmChain::connect(&config).await?);

    if chain.session().is_read_only() {
        notifiers.notify_all(Event::WalletNotFound);
        return Err(ChainError::WalletNotFound.into());
    }

    app::discovery::run(chain.as_ref(), &state, &notifiers).await?;

    let transactions = config.transactions.clone();
    let orchestrator =
        TransactionOrchestrator::new(chain, state.clone(), notifiers, transactions);
    orchestrator.execute(action, token, amount).await?;

    let pools = state.pools();
    if let Some(entry) = pools.by_token(token) {
        let toast = Event::ActionCompleted {
            action,
            pool_name: entry.name.clone(),
            amount,
        }
        .toast()
        .unwrap_or_default();
        println!("{toast}");
        println!();
        println!("{}:  {}", entry.name, entry.user_token_balance);
        println!("LPT:  {}", entry.user_pool_balance);
        println!("Pool: {} total", entry.total_supply);
    }
    Ok(())
}
