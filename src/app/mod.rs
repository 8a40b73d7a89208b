//! Application orchestration.
//!
//! Wires the chain adapter, the store, and the notifiers together:
//! discover pools on startup, then rebuild the read-model whenever the
//! account or network changes.

pub mod discovery;
mod state;
pub mod transactions;

pub use discovery::DiscoverySummary;
pub use state::AppState;
pub use transactions::TransactionOrchestrator;

use std::sync::Arc;

use tracing::{error, info};

use crate::adapter::evm::EvmChain;
use crate::adapter::notifier::{LogNotifier, NotifierRegistry};
use crate::config::Config;
use crate::domain::SessionEvent;
use crate::error::Result;
use crate::port::{ChainClient, Event, SessionWatch};

#[cfg(feature = "telegram")]
use crate::adapter::notifier::{TelegramConfig, TelegramNotifier};

/// Main application struct.
pub struct App;

impl App {
    /// Run the client loop: connect, discover, then reconnect and
    /// rebuild from scratch on every session change.
    pub async fn run(config: Config) -> Result<()> {
        let state = Arc::new(AppState::new());
        let notifiers = Arc::new(build_notifier_registry(&config));
        info!(notifiers = notifiers.len(), "Notifiers initialized");

        loop {
            let chain = match EvmChain::connect(&config).await {
                Ok(chain) => chain,
                Err(e) => {
                    notifiers.notify_all(Event::ConnectRejected {
                        reason: e.to_string(),
                    });
                    return Err(e);
                }
            };

            if chain.session().is_read_only() {
                notifiers.notify_all(Event::WalletNotFound);
            }

            match discovery::run(&chain, &state, &notifiers).await {
                Ok(summary) => info!(
                    discovered = summary.discovered,
                    skipped = summary.skipped,
                    "Pools loaded"
                ),
                Err(e) => error!(error = %e, "Discovery failed"),
            }

            let mut watch = chain.session_watch(config.session.poll_interval());
            match watch.next_change().await {
                Some(event) => invalidate_session(event, &state, &notifiers),
                None => return Ok(()),
            }
        }
    }
}

/// React to a session change: the read-model belongs to the old
/// account/network and is dropped wholesale before rediscovery.
fn invalidate_session(event: SessionEvent, state: &AppState, notifiers: &NotifierRegistry) {
    info!(change = ?event, "Session changed, reloading pools");
    notifiers.notify_all(Event::SessionChanged(event));
    state.clear_pools();
}

/// Build notifier registry from configuration.
pub fn build_notifier_registry(config: &Config) -> NotifierRegistry {
    let mut registry = NotifierRegistry::new();

    // Always add log notifier
    registry.register(Box::new(LogNotifier));

    // Add telegram notifier if configured
    #[cfg(feature = "telegram")]
    if config.telegram.enabled {
        if let Some(tg_config) = TelegramConfig::from_env() {
            let tg_config = TelegramConfig {
                notify_actions: config.telegram.notify_actions,
                notify_discovery: config.telegram.notify_discovery,
                ..tg_config
            };
            registry.register(Box::new(TelegramNotifier::new(tg_config)));
            info!("Telegram notifier enabled");
        } else {
            tracing::warn!("Telegram enabled but TELEGRAM_BOT_TOKEN or TELEGRAM_CHAT_ID not set");
        }
    }

    // Suppress unused variable warning when telegram feature is disabled
    #[cfg(not(feature = "telegram"))]
    let _ = config;

    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::chain::ScriptedSessionWatch;
    use crate::testkit::notifier::RecordingNotifier;
    use alloy_primitives::Address;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn entry() -> crate::domain::PoolEntry {
        crate::domain::PoolEntry {
            token_address: Address::with_last_byte(1),
            pool_address: Address::with_last_byte(10),
            decimals: 18,
            name: "DAI".into(),
            total_supply: dec!(1000),
            user_pool_balance: dec!(100),
            user_token_balance: dec!(50),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn session_change_drops_the_read_model() {
        let state = AppState::new();
        state.publish_entry(entry());
        state.set_instances_loaded();

        let recorder = RecordingNotifier::new();
        let mut notifiers = NotifierRegistry::new();
        notifiers.register(Box::new(recorder.clone()));

        invalidate_session(
            SessionEvent::NetworkChanged { network_id: 1 },
            &state,
            &notifiers,
        );

        assert!(state.pools().is_empty());
        assert!(!state.instances_loaded());
        assert_eq!(
            recorder.count_matching(|e| matches!(e, Event::SessionChanged(_))),
            1
        );
    }

    #[tokio::test]
    async fn scripted_watch_replays_events_then_ends() {
        let mut watch = ScriptedSessionWatch::new(vec![
            SessionEvent::AccountChanged {
                account: Address::with_last_byte(2),
            },
            SessionEvent::NetworkChanged { network_id: 5 },
        ]);

        assert!(matches!(
            watch.next_change().await,
            Some(SessionEvent::AccountChanged { .. })
        ));
        assert!(matches!(
            watch.next_change().await,
            Some(SessionEvent::NetworkChanged { network_id: 5 })
        ));
        assert!(watch.next_change().await.is_none());
    }
}
