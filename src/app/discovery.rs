//! Pool discovery.
//!
//! Enumerates the factory's token index and materializes one store
//! entry per resolvable token. A failing index is skipped, never fatal;
//! discovery-complete is signaled exactly once after the last index has
//! been attempted.

use alloy_primitives::Address;
use chrono::Utc;
use tracing::{info, warn};

use crate::adapter::notifier::NotifierRegistry;
use crate::domain::units::from_chain_units;
use crate::domain::PoolEntry;
use crate::error::Result;
use crate::port::{ChainClient, Event, PoolRegistry};

use super::state::AppState;

/// Outcome of one discovery pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscoverySummary {
    /// Token count the factory reported when the pass started.
    pub attempted: u64,
    pub discovered: usize,
    pub skipped: usize,
}

/// Run one discovery pass, publishing entries into `state`.
///
/// The token count is read once; a fresh call re-reads it and starts
/// over. Only the count read itself is fatal, since without it there
/// is no index to enumerate.
pub async fn run(
    chain: &dyn ChainClient,
    state: &AppState,
    notifiers: &NotifierRegistry,
) -> Result<DiscoverySummary> {
    let session = chain.session();
    let registry = chain.registry();

    let count = registry.token_count().await?;
    info!(tokens = count, account = %session.account, "Discovering pools");

    let mut discovered = 0;
    let mut skipped = 0;

    for index in 0..count {
        match resolve_entry(chain, registry.as_ref(), session.account, index).await {
            Ok(entry) => {
                info!(
                    index,
                    pool = %entry.name,
                    token = %entry.token_address,
                    "Pool discovered"
                );
                state.publish_entry(entry);
                discovered += 1;
            }
            Err(e) => {
                // One bad token must not abort the rest of the batch
                warn!(index, error = %e, "Skipping token");
                notifiers.notify_all(Event::PoolSkipped {
                    index,
                    reason: e.to_string(),
                });
                skipped += 1;
            }
        }
    }

    state.set_instances_loaded();
    notifiers.notify_all(Event::DiscoveryCompleted {
        discovered,
        skipped,
    });

    Ok(DiscoverySummary {
        attempted: count,
        discovered,
        skipped,
    })
}

/// Resolve one index into a full entry. All five descriptive/balance
/// reads must succeed for the entry to materialize.
async fn resolve_entry(
    chain: &dyn ChainClient,
    registry: &dyn PoolRegistry,
    account: Address,
    index: u64,
) -> Result<PoolEntry> {
    let token_address = registry.token_at(index).await?;
    let pool_address = registry.pool_for(token_address).await?;

    let pool = chain.pool_at(pool_address);
    let token = chain.token_at(token_address);

    let (name, decimals) = tokio::try_join!(pool.name(), token.decimals())?;
    let (user_deposit, user_balance, supply) = tokio::try_join!(
        pool.balance_of(account),
        token.balance_of(account),
        pool.total_supply(),
    )?;

    Ok(PoolEntry {
        token_address,
        pool_address,
        decimals,
        name,
        total_supply: from_chain_units(supply, decimals),
        user_pool_balance: from_chain_units(user_deposit, decimals),
        user_token_balance: from_chain_units(user_balance, decimals),
        updated_at: Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::chain::ScriptedChain;
    use crate::testkit::notifier::RecordingNotifier;
    use rust_decimal_macros::dec;

    fn account() -> Address {
        Address::with_last_byte(0x99)
    }

    fn registry_with(recorder: &RecordingNotifier) -> NotifierRegistry {
        let mut notifiers = NotifierRegistry::new();
        notifiers.register(Box::new(recorder.clone()));
        notifiers
    }

    #[tokio::test]
    async fn discovers_every_resolvable_pool() {
        let chain = ScriptedChain::new(account());
        chain.with_pool("DAI", 18, dec!(100), dec!(50), dec!(1000));
        chain.with_pool("USDC", 6, dec!(20), dec!(0), dec!(500));

        let state = AppState::new();
        let recorder = RecordingNotifier::new();

        let summary = run(&chain, &state, &registry_with(&recorder)).await.unwrap();

        assert_eq!(summary.attempted, 2);
        assert_eq!(summary.discovered, 2);
        assert_eq!(summary.skipped, 0);
        assert_eq!(state.pools().len(), 2);
        assert!(state.instances_loaded());
    }

    #[tokio::test]
    async fn one_bad_token_does_not_abort_the_batch() {
        let chain = ScriptedChain::new(account());
        let (_dai_token, _) = chain.with_pool("DAI", 18, dec!(100), dec!(50), dec!(1000));
        let (bad_token, _) = chain.with_pool("BAD", 18, dec!(1), dec!(1), dec!(1));
        chain.fail(bad_token, "poolAddresses");

        let state = AppState::new();
        let recorder = RecordingNotifier::new();

        let summary = run(&chain, &state, &registry_with(&recorder)).await.unwrap();

        assert_eq!(summary.discovered, 1);
        assert_eq!(summary.skipped, 1);

        let pools = state.pools();
        assert_eq!(pools.len(), 1);
        let dai = pools.iter().next().unwrap();
        assert_eq!(dai.name, "DAI");
        assert_eq!(dai.decimals, 18);
        assert_eq!(dai.user_token_balance, dec!(100));
        assert_eq!(dai.user_pool_balance, dec!(50));
        assert_eq!(dai.total_supply, dec!(1000));
        drop(pools);

        assert!(state.instances_loaded());
        // Discovery-complete fires exactly once despite the failure
        assert_eq!(
            recorder.count_matching(|e| matches!(e, Event::DiscoveryCompleted { .. })),
            1
        );
        assert_eq!(
            recorder.count_matching(|e| matches!(e, Event::PoolSkipped { index: 1, .. })),
            1
        );
    }

    #[tokio::test]
    async fn empty_factory_still_signals_completion() {
        let chain = ScriptedChain::new(account());
        let state = AppState::new();
        let recorder = RecordingNotifier::new();

        let summary = run(&chain, &state, &registry_with(&recorder)).await.unwrap();

        assert_eq!(summary.attempted, 0);
        assert!(state.pools().is_empty());
        assert!(state.instances_loaded());
        assert_eq!(
            recorder.count_matching(|e| matches!(e, Event::DiscoveryCompleted { .. })),
            1
        );
    }

    #[tokio::test]
    async fn rediscovery_replaces_entries_without_duplicates() {
        let chain = ScriptedChain::new(account());
        chain.with_pool("DAI", 18, dec!(100), dec!(50), dec!(1000));

        let state = AppState::new();
        let recorder = RecordingNotifier::new();
        let notifiers = registry_with(&recorder);

        run(&chain, &state, &notifiers).await.unwrap();
        run(&chain, &state, &notifiers).await.unwrap();

        assert_eq!(state.pools().len(), 1);
    }
}
