//! Shared application state.
//!
//! The single process-wide store behind the presentation layer. All
//! mutation goes through the declared transitions below; orchestrators
//! are the only callers.

use std::sync::atomic::{AtomicBool, Ordering};

use alloy_primitives::Address;
use parking_lot::RwLock;

use crate::domain::{BalanceSnapshot, PoolAction, PoolBook, PoolEntry};

/// Shared application state accessible by all services.
pub struct AppState {
    /// The pool read-model, one entry per discovered token.
    pools: RwLock<PoolBook>,
    /// False until a discovery pass has attempted every index.
    instances_loaded: AtomicBool,
    /// Deposit in flight. Global: the UI disables controls while set.
    is_depositing: AtomicBool,
    /// Redeem in flight.
    is_redeeming: AtomicBool,
}

impl AppState {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pools: RwLock::new(PoolBook::new()),
            instances_loaded: AtomicBool::new(false),
            is_depositing: AtomicBool::new(false),
            is_redeeming: AtomicBool::new(false),
        }
    }

    /// Read access to the pool book.
    pub fn pools(&self) -> parking_lot::RwLockReadGuard<'_, PoolBook> {
        self.pools.read()
    }

    /// Publish a discovered entry (transition: add entry).
    pub fn publish_entry(&self, entry: PoolEntry) {
        self.pools.write().insert(entry);
    }

    /// Replace an entry's balances wholesale (transition: refresh).
    pub fn update_balances(&self, pool_address: Address, snapshot: BalanceSnapshot) -> bool {
        self.pools.write().update_balances(pool_address, snapshot)
    }

    /// Drop every entry and reset the loaded flag (transition: clear,
    /// on account/network change).
    pub fn clear_pools(&self) {
        self.pools.write().clear();
        self.instances_loaded.store(false, Ordering::SeqCst);
    }

    /// Mark discovery complete.
    pub fn set_instances_loaded(&self) {
        self.instances_loaded.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn instances_loaded(&self) -> bool {
        self.instances_loaded.load(Ordering::SeqCst)
    }

    /// Claim the in-flight flag for `action`.
    ///
    /// Returns false when a transaction of the same type is already in
    /// flight; the caller must not proceed.
    pub fn begin_action(&self, action: PoolAction) -> bool {
        self.flag(action)
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    /// Release the in-flight flag for `action`.
    pub fn end_action(&self, action: PoolAction) {
        self.flag(action).store(false, Ordering::SeqCst);
    }

    #[must_use]
    pub fn action_in_flight(&self, action: PoolAction) -> bool {
        self.flag(action).load(Ordering::SeqCst)
    }

    const fn flag(&self, action: PoolAction) -> &AtomicBool {
        match action {
            PoolAction::Deposit => &self.is_depositing,
            PoolAction::Redeem => &self.is_redeeming,
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn entry() -> PoolEntry {
        PoolEntry {
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
    fn starts_empty_and_unloaded() {
        let state = AppState::new();
        assert!(state.pools().is_empty());
        assert!(!state.instances_loaded());
        assert!(!state.action_in_flight(PoolAction::Deposit));
        assert!(!state.action_in_flight(PoolAction::Redeem));
    }

    #[test]
    fn begin_action_is_exclusive_per_type() {
        let state = AppState::new();

        assert!(state.begin_action(PoolAction::Deposit));
        assert!(!state.begin_action(PoolAction::Deposit));
        // The other action type has its own flag
        assert!(state.begin_action(PoolAction::Redeem));

        state.end_action(PoolAction::Deposit);
        assert!(state.begin_action(PoolAction::Deposit));
    }

    #[test]
    fn clear_resets_loaded_flag() {
        let state = AppState::new();
        state.publish_entry(entry());
        state.set_instances_loaded();

        state.clear_pools();

        assert!(state.pools().is_empty());
        assert!(!state.instances_loaded());
    }
}
