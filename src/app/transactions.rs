//! Deposit/redeem orchestration.
//!
//! Runs the two-phase protocol for one pool: allowance check, optional
//! approval, the value-moving transaction, then a wholesale balance
//! refresh. Phases advance through an explicit state machine; every
//! chain call is bounded by the configured confirmation timeout so a
//! hung node can never leave an in-flight flag stuck.

use std::future::Future;
use std::sync::Arc;

use alloy_primitives::{Address, U256};
use rust_decimal::Decimal;
use tracing::{debug, error, info};

use crate::adapter::notifier::NotifierRegistry;
use crate::config::TransactionsConfig;
use crate::domain::units::{from_chain_units, to_chain_units};
use crate::domain::{BalanceSnapshot, PoolAction, PoolEntry};
use crate::error::{ChainError, ExecutionError, Result};
use crate::port::{ChainClient, Event};

use super::state::AppState;

/// States of one transaction orchestration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TxPhase {
    Idle,
    AwaitingApproval,
    AwaitingConfirmation,
    Settling,
    Failed,
}

fn transition(phase: &mut TxPhase, next: TxPhase, action: PoolAction) {
    debug!(action = %action, from = ?*phase, to = ?next, "Transaction phase");
    *phase = next;
}

/// Executes deposits and redeems against discovered pools.
pub struct TransactionOrchestrator {
    chain: Arc<dyn ChainClient>,
    state: Arc<AppState>,
    notifiers: Arc<NotifierRegistry>,
    config: TransactionsConfig,
}

impl TransactionOrchestrator {
    #[must_use]
    pub fn new(
        chain: Arc<dyn ChainClient>,
        state: Arc<AppState>,
        notifiers: Arc<NotifierRegistry>,
        config: TransactionsConfig,
    ) -> Self {
        Self {
            chain,
            state,
            notifiers,
            config,
        }
    }

    /// Run one deposit or redeem for the pool registered for `token`.
    ///
    /// Preconditions are rejected before any chain call is issued and
    /// before the in-flight flag is set. On success the entry's
    /// balances are refreshed wholesale; on failure they are left at
    /// their last-known-good values.
    pub async fn execute(
        &self,
        action: PoolAction,
        token: Address,
        amount: Decimal,
    ) -> Result<()> {
        let entry = {
            let pools = self.state.pools();
            pools.by_token(token).cloned()
        }
        .ok_or(ExecutionError::UnknownPool { token })?;

        if amount <= Decimal::ZERO {
            return Err(ExecutionError::AmountNotPositive { amount }.into());
        }

        let (available, balance) = match action {
            PoolAction::Deposit => (entry.user_token_balance, "token"),
            PoolAction::Redeem => (entry.user_pool_balance, "pool share"),
        };
        if amount > available {
            return Err(ExecutionError::InsufficientBalance {
                balance,
                requested: amount,
                available,
            }
            .into());
        }

        if !self.state.begin_action(action) {
            return Err(ExecutionError::AlreadyInFlight {
                action: action.verb(),
            }
            .into());
        }

        let result = self.run_phases(action, &entry, amount).await;
        self.state.end_action(action);

        match result {
            Ok(()) => {
                self.notifiers.notify_all(Event::ActionCompleted {
                    action,
                    pool_name: entry.name.clone(),
                    amount,
                });
                Ok(())
            }
            Err(e) => {
                debug!(action = %action, to = ?TxPhase::Failed, "Transaction phase");
                error!(action = %action, pool = %entry.name, error = %e, "Transaction failed");
                self.notifiers.notify_all(Event::ActionFailed {
                    action,
                    reason: e.to_string(),
                });
                Err(e)
            }
        }
    }

    async fn run_phases(
        &self,
        action: PoolAction,
        entry: &PoolEntry,
        amount: Decimal,
    ) -> Result<()> {
        let account = self.chain.session().account;
        let spender = entry.pool_address;
        let units = to_chain_units(amount, entry.decimals);

        // The approval surface: the underlying token for deposits, the
        // pool's own share token for redeems.
        let approval_token = match action {
            PoolAction::Deposit => self.chain.token_at(entry.token_address),
            PoolAction::Redeem => self.chain.token_at(entry.pool_address),
        };

        let mut phase = TxPhase::Idle;

        let allowance = self
            .bounded(approval_token.allowance(account, spender), "allowance")
            .await?;

        // A non-zero allowance is accepted even when it is smaller than
        // the requested amount; re-approving in that case is opt-in.
        let needs_approval =
            allowance.is_zero() || (self.config.reapprove_below_amount && allowance < units);

        if needs_approval {
            transition(&mut phase, TxPhase::AwaitingApproval, action);
            let receipt = self
                .bounded(approval_token.approve(spender, U256::MAX), "approve")
                .await?;
            info!(tx_hash = %receipt.tx_hash, pool = %entry.name, "Approval confirmed");
        }

        transition(&mut phase, TxPhase::AwaitingConfirmation, action);
        let pool = self.chain.pool_at(entry.pool_address);
        let receipt = match action {
            PoolAction::Deposit => self.bounded(pool.deposit(units), "deposit").await?,
            PoolAction::Redeem => self.bounded(pool.redeem(units), "redeem").await?,
        };
        info!(
            tx_hash = %receipt.tx_hash,
            action = %action,
            amount = %amount,
            pool = %entry.name,
            "Transaction confirmed"
        );

        transition(&mut phase, TxPhase::Settling, action);
        let underlying = self.chain.token_at(entry.token_address);
        let (supply, user_deposit, user_balance) = tokio::try_join!(
            pool.total_supply(),
            pool.balance_of(account),
            underlying.balance_of(account),
        )?;
        self.state.update_balances(
            entry.pool_address,
            BalanceSnapshot {
                total_supply: from_chain_units(supply, entry.decimals),
                user_pool_balance: from_chain_units(user_deposit, entry.decimals),
                user_token_balance: from_chain_units(user_balance, entry.decimals),
            },
        );

        transition(&mut phase, TxPhase::Idle, action);
        Ok(())
    }

    /// Bound a chain call by the confirmation timeout.
    async fn bounded<T>(
        &self,
        call: impl Future<Output = Result<T>> + Send,
        method: &'static str,
    ) -> Result<T> {
        match tokio::time::timeout(self.config.confirmation_timeout(), call).await {
            Ok(result) => result,
            Err(_) => Err(ChainError::Timeout {
                method,
                secs: self.config.confirmation_timeout_secs,
            }
            .into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::discovery;
    use crate::error::Error;
    use crate::testkit::chain::ScriptedChain;
    use crate::testkit::notifier::RecordingNotifier;
    use rust_decimal_macros::dec;

    struct Harness {
        chain: ScriptedChain,
        state: Arc<AppState>,
        recorder: RecordingNotifier,
        orchestrator: TransactionOrchestrator,
        token: Address,
        pool: Address,
    }

    fn account() -> Address {
        Address::with_last_byte(0x99)
    }

    async fn harness(decimals: u8, config: TransactionsConfig) -> Harness {
        let chain = ScriptedChain::new(account());
        let (token, pool) = chain.with_pool("DAI", decimals, dec!(100), dec!(50), dec!(1000));

        let state = Arc::new(AppState::new());
        let recorder = RecordingNotifier::new();
        let mut notifiers = NotifierRegistry::new();
        notifiers.register(Box::new(recorder.clone()));
        let notifiers = Arc::new(notifiers);

        discovery::run(&chain, &state, &notifiers).await.unwrap();

        let orchestrator = TransactionOrchestrator::new(
            Arc::new(chain.clone()),
            state.clone(),
            notifiers,
            config,
        );

        Harness {
            chain,
            state,
            recorder,
            orchestrator,
            token,
            pool,
        }
    }

    /// Contract calls made after discovery finished.
    fn tx_calls(h: &Harness, calls_before: usize) -> Vec<String> {
        h.chain.calls().split_off(calls_before)
    }

    #[tokio::test]
    async fn rejects_non_positive_amounts_before_any_chain_call() {
        let h = harness(6, TransactionsConfig::default()).await;
        let before = h.chain.calls().len();

        let err = h
            .orchestrator
            .execute(PoolAction::Deposit, h.token, Decimal::ZERO)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::Execution(ExecutionError::AmountNotPositive { .. })
        ));
        assert!(tx_calls(&h, before).is_empty());
        assert!(!h.state.action_in_flight(PoolAction::Deposit));
    }

    #[tokio::test]
    async fn rejects_amounts_beyond_available_balance() {
        let h = harness(6, TransactionsConfig::default()).await;
        let before = h.chain.calls().len();

        let err = h
            .orchestrator
            .execute(PoolAction::Deposit, h.token, dec!(100.000001))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::Execution(ExecutionError::InsufficientBalance { .. })
        ));
        assert!(tx_calls(&h, before).is_empty());
        assert!(!h.state.action_in_flight(PoolAction::Deposit));

        // Redeems check the pool-share balance instead
        let err = h
            .orchestrator
            .execute(PoolAction::Redeem, h.token, dec!(50.5))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Execution(ExecutionError::InsufficientBalance { .. })
        ));
    }

    #[tokio::test]
    async fn rejects_unknown_tokens() {
        let h = harness(6, TransactionsConfig::default()).await;

        let err = h
            .orchestrator
            .execute(PoolAction::Deposit, Address::with_last_byte(0x77), dec!(1))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::Execution(ExecutionError::UnknownPool { .. })
        ));
    }

    #[tokio::test]
    async fn zero_allowance_deposit_approves_then_deposits() {
        let h = harness(6, TransactionsConfig::default()).await;
        let before = h.chain.calls().len();

        h.orchestrator
            .execute(PoolAction::Deposit, h.token, dec!(10))
            .await
            .unwrap();

        assert_eq!(
            tx_calls(&h, before),
            vec![
                "token0.allowance",
                "token0.approve(max)",
                "pool0.deposit(10000000)",
                "pool0.totalSupply",
                "pool0.balanceOf",
                "token0.balanceOf",
            ]
        );

        // Balances were replaced wholesale from the refresh
        let pools = h.state.pools();
        let entry = pools.by_token(h.token).unwrap();
        assert_eq!(entry.user_token_balance, dec!(90));
        assert_eq!(entry.user_pool_balance, dec!(60));
        assert_eq!(entry.total_supply, dec!(1010));
        drop(pools);

        assert!(!h.state.action_in_flight(PoolAction::Deposit));
        let toasts: Vec<_> = h
            .recorder
            .events()
            .iter()
            .filter_map(Event::toast)
            .collect();
        assert_eq!(toasts, vec!["DEPOSIT - 10 tokens"]);
    }

    #[tokio::test]
    async fn existing_allowance_skips_approval() {
        let h = harness(6, TransactionsConfig::default()).await;
        h.chain
            .set_allowance(h.token, account(), h.pool, U256::MAX);
        let before = h.chain.calls().len();

        h.orchestrator
            .execute(PoolAction::Deposit, h.token, dec!(10))
            .await
            .unwrap();

        let calls = tx_calls(&h, before);
        assert!(calls.iter().all(|c| !c.contains("approve")));
        assert_eq!(calls[0], "token0.allowance");
        assert_eq!(calls[1], "pool0.deposit(10000000)");
    }

    #[tokio::test]
    async fn small_nonzero_allowance_is_not_topped_up_by_default() {
        // Known limitation preserved from the legacy client: any
        // non-zero allowance is taken at face value, even one smaller
        // than the requested amount. The transaction is submitted and
        // left to revert on chain.
        let h = harness(6, TransactionsConfig::default()).await;
        h.chain
            .set_allowance(h.token, account(), h.pool, U256::from(1u64));
        let before = h.chain.calls().len();

        h.orchestrator
            .execute(PoolAction::Deposit, h.token, dec!(10))
            .await
            .unwrap();

        let calls = tx_calls(&h, before);
        assert!(calls.iter().all(|c| !c.contains("approve")));
    }

    #[tokio::test]
    async fn reapprove_flag_tops_up_small_allowances() {
        let config = TransactionsConfig {
            reapprove_below_amount: true,
            ..TransactionsConfig::default()
        };
        let h = harness(6, config).await;
        h.chain
            .set_allowance(h.token, account(), h.pool, U256::from(1u64));
        let before = h.chain.calls().len();

        h.orchestrator
            .execute(PoolAction::Deposit, h.token, dec!(10))
            .await
            .unwrap();

        let calls = tx_calls(&h, before);
        assert_eq!(calls[1], "token0.approve(max)");
    }

    #[tokio::test]
    async fn redeem_approves_the_pool_share_token() {
        let h = harness(18, TransactionsConfig::default()).await;
        let before = h.chain.calls().len();

        h.orchestrator
            .execute(PoolAction::Redeem, h.token, dec!(5))
            .await
            .unwrap();

        let calls = tx_calls(&h, before);
        assert_eq!(calls[0], "pool0.allowance");
        assert_eq!(calls[1], "pool0.approve(max)");
        assert_eq!(calls[2], "pool0.redeem(5000000000000000000)");

        let toasts: Vec<_> = h
            .recorder
            .events()
            .iter()
            .filter_map(Event::toast)
            .collect();
        assert_eq!(toasts, vec!["REDEEM - 5 LPT tokens"]);
    }

    #[tokio::test]
    async fn failed_submission_clears_flag_and_leaves_balances() {
        let h = harness(6, TransactionsConfig::default()).await;
        h.chain.fail(h.pool, "deposit");

        let err = h
            .orchestrator
            .execute(PoolAction::Deposit, h.token, dec!(10))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Chain(ChainError::CallFailed { .. })));

        // The approval phase ran; the failure came after it
        assert!(h.chain.calls().iter().any(|c| c == "token0.approve(max)"));

        let pools = h.state.pools();
        let entry = pools.by_token(h.token).unwrap();
        assert_eq!(entry.user_token_balance, dec!(100));
        assert_eq!(entry.user_pool_balance, dec!(50));
        assert_eq!(entry.total_supply, dec!(1000));
        drop(pools);

        assert!(!h.state.action_in_flight(PoolAction::Deposit));
        assert_eq!(
            h.recorder
                .count_matching(|e| matches!(e, Event::ActionCompleted { .. })),
            0
        );
        assert_eq!(
            h.recorder
                .count_matching(|e| matches!(e, Event::ActionFailed { .. })),
            1
        );
    }

    #[tokio::test]
    async fn concurrent_action_of_same_type_is_rejected() {
        let h = harness(6, TransactionsConfig::default()).await;
        assert!(h.state.begin_action(PoolAction::Deposit));
        let before = h.chain.calls().len();

        let err = h
            .orchestrator
            .execute(PoolAction::Deposit, h.token, dec!(1))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::Execution(ExecutionError::AlreadyInFlight { .. })
        ));
        assert!(tx_calls(&h, before).is_empty());
        // The pre-existing flag is not cleared by the rejected call
        assert!(h.state.action_in_flight(PoolAction::Deposit));
    }
}
