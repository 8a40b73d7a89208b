//! Typed contract call ports.
//!
//! One trait per remote contract shape, decoded at the adapter boundary
//! so orchestrators operate on typed values rather than raw call data.
//! Write methods resolve when the transaction is confirmed on chain.

use alloy_primitives::{Address, U256};
use async_trait::async_trait;

use crate::error::Result;

/// A confirmed transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxReceipt {
    pub tx_hash: String,
}

/// The factory registry mapping an index to a token and a token to its
/// pool.
#[async_trait]
pub trait PoolRegistry: Send + Sync {
    /// Number of registered tokens at call time.
    async fn token_count(&self) -> Result<u64>;

    /// The token address at `index` (0-based, ascending enumeration).
    async fn token_at(&self, index: u64) -> Result<Address>;

    /// The pool address registered for `token`.
    async fn pool_for(&self, token: Address) -> Result<Address>;
}

/// A pool contract: deposit target and share-token issuer.
#[async_trait]
pub trait PoolContract: Send + Sync {
    fn address(&self) -> Address;

    async fn name(&self) -> Result<String>;

    async fn total_supply(&self) -> Result<U256>;

    /// The caller's deposit-receipt balance.
    async fn balance_of(&self, owner: Address) -> Result<U256>;

    /// Deposit `units` of the underlying token; resolves on receipt.
    async fn deposit(&self, units: U256) -> Result<TxReceipt>;

    /// Redeem `units` of pool shares; resolves on receipt.
    async fn redeem(&self, units: U256) -> Result<TxReceipt>;
}

/// An ERC-20 surface: balances, allowances, approvals.
#[async_trait]
pub trait TokenContract: Send + Sync {
    fn address(&self) -> Address;

    async fn decimals(&self) -> Result<u8>;

    async fn balance_of(&self, owner: Address) -> Result<U256>;

    async fn allowance(&self, owner: Address, spender: Address) -> Result<U256>;

    /// Grant `spender` an allowance of `amount`; resolves on receipt.
    async fn approve(&self, spender: Address, amount: U256) -> Result<TxReceipt>;
}
