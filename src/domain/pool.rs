//! Pool read-model types.

use alloy_primitives::Address;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::units::pool_share_percent;

/// The client's local record for one token's pool.
///
/// `token_address` and `pool_address` identify the entry; `decimals` and
/// `name` are fixed at discovery. The three balance fields are replaced
/// wholesale by a fresh read from the chain, never patched in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolEntry {
    pub token_address: Address,
    pub pool_address: Address,
    pub decimals: u8,
    pub name: String,
    pub total_supply: Decimal,
    /// The user's deposit-receipt (LPT) balance in this pool.
    pub user_pool_balance: Decimal,
    /// The user's spendable underlying-token balance.
    pub user_token_balance: Decimal,
    pub updated_at: DateTime<Utc>,
}

impl PoolEntry {
    /// The user's share of the pool as a percentage (0 when the pool is
    /// empty).
    #[must_use]
    pub fn share_percent(&self) -> Decimal {
        pool_share_percent(self.user_pool_balance, self.total_supply)
    }
}

/// A wholesale replacement for an entry's mutable balance fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BalanceSnapshot {
    pub total_supply: Decimal,
    pub user_pool_balance: Decimal,
    pub user_token_balance: Decimal,
}

/// The two value-moving operations a pool supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolAction {
    Deposit,
    Redeem,
}

impl PoolAction {
    /// Lowercase verb for logs and error messages.
    #[must_use]
    pub const fn verb(self) -> &'static str {
        match self {
            Self::Deposit => "deposit",
            Self::Redeem => "redeem",
        }
    }

    /// Uppercase label used in user-facing notifications.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Deposit => "DEPOSIT",
            Self::Redeem => "REDEEM",
        }
    }
}

impl std::fmt::Display for PoolAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.verb())
    }
}
