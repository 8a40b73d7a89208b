//! The normalized pool read-model collection.

use alloy_primitives::Address;

use super::pool::{BalanceSnapshot, PoolEntry};

/// Insertion-ordered collection of pool entries, at most one per token.
///
/// Entries are created only by discovery and never deleted individually;
/// the whole book is cleared and rebuilt on account or network change.
#[derive(Debug, Default)]
pub struct PoolBook {
    entries: Vec<PoolEntry>,
}

impl PoolBook {
    #[must_use]
    pub const fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Publish an entry. A re-discovered token replaces its previous
    /// entry in place, preserving listing order.
    pub fn insert(&mut self, entry: PoolEntry) {
        match self
            .entries
            .iter_mut()
            .find(|e| e.token_address == entry.token_address)
        {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
    }

    /// Replace an entry's balance fields wholesale.
    ///
    /// Returns false when no entry matches `pool_address` (e.g. the book
    /// was cleared by a session change while a refresh was in flight).
    pub fn update_balances(&mut self, pool_address: Address, snapshot: BalanceSnapshot) -> bool {
        match self
            .entries
            .iter_mut()
            .find(|e| e.pool_address == pool_address)
        {
            Some(entry) => {
                entry.total_supply = snapshot.total_supply;
                entry.user_pool_balance = snapshot.user_pool_balance;
                entry.user_token_balance = snapshot.user_token_balance;
                entry.updated_at = chrono::Utc::now();
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn by_token(&self, token_address: Address) -> Option<&PoolEntry> {
        self.entries.iter().find(|e| e.token_address == token_address)
    }

    #[must_use]
    pub fn by_pool(&self, pool_address: Address) -> Option<&PoolEntry> {
        self.entries.iter().find(|e| e.pool_address == pool_address)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PoolEntry> {
        self.entries.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn entry(token: u64, pool: u64, name: &str) -> PoolEntry {
        PoolEntry {
            token_address: Address::with_last_byte(token as u8),
            pool_address: Address::with_last_byte(pool as u8),
            decimals: 18,
            name: name.into(),
            total_supply: dec!(1000),
            user_pool_balance: dec!(100),
            user_token_balance: dec!(50),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn no_two_entries_share_a_token_address() {
        let mut book = PoolBook::new();
        book.insert(entry(1, 10, "DAI"));
        book.insert(entry(2, 20, "USDC"));
        book.insert(entry(1, 11, "DAI v2"));

        assert_eq!(book.len(), 2);
        let dai = book.by_token(Address::with_last_byte(1)).unwrap();
        assert_eq!(dai.name, "DAI v2");
        // Re-insertion keeps listing order
        assert_eq!(book.iter().next().unwrap().name, "DAI v2");
    }

    #[test]
    fn balances_are_replaced_wholesale() {
        let mut book = PoolBook::new();
        book.insert(entry(1, 10, "DAI"));

        let updated = book.update_balances(
            Address::with_last_byte(10),
            BalanceSnapshot {
                total_supply: dec!(2000),
                user_pool_balance: dec!(150),
                user_token_balance: Decimal::ZERO,
            },
        );
        assert!(updated);

        let dai = book.by_pool(Address::with_last_byte(10)).unwrap();
        assert_eq!(dai.total_supply, dec!(2000));
        assert_eq!(dai.user_pool_balance, dec!(150));
        assert_eq!(dai.user_token_balance, Decimal::ZERO);
        // Identity fields untouched
        assert_eq!(dai.decimals, 18);
        assert_eq!(dai.name, "DAI");
    }

    #[test]
    fn update_on_unknown_pool_is_a_noop() {
        let mut book = PoolBook::new();
        book.insert(entry(1, 10, "DAI"));

        let updated = book.update_balances(
            Address::with_last_byte(99),
            BalanceSnapshot {
                total_supply: Decimal::ZERO,
                user_pool_balance: Decimal::ZERO,
                user_token_balance: Decimal::ZERO,
            },
        );
        assert!(!updated);
        assert_eq!(book.by_pool(Address::with_last_byte(10)).unwrap().total_supply, dec!(1000));
    }

    #[test]
    fn clear_empties_the_book() {
        let mut book = PoolBook::new();
        book.insert(entry(1, 10, "DAI"));
        book.insert(entry(2, 20, "USDC"));
        book.clear();
        assert!(book.is_empty());
    }
}
