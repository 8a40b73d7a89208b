//! Wallet session identity.

use alloy_primitives::Address;

/// The active wallet session: account and network, captured at connect
/// time and replaced wholesale when either changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    pub account: Address,
    pub network_id: u64,
}

impl Session {
    /// Whether a signer is available. A read-only session can discover
    /// pools and observe balances but not move value.
    #[must_use]
    pub fn is_read_only(&self) -> bool {
        self.account == Address::ZERO
    }
}

/// A change to the active session, emitted by the injected session
/// watcher. Either change invalidates the pool read-model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    AccountChanged { account: Address },
    NetworkChanged { network_id: u64 },
}
