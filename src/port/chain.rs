//! Chain client and session-watch ports.

use std::sync::Arc;

use alloy_primitives::Address;
use async_trait::async_trait;

use crate::domain::{Session, SessionEvent};

use super::contracts::{PoolContract, PoolRegistry, TokenContract};

/// Handle to a connected chain endpoint.
///
/// Contract handles are cheap to construct, so the read-model stores
/// only addresses and asks the client for a fresh handle per operation.
pub trait ChainClient: Send + Sync {
    /// The session (account + network) captured at connect time.
    fn session(&self) -> Session;

    /// The factory registry this client was connected against.
    fn registry(&self) -> Arc<dyn PoolRegistry>;

    /// A typed handle to the pool contract at `address`.
    fn pool_at(&self, address: Address) -> Arc<dyn PoolContract>;

    /// A typed ERC-20 handle to the token contract at `address`.
    ///
    /// Pool-share tokens are themselves ERC-20s; pointing this at a
    /// pool address yields the handle used for redeem approvals.
    fn token_at(&self, address: Address) -> Arc<dyn TokenContract>;
}

/// Injected source of account/network change events.
///
/// Returning `None` ends the stream; the application treats that as
/// shutdown rather than reconnecting.
#[async_trait]
pub trait SessionWatch: Send {
    async fn next_change(&mut self) -> Option<SessionEvent>;
}
