//! Session change detection by polling the node.

use std::sync::Arc;
use std::time::Duration;

use alloy_provider::Provider;
use async_trait::async_trait;
use tracing::debug;

use crate::domain::{Session, SessionEvent};
use crate::port::SessionWatch;

use super::provider::EvmContext;

/// Polls the endpoint's chain id and compares it against the session
/// captured at connect time.
///
/// The account is derived from the local signer and cannot drift within
/// a process, so only network changes are observable here; scripted
/// watchers in the testkit exercise the account-change path.
pub struct PollingSessionWatch {
    ctx: Arc<EvmContext>,
    last: Session,
    interval: Duration,
}

impl PollingSessionWatch {
    pub(crate) fn new(ctx: Arc<EvmContext>, last: Session, interval: Duration) -> Self {
        Self {
            ctx,
            last,
            interval,
        }
    }
}

#[async_trait]
impl SessionWatch for PollingSessionWatch {
    async fn next_change(&mut self) -> Option<SessionEvent> {
        loop {
            tokio::time::sleep(self.interval).await;

            match self.ctx.read_provider().get_chain_id().await {
                Ok(network_id) if network_id != self.last.network_id => {
                    self.last.network_id = network_id;
                    return Some(SessionEvent::NetworkChanged { network_id });
                }
                Ok(_) => {}
                Err(e) => {
                    // A transient poll failure is not a session change
                    debug!(error = %e, "Session poll failed");
                }
            }
        }
    }
}
