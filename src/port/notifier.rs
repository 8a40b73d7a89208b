//! Notifier port for user-facing event notifications.

use rust_decimal::Decimal;

use crate::domain::{PoolAction, SessionEvent};

/// Events that can trigger notifications.
#[derive(Debug, Clone)]
pub enum Event {
    /// No signer configured; transactions are unavailable.
    WalletNotFound,
    /// The RPC endpoint refused the connection or is on the wrong
    /// network.
    ConnectRejected { reason: String },
    /// Pool discovery finished (some indices may have been skipped).
    DiscoveryCompleted { discovered: usize, skipped: usize },
    /// One token index could not be resolved and was skipped.
    PoolSkipped { index: u64, reason: String },
    /// A deposit or redeem confirmed and balances were refreshed.
    ActionCompleted {
        action: PoolAction,
        pool_name: String,
        amount: Decimal,
    },
    /// A deposit or redeem failed; balances were left untouched.
    ActionFailed { action: PoolAction, reason: String },
    /// The account or network changed; the read-model was rebuilt.
    SessionChanged(SessionEvent),
}

impl Event {
    /// The short user-facing message for this event, if it has one.
    #[must_use]
    pub fn toast(&self) -> Option<String> {
        match self {
            Self::WalletNotFound => {
                Some("Wallet not found, set WALLET_PRIVATE_KEY to connect".into())
            }
            Self::ConnectRejected { reason } => Some(format!("Could not connect: {reason}")),
            Self::ActionCompleted {
                action: PoolAction::Deposit,
                amount,
                ..
            } => Some(format!("DEPOSIT - {amount} tokens")),
            Self::ActionCompleted {
                action: PoolAction::Redeem,
                amount,
                ..
            } => Some(format!("REDEEM - {amount} LPT tokens")),
            _ => None,
        }
    }
}

/// Receives events; implementations decide transport and formatting.
pub trait Notifier: Send + Sync {
    fn notify(&self, event: Event);
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn deposit_toast_names_action_and_amount() {
        let event = Event::ActionCompleted {
            action: PoolAction::Deposit,
            pool_name: "DAI".into(),
            amount: dec!(10),
        };
        assert_eq!(event.toast().unwrap(), "DEPOSIT - 10 tokens");
    }

    #[test]
    fn redeem_toast_names_lpt_units() {
        let event = Event::ActionCompleted {
            action: PoolAction::Redeem,
            pool_name: "DAI".into(),
            amount: dec!(2.5),
        };
        assert_eq!(event.toast().unwrap(), "REDEEM - 2.5 LPT tokens");
    }

    #[test]
    fn skipped_pools_have_no_toast() {
        let event = Event::PoolSkipped {
            index: 3,
            reason: "missing contract".into(),
        };
        assert!(event.toast().is_none());
    }
}
