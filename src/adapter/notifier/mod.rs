//! Notification adapters.
//!
//! Implements the `port::Notifier` trait for the available backends.

#[cfg(feature = "telegram")]
mod telegram;

#[cfg(feature = "telegram")]
pub use telegram::{TelegramConfig, TelegramNotifier};

use tracing::info;

use crate::port::{Event, Notifier};

/// Registry of notifiers.
pub struct NotifierRegistry {
    notifiers: Vec<Box<dyn Notifier>>,
}

impl NotifierRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self { notifiers: vec![] }
    }

    /// Register a notifier.
    pub fn register(&mut self, notifier: Box<dyn Notifier>) {
        self.notifiers.push(notifier);
    }

    /// Notify all registered notifiers.
    pub fn notify_all(&self, event: Event) {
        for notifier in &self.notifiers {
            notifier.notify(event.clone());
        }
    }

    /// Number of registered notifiers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.notifiers.len()
    }

    /// Check if registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.notifiers.is_empty()
    }
}

impl Default for NotifierRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// A no-op notifier for testing or when notifications are disabled.
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn notify(&self, _event: Event) {}
}

/// A logging notifier that logs events via tracing.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, event: Event) {
        match event {
            Event::WalletNotFound => {
                info!("Wallet not found - running read-only");
            }
            Event::ConnectRejected { reason } => {
                info!(reason = %reason, "Connection rejected");
            }
            Event::DiscoveryCompleted {
                discovered,
                skipped,
            } => {
                info!(discovered, skipped, "Pool discovery completed");
            }
            Event::PoolSkipped { index, reason } => {
                info!(index, reason = %reason, "Pool skipped");
            }
            Event::ActionCompleted {
                action,
                pool_name,
                amount,
            } => {
                info!(
                    action = %action,
                    pool = %pool_name,
                    amount = %amount,
                    "Action completed"
                );
            }
            Event::ActionFailed { action, reason } => {
                info!(action = %action, reason = %reason, "Action failed");
            }
            Event::SessionChanged(change) => {
                info!(change = ?change, "Session changed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingNotifier {
        count: Arc<AtomicUsize>,
    }

    impl Notifier for CountingNotifier {
        fn notify(&self, _event: Event) {
            self.count.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn registry_notifies_every_backend() {
        let count = Arc::new(AtomicUsize::new(0));
        let mut registry = NotifierRegistry::new();

        registry.register(Box::new(CountingNotifier {
            count: count.clone(),
        }));
        registry.register(Box::new(CountingNotifier {
            count: count.clone(),
        }));

        registry.notify_all(Event::WalletNotFound);

        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn null_notifier_swallows_events() {
        NullNotifier.notify(Event::WalletNotFound);
    }
}
