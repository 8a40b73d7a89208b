//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! Ports define the extension points the orchestrators are written
//! against: the chain client with its typed contract handles, the
//! injected session-change source, and the notification surface.
//! Adapters implement them for real backends; the testkit scripts them.

mod chain;
mod contracts;
mod notifier;

pub use chain::{ChainClient, SessionWatch};
pub use contracts::{PoolContract, PoolRegistry, TokenContract, TxReceipt};
pub use notifier::{Event, Notifier};
