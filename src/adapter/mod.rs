//! Adapters implementing the ports for real backends.

pub mod evm;
pub mod notifier;
pub mod route_cache;
