//! Ballast - yield-pool deposit and redemption client for EVM chains.
//!
//! This crate connects to an EVM endpoint, discovers the liquidity
//! pools registered in a factory contract (one pool per supported
//! token), and lets a user deposit and redeem tokens against those
//! pools while observing balances and pool share.
//!
//! # Architecture
//!
//! The crate follows a hexagonal layout:
//!
//! - **`domain`** - Chain-agnostic types: [`domain::PoolEntry`], the
//!   [`domain::PoolBook`] read-model, session identity, and the unit
//!   codec in [`domain::units`]
//! - **`port`** - Trait seams the orchestrators are written against:
//!   chain client, typed contract handles, session watch, notifier
//! - **`adapter`** - Implementations: alloy-backed EVM access with
//!   `sol!`-typed contract schemas, notification backends, the route
//!   cache
//! - **`app`** - Orchestration: pool discovery, the two-phase
//!   deposit/redeem state machine, and the shared [`app::AppState`]
//! - **`cli`** - Thin presentation views over the store plus the two
//!   orchestrator entry points
//!
//! # Example
//!
//! ```no_run
//! use ballast::app::App;
//! use ballast::config::Config;
//!
//! # async fn run() -> ballast::error::Result<()> {
//! let config = Config::load("config.toml")?;
//! App::run(config).await
//! # }
//! ```

pub mod adapter;
pub mod app;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
