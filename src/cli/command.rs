//! Command-line interface definitions.
//!
//! Defines the CLI structure for the ballast client using `clap`. Each
//! subcommand is a thin view over the application state store plus the
//! two orchestrator entry points.

use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use std::path::PathBuf;

/// Yield-pool deposit and redemption client for EVM chains
#[derive(Parser, Debug)]
#[command(name = "ballast")]
#[command(version)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(long, global = true, default_value = "config.toml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands for the ballast CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the client (foreground; rebuilds pools on session changes)
    Run,

    /// List discovered pools
    Pools,

    /// Show one pool in detail
    Pool(PoolArgs),

    /// Deposit tokens into a pool
    Deposit(ActionArgs),

    /// Redeem pool shares for tokens
    Redeem(ActionArgs),

    /// Show wallet address and session status
    Wallet,
}

/// Arguments for `ballast pool`.
#[derive(Args, Debug)]
pub struct PoolArgs {
    /// Pool or token address
    pub address: String,
}

/// Arguments for `ballast deposit` and `ballast redeem`.
#[derive(Args, Debug)]
pub struct ActionArgs {
    /// Token address identifying the pool
    #[arg(long)]
    pub token: String,

    /// Amount in display units (e.g. 10.5)
    #[arg(long)]
    pub amount: Decimal,
}
