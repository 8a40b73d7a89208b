use alloy_primitives::Address;
use rust_decimal::Decimal;
use thiserror::Error;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

/// Errors from the chain client and contract calls.
#[derive(Error, Debug)]
pub enum ChainError {
    /// No signer is configured; write operations cannot be performed.
    #[error("wallet not found: set WALLET_PRIVATE_KEY to enable transactions")]
    WalletNotFound,

    /// The RPC endpoint refused the connection or is on the wrong network.
    #[error("connection rejected: {0}")]
    ConnectionRejected(String),

    #[error("{contract}.{method} call failed: {reason}")]
    CallFailed {
        contract: &'static str,
        method: &'static str,
        reason: String,
    },

    #[error("{method} did not confirm within {secs}s")]
    Timeout { method: &'static str, secs: u64 },
}

/// Transaction orchestration errors.
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("amount must be positive, got {amount}")]
    AmountNotPositive { amount: Decimal },

    #[error("insufficient {balance} balance: requested {requested}, available {available}")]
    InsufficientBalance {
        balance: &'static str,
        requested: Decimal,
        available: Decimal,
    },

    #[error("no pool entry for token {token}")]
    UnknownPool { token: Address },

    #[error("a {action} is already in flight")]
    AlreadyInFlight { action: &'static str },
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Chain(#[from] ChainError),

    #[error(transparent)]
    Execution(#[from] ExecutionError),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
