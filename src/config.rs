//! Application configuration loading and validation.
//!
//! Configuration is loaded from a TOML file with environment variable
//! overrides for sensitive values like `WALLET_PRIVATE_KEY`.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use alloy_primitives::Address;
use serde::Deserialize;
use tracing_subscriber::{fmt, EnvFilter};

use crate::error::{ConfigError, Result};

#[derive(Debug, Deserialize)]
pub struct Config {
    pub network: NetworkConfig,
    pub factory: FactoryConfig,
    pub logging: LoggingConfig,
    #[serde(default)]
    pub wallet: WalletConfig,
    #[serde(default)]
    pub transactions: TransactionsConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub telegram: TelegramAppConfig,
    /// Path to the route cache file; `None` disables the cache.
    #[serde(default = "default_route_cache")]
    pub route_cache: Option<PathBuf>,
}

fn default_route_cache() -> Option<PathBuf> {
    dirs::cache_dir().map(|dir| dir.join("ballast").join("routes.json"))
}

#[derive(Debug, Deserialize)]
pub struct NetworkConfig {
    /// HTTP RPC endpoint of the chain node.
    pub rpc_url: String,
    /// Expected chain ID; connecting to a node on another network is
    /// rejected rather than silently talking to the wrong contracts.
    pub chain_id: u64,
}

#[derive(Debug, Deserialize)]
pub struct FactoryConfig {
    /// Address of the pool factory registry contract.
    pub address: String,
}

impl FactoryConfig {
    /// The factory address parsed, validated by [`Config::load`].
    #[must_use]
    pub fn parsed_address(&self) -> Address {
        Address::from_str(&self.address).unwrap_or(Address::ZERO)
    }
}

/// Wallet configuration for signing transactions.
/// Private key is loaded from `WALLET_PRIVATE_KEY` env var at runtime
/// (never from the config file).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WalletConfig {
    #[serde(skip)]
    pub private_key: Option<String>,
}

/// Transaction orchestration knobs.
#[derive(Debug, Clone, Deserialize)]
pub struct TransactionsConfig {
    /// Re-approve when the existing allowance is non-zero but smaller
    /// than the requested amount. Off by default: the legacy client
    /// only approved on a zero allowance, and some integrations depend
    /// on never re-approving.
    #[serde(default)]
    pub reapprove_below_amount: bool,
    /// Upper bound on any single chain call, approval and value-moving
    /// transactions included. A timeout fails the action and clears its
    /// in-flight flag.
    #[serde(default = "default_confirmation_timeout_secs")]
    pub confirmation_timeout_secs: u64,
}

const fn default_confirmation_timeout_secs() -> u64 {
    300
}

impl TransactionsConfig {
    #[must_use]
    pub const fn confirmation_timeout(&self) -> Duration {
        Duration::from_secs(self.confirmation_timeout_secs)
    }
}

impl Default for TransactionsConfig {
    fn default() -> Self {
        Self {
            reapprove_below_amount: false,
            confirmation_timeout_secs: default_confirmation_timeout_secs(),
        }
    }
}

/// Session change polling.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
}

const fn default_poll_interval_secs() -> u64 {
    15
}

impl SessionConfig {
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
        }
    }
}

const fn default_true() -> bool {
    true
}

/// Telegram notification configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TelegramAppConfig {
    /// Enable telegram notifications.
    #[serde(default)]
    pub enabled: bool,
    /// Send per-action success/failure alerts.
    #[serde(default = "default_true")]
    pub notify_actions: bool,
    /// Send discovery summaries.
    #[serde(default)]
    pub notify_discovery: bool,
}

#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;

        let mut config: Self = toml::from_str(&content).map_err(ConfigError::Parse)?;

        // Private key comes from the environment only
        config.wallet.private_key = std::env::var("WALLET_PRIVATE_KEY").ok();

        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.network.rpc_url.is_empty() {
            return Err(ConfigError::MissingField { field: "rpc_url" }.into());
        }
        url::Url::parse(&self.network.rpc_url).map_err(|e| ConfigError::InvalidValue {
            field: "rpc_url",
            reason: e.to_string(),
        })?;
        Address::from_str(&self.factory.address).map_err(|e| ConfigError::InvalidValue {
            field: "factory.address",
            reason: e.to_string(),
        })?;
        Ok(())
    }

    pub fn init_logging(&self) {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&self.logging.level));

        match self.logging.format.as_str() {
            "json" => {
                fmt().json().with_env_filter(filter).init();
            }
            _ => {
                fmt().with_env_filter(filter).init();
            }
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            network: NetworkConfig {
                rpc_url: "http://127.0.0.1:8545".into(),
                chain_id: 1337,
            },
            factory: FactoryConfig {
                address: String::new(),
            },
            logging: LoggingConfig {
                level: "info".into(),
                format: "pretty".into(),
            },
            wallet: WalletConfig::default(),
            transactions: TransactionsConfig::default(),
            session: SessionConfig::default(),
            telegram: TelegramAppConfig::default(),
            route_cache: default_route_cache(),
        }
    }
}
