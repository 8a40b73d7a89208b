//! Connected chain client over an alloy HTTP provider.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::Address;
use alloy_provider::network::EthereumWallet;
use alloy_provider::{Provider, ProviderBuilder};
use alloy_signer_local::PrivateKeySigner;
use tracing::info;

use crate::config::Config;
use crate::domain::Session;
use crate::error::{ChainError, ConfigError, Result};
use crate::port::{ChainClient, PoolContract, PoolRegistry, TokenContract};

use super::contracts::{Erc20Adapter, FactoryAdapter, PoolAdapter};
use super::session::PollingSessionWatch;

/// Shared connection context. Providers are cheap to build, so each
/// contract call constructs a fresh one instead of threading a single
/// provider's concrete type through the crate.
pub(crate) struct EvmContext {
    rpc_url: url::Url,
    signer: Option<PrivateKeySigner>,
}

impl EvmContext {
    pub(crate) fn read_provider(&self) -> impl Provider {
        ProviderBuilder::new().connect_http(self.rpc_url.clone())
    }

    /// A provider that can sign and submit transactions.
    ///
    /// Fails with [`ChainError::WalletNotFound`] in read-only sessions.
    pub(crate) fn write_provider(&self) -> Result<impl Provider> {
        let signer = self.signer.clone().ok_or(ChainError::WalletNotFound)?;
        let wallet = EthereumWallet::from(signer);
        Ok(ProviderBuilder::new()
            .wallet(wallet)
            .connect_http(self.rpc_url.clone()))
    }
}

/// Chain client backed by an EVM JSON-RPC endpoint.
pub struct EvmChain {
    ctx: Arc<EvmContext>,
    session: Session,
    factory: Address,
}

impl EvmChain {
    /// Connect to the configured endpoint.
    ///
    /// Verifies the node reports the expected chain id; talking to the
    /// wrong network would resolve the factory address against foreign
    /// contracts. Without `WALLET_PRIVATE_KEY` the session is read-only.
    pub async fn connect(config: &Config) -> Result<Self> {
        let rpc_url: url::Url = config.network.rpc_url.parse()?;

        let signer = match config.wallet.private_key.as_deref() {
            Some(key) => {
                Some(
                    PrivateKeySigner::from_str(key).map_err(|e| ConfigError::InvalidValue {
                        field: "WALLET_PRIVATE_KEY",
                        reason: e.to_string(),
                    })?,
                )
            }
            None => None,
        };
        let account = signer.as_ref().map_or(Address::ZERO, |s| s.address());

        let ctx = Arc::new(EvmContext { rpc_url, signer });

        let network_id = ctx
            .read_provider()
            .get_chain_id()
            .await
            .map_err(|e| ChainError::ConnectionRejected(e.to_string()))?;

        if network_id != config.network.chain_id {
            return Err(ChainError::ConnectionRejected(format!(
                "node reports chain id {network_id}, expected {}",
                config.network.chain_id
            ))
            .into());
        }

        info!(
            account = %account,
            network_id,
            read_only = ctx.signer.is_none(),
            "Chain client connected"
        );

        Ok(Self {
            ctx,
            session: Session {
                account,
                network_id,
            },
            factory: config.factory.parsed_address(),
        })
    }

    /// A session watcher polling the node at `interval`.
    #[must_use]
    pub fn session_watch(&self, interval: Duration) -> PollingSessionWatch {
        PollingSessionWatch::new(self.ctx.clone(), self.session, interval)
    }
}

impl ChainClient for EvmChain {
    fn session(&self) -> Session {
        self.session
    }

    fn registry(&self) -> Arc<dyn PoolRegistry> {
        Arc::new(FactoryAdapter::new(self.ctx.clone(), self.factory))
    }

    fn pool_at(&self, address: Address) -> Arc<dyn PoolContract> {
        Arc::new(PoolAdapter::new(self.ctx.clone(), address))
    }

    fn token_at(&self, address: Address) -> Arc<dyn TokenContract> {
        Arc::new(Erc20Adapter::new(self.ctx.clone(), address))
    }
}
