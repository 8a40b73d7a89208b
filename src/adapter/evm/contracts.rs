//! Typed contract schemas and their port implementations.
//!
//! Each remote call has an explicit `sol!` schema; results are decoded
//! here at the adapter boundary so the orchestrators never see raw call
//! data.

use std::sync::Arc;

use alloy_primitives::{Address, U256};
use alloy_sol_types::sol;
use async_trait::async_trait;

use crate::error::{ChainError, Error, Result};
use crate::port::{PoolContract, PoolRegistry, TokenContract, TxReceipt};

use super::provider::EvmContext;

sol! {
    #[sol(rpc)]
    contract IERC20 {
        function decimals() external view returns (uint8);
        function balanceOf(address account) external view returns (uint256);
        function allowance(address owner, address spender) external view returns (uint256);
        function approve(address spender, uint256 amount) external returns (bool);
    }

    #[sol(rpc)]
    contract IPool {
        function name() external view returns (string);
        function totalSupply() external view returns (uint256);
        function balanceOf(address account) external view returns (uint256);
        function deposit(uint256 amount) external;
        function redeem(uint256 amount) external;
    }

    #[sol(rpc)]
    contract IPoolFactory {
        function tokenCount() external view returns (uint256);
        function tokenAddresses(uint256 index) external view returns (address);
        function poolAddresses(address token) external view returns (address);
    }
}

fn call_failed(
    contract: &'static str,
    method: &'static str,
    err: impl std::fmt::Display,
) -> Error {
    ChainError::CallFailed {
        contract,
        method,
        reason: err.to_string(),
    }
    .into()
}

/// [`PoolRegistry`] over the factory contract.
pub struct FactoryAdapter {
    ctx: Arc<EvmContext>,
    address: Address,
}

impl FactoryAdapter {
    pub(crate) fn new(ctx: Arc<EvmContext>, address: Address) -> Self {
        Self { ctx, address }
    }
}

#[async_trait]
impl PoolRegistry for FactoryAdapter {
    async fn token_count(&self) -> Result<u64> {
        let provider = self.ctx.read_provider();
        let factory = IPoolFactory::new(self.address, &provider);
        let count: U256 = factory
            .tokenCount()
            .call()
            .await
            .map_err(|e| call_failed("IPoolFactory", "tokenCount", e))?;
        u64::try_from(count)
            .map_err(|_| call_failed("IPoolFactory", "tokenCount", "count exceeds u64"))
    }

    async fn token_at(&self, index: u64) -> Result<Address> {
        let provider = self.ctx.read_provider();
        let factory = IPoolFactory::new(self.address, &provider);
        factory
            .tokenAddresses(U256::from(index))
            .call()
            .await
            .map_err(|e| call_failed("IPoolFactory", "tokenAddresses", e))
    }

    async fn pool_for(&self, token: Address) -> Result<Address> {
        let provider = self.ctx.read_provider();
        let factory = IPoolFactory::new(self.address, &provider);
        factory
            .poolAddresses(token)
            .call()
            .await
            .map_err(|e| call_failed("IPoolFactory", "poolAddresses", e))
    }
}

/// [`PoolContract`] over a pool instance.
pub struct PoolAdapter {
    ctx: Arc<EvmContext>,
    address: Address,
}

impl PoolAdapter {
    pub(crate) fn new(ctx: Arc<EvmContext>, address: Address) -> Self {
        Self { ctx, address }
    }
}

#[async_trait]
impl PoolContract for PoolAdapter {
    fn address(&self) -> Address {
        self.address
    }

    async fn name(&self) -> Result<String> {
        let provider = self.ctx.read_provider();
        let pool = IPool::new(self.address, &provider);
        pool.name()
            .call()
            .await
            .map_err(|e| call_failed("IPool", "name", e))
    }

    async fn total_supply(&self) -> Result<U256> {
        let provider = self.ctx.read_provider();
        let pool = IPool::new(self.address, &provider);
        pool.totalSupply()
            .call()
            .await
            .map_err(|e| call_failed("IPool", "totalSupply", e))
    }

    async fn balance_of(&self, owner: Address) -> Result<U256> {
        let provider = self.ctx.read_provider();
        let pool = IPool::new(self.address, &provider);
        pool.balanceOf(owner)
            .call()
            .await
            .map_err(|e| call_failed("IPool", "balanceOf", e))
    }

    async fn deposit(&self, units: U256) -> Result<TxReceipt> {
        let provider = self.ctx.write_provider()?;
        let pool = IPool::new(self.address, &provider);
        let pending = pool
            .deposit(units)
            .send()
            .await
            .map_err(|e| call_failed("IPool", "deposit", e))?;
        let receipt = pending
            .get_receipt()
            .await
            .map_err(|e| call_failed("IPool", "deposit", e))?;
        Ok(TxReceipt {
            tx_hash: format!("{:?}", receipt.transaction_hash),
        })
    }

    async fn redeem(&self, units: U256) -> Result<TxReceipt> {
        let provider = self.ctx.write_provider()?;
        let pool = IPool::new(self.address, &provider);
        let pending = pool
            .redeem(units)
            .send()
            .await
            .map_err(|e| call_failed("IPool", "redeem", e))?;
        let receipt = pending
            .get_receipt()
            .await
            .map_err(|e| call_failed("IPool", "redeem", e))?;
        Ok(TxReceipt {
            tx_hash: format!("{:?}", receipt.transaction_hash),
        })
    }
}

/// [`TokenContract`] over any ERC-20 surface, pool-share tokens
/// included.
pub struct Erc20Adapter {
    ctx: Arc<EvmContext>,
    address: Address,
}

impl Erc20Adapter {
    pub(crate) fn new(ctx: Arc<EvmContext>, address: Address) -> Self {
        Self { ctx, address }
    }
}

#[async_trait]
impl TokenContract for Erc20Adapter {
    fn address(&self) -> Address {
        self.address
    }

    async fn decimals(&self) -> Result<u8> {
        let provider = self.ctx.read_provider();
        let token = IERC20::new(self.address, &provider);
        token
            .decimals()
            .call()
            .await
            .map_err(|e| call_failed("IERC20", "decimals", e))
    }

    async fn balance_of(&self, owner: Address) -> Result<U256> {
        let provider = self.ctx.read_provider();
        let token = IERC20::new(self.address, &provider);
        token
            .balanceOf(owner)
            .call()
            .await
            .map_err(|e| call_failed("IERC20", "balanceOf", e))
    }

    async fn allowance(&self, owner: Address, spender: Address) -> Result<U256> {
        let provider = self.ctx.read_provider();
        let token = IERC20::new(self.address, &provider);
        token
            .allowance(owner, spender)
            .call()
            .await
            .map_err(|e| call_failed("IERC20", "allowance", e))
    }

    async fn approve(&self, spender: Address, amount: U256) -> Result<TxReceipt> {
        let provider = self.ctx.write_provider()?;
        let token = IERC20::new(self.address, &provider);
        let pending = token
            .approve(spender, amount)
            .send()
            .await
            .map_err(|e| call_failed("IERC20", "approve", e))?;
        let receipt = pending
            .get_receipt()
            .await
            .map_err(|e| call_failed("IERC20", "approve", e))?;
        Ok(TxReceipt {
            tx_hash: format!("{:?}", receipt.transaction_hash),
        })
    }
}
