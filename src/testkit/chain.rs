//! Scripted chain client for orchestrator tests.
//!
//! Implements the chain ports over in-memory maps with failure
//! injection and a chronological call log, so tests can assert both the
//! exact call sequence and the resulting read-model.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use alloy_primitives::{Address, U256};
use async_trait::async_trait;
use parking_lot::Mutex;
use rust_decimal::Decimal;

use crate::domain::units::to_chain_units;
use crate::domain::{Session, SessionEvent};
use crate::error::{ChainError, Result};
use crate::port::{
    ChainClient, PoolContract, PoolRegistry, SessionWatch, TokenContract, TxReceipt,
};

/// One registered token/pool pair.
struct TokenFixture {
    token: Address,
    pool: Address,
    name: String,
    decimals: u8,
}

/// Shared scripted chain state.
pub struct ChainFixture {
    session: Session,
    tokens: Mutex<Vec<TokenFixture>>,
    /// (contract, owner) -> balance
    balances: Mutex<HashMap<(Address, Address), U256>>,
    /// pool -> total supply
    supplies: Mutex<HashMap<Address, U256>>,
    /// (contract, owner, spender) -> allowance
    allowances: Mutex<HashMap<(Address, Address, Address), U256>>,
    /// (contract-or-token, method) pairs that fail
    failing: Mutex<HashSet<(Address, &'static str)>>,
    calls: Mutex<Vec<String>>,
}

/// Scripted [`ChainClient`].
#[derive(Clone)]
pub struct ScriptedChain {
    fixture: Arc<ChainFixture>,
}

impl ScriptedChain {
    #[must_use]
    pub fn new(account: Address) -> Self {
        Self {
            fixture: Arc::new(ChainFixture {
                session: Session {
                    account,
                    network_id: 1337,
                },
                tokens: Mutex::new(Vec::new()),
                balances: Mutex::new(HashMap::new()),
                supplies: Mutex::new(HashMap::new()),
                allowances: Mutex::new(HashMap::new()),
                failing: Mutex::new(HashSet::new()),
                calls: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Register a pool; balances are given in display units and scaled
    /// by `decimals`. Returns `(token_address, pool_address)`.
    pub fn with_pool(
        &self,
        name: &str,
        decimals: u8,
        user_token_balance: Decimal,
        user_pool_balance: Decimal,
        total_supply: Decimal,
    ) -> (Address, Address) {
        let mut tokens = self.fixture.tokens.lock();
        let n = tokens.len() as u8;
        let token = Address::with_last_byte(n + 1);
        let pool = Address::with_last_byte(n + 0xA1);
        tokens.push(TokenFixture {
            token,
            pool,
            name: name.into(),
            decimals,
        });

        let account = self.fixture.session.account;
        let mut balances = self.fixture.balances.lock();
        balances.insert((token, account), to_chain_units(user_token_balance, decimals));
        balances.insert((pool, account), to_chain_units(user_pool_balance, decimals));
        self.fixture
            .supplies
            .lock()
            .insert(pool, to_chain_units(total_supply, decimals));

        (token, pool)
    }

    /// Make `method` fail when called against `address` (a contract
    /// address, or the token address for `poolAddresses`).
    pub fn fail(&self, address: Address, method: &'static str) {
        self.fixture.failing.lock().insert((address, method));
    }

    /// Pre-set an allowance, bypassing `approve`.
    pub fn set_allowance(&self, contract: Address, owner: Address, spender: Address, value: U256) {
        self.fixture
            .allowances
            .lock()
            .insert((contract, owner, spender), value);
    }

    /// The chronological call log.
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.fixture.calls.lock().clone()
    }

    /// Calls made against contracts, excluding pure registry reads.
    #[must_use]
    pub fn contract_calls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| !c.starts_with("factory."))
            .collect()
    }
}

impl ChainFixture {
    fn role(&self, address: Address) -> String {
        let tokens = self.tokens.lock();
        for (i, t) in tokens.iter().enumerate() {
            if t.token == address {
                return format!("token{i}");
            }
            if t.pool == address {
                return format!("pool{i}");
            }
        }
        format!("{address}")
    }

    fn record(&self, address: Address, call: &str) {
        let role = self.role(address);
        self.calls.lock().push(format!("{role}.{call}"));
    }

    fn check(&self, address: Address, method: &'static str) -> Result<()> {
        if self.failing.lock().contains(&(address, method)) {
            return Err(ChainError::CallFailed {
                contract: "scripted",
                method,
                reason: "injected failure".into(),
            }
            .into());
        }
        Ok(())
    }

    fn balance(&self, contract: Address, owner: Address) -> U256 {
        self.balances
            .lock()
            .get(&(contract, owner))
            .copied()
            .unwrap_or(U256::ZERO)
    }

    fn token_for_pool(&self, pool: Address) -> Option<Address> {
        self.tokens
            .lock()
            .iter()
            .find(|t| t.pool == pool)
            .map(|t| t.token)
    }
}

struct ScriptedRegistry {
    fixture: Arc<ChainFixture>,
}

#[async_trait]
impl PoolRegistry for ScriptedRegistry {
    async fn token_count(&self) -> Result<u64> {
        self.fixture.calls.lock().push("factory.tokenCount".into());
        self.fixture.check(Address::ZERO, "tokenCount")?;
        Ok(self.fixture.tokens.lock().len() as u64)
    }

    async fn token_at(&self, index: u64) -> Result<Address> {
        self.fixture
            .calls
            .lock()
            .push(format!("factory.tokenAddresses({index})"));
        let tokens = self.fixture.tokens.lock();
        tokens
            .get(index as usize)
            .map(|t| t.token)
            .ok_or_else(|| {
                ChainError::CallFailed {
                    contract: "scripted",
                    method: "tokenAddresses",
                    reason: "index out of range".into(),
                }
                .into()
            })
    }

    async fn pool_for(&self, token: Address) -> Result<Address> {
        let role = self.fixture.role(token);
        self.fixture
            .calls
            .lock()
            .push(format!("factory.poolAddresses({role})"));
        self.fixture.check(token, "poolAddresses")?;
        let tokens = self.fixture.tokens.lock();
        tokens
            .iter()
            .find(|t| t.token == token)
            .map(|t| t.pool)
            .ok_or_else(|| {
                ChainError::CallFailed {
                    contract: "scripted",
                    method: "poolAddresses",
                    reason: "unknown token".into(),
                }
                .into()
            })
    }
}

struct ScriptedPool {
    fixture: Arc<ChainFixture>,
    address: Address,
}

#[async_trait]
impl PoolContract for ScriptedPool {
    fn address(&self) -> Address {
        self.address
    }

    async fn name(&self) -> Result<String> {
        self.fixture.record(self.address, "name");
        self.fixture.check(self.address, "name")?;
        let tokens = self.fixture.tokens.lock();
        tokens
            .iter()
            .find(|t| t.pool == self.address)
            .map(|t| t.name.clone())
            .ok_or_else(|| {
                ChainError::CallFailed {
                    contract: "scripted",
                    method: "name",
                    reason: "unknown pool".into(),
                }
                .into()
            })
    }

    async fn total_supply(&self) -> Result<U256> {
        self.fixture.record(self.address, "totalSupply");
        self.fixture.check(self.address, "totalSupply")?;
        Ok(self
            .fixture
            .supplies
            .lock()
            .get(&self.address)
            .copied()
            .unwrap_or(U256::ZERO))
    }

    async fn balance_of(&self, owner: Address) -> Result<U256> {
        self.fixture.record(self.address, "balanceOf");
        self.fixture.check(self.address, "balanceOf")?;
        Ok(self.fixture.balance(self.address, owner))
    }

    async fn deposit(&self, units: U256) -> Result<TxReceipt> {
        self.fixture.record(self.address, &format!("deposit({units})"));
        self.fixture.check(self.address, "deposit")?;

        let account = self.fixture.session.account;
        let token = self.fixture.token_for_pool(self.address).unwrap_or_default();
        {
            let mut balances = self.fixture.balances.lock();
            let spendable = balances.entry((token, account)).or_insert(U256::ZERO);
            *spendable = spendable.saturating_sub(units);
            let shares = balances.entry((self.address, account)).or_insert(U256::ZERO);
            *shares = shares.saturating_add(units);
        }
        let mut supplies = self.fixture.supplies.lock();
        let supply = supplies.entry(self.address).or_insert(U256::ZERO);
        *supply = supply.saturating_add(units);

        Ok(TxReceipt {
            tx_hash: format!("0xdeposit{units}"),
        })
    }

    async fn redeem(&self, units: U256) -> Result<TxReceipt> {
        self.fixture.record(self.address, &format!("redeem({units})"));
        self.fixture.check(self.address, "redeem")?;

        let account = self.fixture.session.account;
        let token = self.fixture.token_for_pool(self.address).unwrap_or_default();
        {
            let mut balances = self.fixture.balances.lock();
            let shares = balances.entry((self.address, account)).or_insert(U256::ZERO);
            *shares = shares.saturating_sub(units);
            let spendable = balances.entry((token, account)).or_insert(U256::ZERO);
            *spendable = spendable.saturating_add(units);
        }
        let mut supplies = self.fixture.supplies.lock();
        let supply = supplies.entry(self.address).or_insert(U256::ZERO);
        *supply = supply.saturating_sub(units);

        Ok(TxReceipt {
            tx_hash: format!("0xredeem{units}"),
        })
    }
}

struct ScriptedToken {
    fixture: Arc<ChainFixture>,
    address: Address,
}

#[async_trait]
impl TokenContract for ScriptedToken {
    fn address(&self) -> Address {
        self.address
    }

    async fn decimals(&self) -> Result<u8> {
        self.fixture.record(self.address, "decimals");
        self.fixture.check(self.address, "decimals")?;
        let tokens = self.fixture.tokens.lock();
        tokens
            .iter()
            .find(|t| t.token == self.address || t.pool == self.address)
            .map(|t| t.decimals)
            .ok_or_else(|| {
                ChainError::CallFailed {
                    contract: "scripted",
                    method: "decimals",
                    reason: "unknown token".into(),
                }
                .into()
            })
    }

    async fn balance_of(&self, owner: Address) -> Result<U256> {
        self.fixture.record(self.address, "balanceOf");
        self.fixture.check(self.address, "balanceOf")?;
        Ok(self.fixture.balance(self.address, owner))
    }

    async fn allowance(&self, owner: Address, spender: Address) -> Result<U256> {
        self.fixture.record(self.address, "allowance");
        self.fixture.check(self.address, "allowance")?;
        Ok(self
            .fixture
            .allowances
            .lock()
            .get(&(self.address, owner, spender))
            .copied()
            .unwrap_or(U256::ZERO))
    }

    async fn approve(&self, spender: Address, amount: U256) -> Result<TxReceipt> {
        let label = if amount == U256::MAX {
            "approve(max)".to_string()
        } else {
            format!("approve({amount})")
        };
        self.fixture.record(self.address, &label);
        self.fixture.check(self.address, "approve")?;

        let owner = self.fixture.session.account;
        self.fixture
            .allowances
            .lock()
            .insert((self.address, owner, spender), amount);

        Ok(TxReceipt {
            tx_hash: "0xapprove".into(),
        })
    }
}

impl ChainClient for ScriptedChain {
    fn session(&self) -> Session {
        self.fixture.session
    }

    fn registry(&self) -> Arc<dyn PoolRegistry> {
        Arc::new(ScriptedRegistry {
            fixture: self.fixture.clone(),
        })
    }

    fn pool_at(&self, address: Address) -> Arc<dyn PoolContract> {
        Arc::new(ScriptedPool {
            fixture: self.fixture.clone(),
            address,
        })
    }

    fn token_at(&self, address: Address) -> Arc<dyn TokenContract> {
        Arc::new(ScriptedToken {
            fixture: self.fixture.clone(),
            address,
        })
    }
}

/// Session watch that replays a fixed list of events, then ends.
pub struct ScriptedSessionWatch {
    events: Vec<SessionEvent>,
}

impl ScriptedSessionWatch {
    #[must_use]
    pub fn new(mut events: Vec<SessionEvent>) -> Self {
        events.reverse();
        Self { events }
    }
}

#[async_trait]
impl SessionWatch for ScriptedSessionWatch {
    async fn next_change(&mut self) -> Option<SessionEvent> {
        self.events.pop()
    }
}
