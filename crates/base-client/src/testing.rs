//! Scripted in-memory chain for tests
//!
//! [`FakeChain`] answers [`ChainReader`] calls from tables filled in by the
//! test and records every call it receives. [`FakeSender`] shares the same
//! state so a mined `approve` updates the allowance the next read sees.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use alloy::primitives::{Address, B256, U256};
use async_trait::async_trait;
use toby_core::ChainError;

use crate::{abi, ChainReader, ContractCall, Result, TxSender};

/// Scripted response for one router path
#[derive(Debug, Clone)]
pub enum QuoteScript {
    /// Router returns this final amount
    Out(U256),
    /// Router call fails with this revert reason
    Revert(String),
}

#[derive(Debug, Default)]
struct FakeState {
    chain_id: u64,
    offline: bool,
    native: HashMap<Address, U256>,
    balances: HashMap<(Address, Address), U256>,
    allowances: HashMap<(Address, Address, Address), U256>,
    decimals: HashMap<Address, u8>,
    quotes: HashMap<Vec<Address>, QuoteScript>,
    fee_bps: Option<U256>,
    total_burned: U256,
    gas: u64,
    simulation_revert: Option<String>,
    gas_price: u128,
    quote_calls: Vec<(U256, Vec<Address>)>,
    estimate_calls: Vec<ContractCall>,
}

/// Scripted [`ChainReader`]
#[derive(Debug, Clone)]
pub struct FakeChain {
    state: Arc<Mutex<FakeState>>,
}

impl FakeChain {
    pub fn new(chain_id: u64) -> Self {
        let state = FakeState {
            chain_id,
            gas: 150_000,
            gas_price: 1_000_000,
            ..FakeState::default()
        };
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    fn with(self, f: impl FnOnce(&mut FakeState)) -> Self {
        f(&mut self.state.lock().unwrap());
        self
    }

    /// Every call fails as if the endpoint were down
    pub fn offline(self) -> Self {
        self.with(|s| s.offline = true)
    }

    pub fn with_native(self, owner: Address, amount: U256) -> Self {
        self.with(|s| {
            s.native.insert(owner, amount);
        })
    }

    pub fn with_token_balance(self, token: Address, owner: Address, amount: U256) -> Self {
        self.with(|s| {
            s.balances.insert((token, owner), amount);
        })
    }

    pub fn with_allowance(self, token: Address, owner: Address, spender: Address, amount: U256) -> Self {
        self.with(|s| {
            s.allowances.insert((token, owner, spender), amount);
        })
    }

    pub fn with_decimals(self, token: Address, decimals: u8) -> Self {
        self.with(|s| {
            s.decimals.insert(token, decimals);
        })
    }

    pub fn with_quote(self, path: &[Address], out: U256) -> Self {
        self.with(|s| {
            s.quotes.insert(path.to_vec(), QuoteScript::Out(out));
        })
    }

    pub fn with_failing_quote(self, path: &[Address], reason: &str) -> Self {
        self.with(|s| {
            s.quotes
                .insert(path.to_vec(), QuoteScript::Revert(reason.to_string()));
        })
    }

    pub fn with_fee_bps(self, bps: u64) -> Self {
        self.with(|s| s.fee_bps = Some(U256::from(bps)))
    }

    pub fn with_total_burned(self, amount: U256) -> Self {
        self.with(|s| s.total_burned = amount)
    }

    pub fn with_gas(self, gas: u64) -> Self {
        self.with(|s| {
            s.gas = gas;
            s.simulation_revert = None;
        })
    }

    /// Gas estimation reverts with `reason`
    pub fn with_simulation_revert(self, reason: &str) -> Self {
        self.with(|s| s.simulation_revert = Some(reason.to_string()))
    }

    pub fn with_gas_price(self, wei: u128) -> Self {
        self.with(|s| s.gas_price = wei)
    }

    pub fn set_native(&self, owner: Address, amount: U256) {
        self.state.lock().unwrap().native.insert(owner, amount);
    }

    pub fn set_allowance(&self, token: Address, owner: Address, spender: Address, amount: U256) {
        self.state
            .lock()
            .unwrap()
            .allowances
            .insert((token, owner, spender), amount);
    }

    /// Paths passed to `getAmountsOut`, in call order
    pub fn quote_calls(&self) -> Vec<Vec<Address>> {
        self.state
            .lock()
            .unwrap()
            .quote_calls
            .iter()
            .map(|(_, path)| path.clone())
            .collect()
    }

    /// Amounts passed to `getAmountsOut`, in call order
    pub fn quote_amounts(&self) -> Vec<U256> {
        self.state
            .lock()
            .unwrap()
            .quote_calls
            .iter()
            .map(|(amount, _)| *amount)
            .collect()
    }

    pub fn estimate_calls(&self) -> Vec<ContractCall> {
        self.state.lock().unwrap().estimate_calls.clone()
    }

    fn check_online(&self) -> Result<()> {
        if self.state.lock().unwrap().offline {
            return Err(ChainError::Unreachable {
                url: "fake://offline".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ChainReader for FakeChain {
    async fn chain_id(&self) -> Result<u64> {
        self.check_online()?;
        Ok(self.state.lock().unwrap().chain_id)
    }

    async fn native_balance(&self, owner: Address) -> Result<U256> {
        self.check_online()?;
        Ok(self
            .state
            .lock()
            .unwrap()
            .native
            .get(&owner)
            .copied()
            .unwrap_or_default())
    }

    async fn gas_price(&self) -> Result<u128> {
        self.check_online()?;
        Ok(self.state.lock().unwrap().gas_price)
    }

    async fn erc20_decimals(&self, token: Address) -> Result<u8> {
        self.check_online()?;
        Ok(self
            .state
            .lock()
            .unwrap()
            .decimals
            .get(&token)
            .copied()
            .unwrap_or(18))
    }

    async fn erc20_balance(&self, token: Address, owner: Address) -> Result<U256> {
        self.check_online()?;
        Ok(self
            .state
            .lock()
            .unwrap()
            .balances
            .get(&(token, owner))
            .copied()
            .unwrap_or_default())
    }

    async fn erc20_allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> Result<U256> {
        self.check_online()?;
        Ok(self
            .state
            .lock()
            .unwrap()
            .allowances
            .get(&(token, owner, spender))
            .copied()
            .unwrap_or_default())
    }

    async fn amounts_out(
        &self,
        _router: Address,
        amount_in: U256,
        path: &[Address],
    ) -> Result<Vec<U256>> {
        self.check_online()?;
        let mut state = self.state.lock().unwrap();
        state.quote_calls.push((amount_in, path.to_vec()));
        match state.quotes.get(path) {
            Some(QuoteScript::Out(out)) => {
                let mut amounts = vec![amount_in; path.len() - 1];
                amounts.push(*out);
                Ok(amounts)
            }
            Some(QuoteScript::Revert(reason)) => Err(ChainError::Reverted {
                reason: reason.clone(),
            }),
            None => Err(ChainError::Reverted {
                reason: "UniswapV2Library: INSUFFICIENT_LIQUIDITY".to_string(),
            }),
        }
    }

    async fn swap_fee_bps(&self, _swapper: Address) -> Result<U256> {
        self.check_online()?;
        self.state
            .lock()
            .unwrap()
            .fee_bps
            .ok_or_else(|| ChainError::Reverted {
                reason: "execution reverted".to_string(),
            })
    }

    async fn total_burned(&self, _swapper: Address) -> Result<U256> {
        self.check_online()?;
        Ok(self.state.lock().unwrap().total_burned)
    }

    async fn estimate_gas(&self, call: &ContractCall) -> Result<u64> {
        self.check_online()?;
        let mut state = self.state.lock().unwrap();
        state.estimate_calls.push(call.clone());
        match &state.simulation_revert {
            Some(reason) => Err(ChainError::Reverted {
                reason: reason.clone(),
            }),
            None => Ok(state.gas),
        }
    }
}

/// Scripted [`TxSender`] sharing state with a [`FakeChain`]
#[derive(Debug, Clone)]
pub struct FakeSender {
    chain: FakeChain,
    address: Address,
    sent: Arc<Mutex<Vec<ContractCall>>>,
    revert_all: bool,
    reject_send: Option<String>,
}

impl FakeSender {
    pub fn new(chain: FakeChain, address: Address) -> Self {
        Self {
            chain,
            address,
            sent: Arc::new(Mutex::new(Vec::new())),
            revert_all: false,
            reject_send: None,
        }
    }

    /// Every mined transaction reports a reverted receipt
    pub fn reverting(mut self) -> Self {
        self.revert_all = true;
        self
    }

    /// `send` fails, e.g. the user rejected the signature request
    pub fn rejecting(mut self, message: &str) -> Self {
        self.reject_send = Some(message.to_string());
        self
    }

    pub fn sent(&self) -> Vec<ContractCall> {
        self.sent.lock().unwrap().clone()
    }

    /// Amounts passed to `approve`, in send order
    pub fn approvals(&self) -> Vec<U256> {
        self.sent()
            .iter()
            .filter_map(|call| abi::decode_approve(&call.data).map(|(_, amount)| amount))
            .collect()
    }
}

#[async_trait]
impl TxSender for FakeSender {
    fn address(&self) -> Address {
        self.address
    }

    async fn send(&self, call: &ContractCall) -> Result<B256> {
        if let Some(message) = &self.reject_send {
            return Err(ChainError::Rpc {
                method: "eth_sendTransaction".to_string(),
                message: message.clone(),
            });
        }
        let mut sent = self.sent.lock().unwrap();
        sent.push(call.clone());
        Ok(B256::with_last_byte(sent.len() as u8))
    }

    async fn wait_mined(&self, tx_hash: B256) -> Result<bool> {
        if self.revert_all {
            return Ok(false);
        }
        let index = tx_hash.0[31] as usize;
        let call = self.sent.lock().unwrap().get(index.wrapping_sub(1)).cloned();
        if let Some(call) = call {
            if let Some((spender, amount)) = abi::decode_approve(&call.data) {
                self.chain
                    .set_allowance(call.to, self.address, spender, amount);
            }
        }
        Ok(true)
    }
}
