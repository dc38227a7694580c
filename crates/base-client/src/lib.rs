//! base-client: JSON-RPC access to Base for the swap flow
//!
//! This crate wraps an alloy HTTP provider behind two small traits:
//! [`ChainReader`] for view calls and gas estimation, and [`TxSender`] for
//! signing and broadcasting. Everything above this crate talks to the chain
//! through those traits so it can be driven by scripted fakes in tests.

pub mod abi;
pub mod network;
pub mod wallet;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

use std::future::IntoFuture;
use std::time::Duration;

use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, Bytes, B256, U256};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use alloy::sol_types::SolCall;
use alloy::transports::TransportError;
use async_trait::async_trait;
use toby_core::{ChainConfig, ChainError};

pub use network::{detect_network, ensure_network, NetworkStatus};
pub use wallet::WalletSender;

/// Budget for auxiliary reads that must never block the main flow
pub const SOFT_TIMEOUT: Duration = Duration::from_millis(1200);

/// Result type for chain client operations
pub type Result<T> = std::result::Result<T, ChainError>;

/// A contract interaction: target, calldata and attached value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractCall {
    pub from: Address,
    pub to: Address,
    pub data: Bytes,
    pub value: U256,
}

impl ContractCall {
    pub fn new(from: Address, to: Address, data: Bytes, value: U256) -> Self {
        Self {
            from,
            to,
            data,
            value,
        }
    }

    pub fn to_request(&self) -> TransactionRequest {
        TransactionRequest::default()
            .with_from(self.from)
            .with_to(self.to)
            .with_input(self.data.clone())
            .with_value(self.value)
    }
}

/// Read-only chain access used by quoting and preflight
#[async_trait]
pub trait ChainReader: Send + Sync {
    async fn chain_id(&self) -> Result<u64>;

    async fn native_balance(&self, owner: Address) -> Result<U256>;

    /// Current fee per gas in wei
    async fn gas_price(&self) -> Result<u128>;

    async fn erc20_decimals(&self, token: Address) -> Result<u8>;

    async fn erc20_balance(&self, token: Address, owner: Address) -> Result<U256>;

    async fn erc20_allowance(&self, token: Address, owner: Address, spender: Address)
        -> Result<U256>;

    /// Router `getAmountsOut`; the last element is the output amount
    async fn amounts_out(
        &self,
        router: Address,
        amount_in: U256,
        path: &[Address],
    ) -> Result<Vec<U256>>;

    /// Swap contract `feeBps()`
    async fn swap_fee_bps(&self, swapper: Address) -> Result<U256>;

    /// Swap contract `totalBurned()`
    async fn total_burned(&self, swapper: Address) -> Result<U256>;

    /// Simulate the exact call; a revert surfaces as [`ChainError::Reverted`]
    async fn estimate_gas(&self, call: &ContractCall) -> Result<u64>;
}

/// Signs and broadcasts transactions for a single account
#[async_trait]
pub trait TxSender: Send + Sync {
    fn address(&self) -> Address;

    async fn send(&self, call: &ContractCall) -> Result<B256>;

    /// Wait until the transaction is mined. `Ok(false)` means it reverted.
    async fn wait_mined(&self, tx_hash: B256) -> Result<bool>;
}

/// Read client over an alloy HTTP provider
#[derive(Clone)]
pub struct RpcClient {
    provider: DynProvider,
    config: ChainConfig,
}

impl RpcClient {
    /// Create a client. No request is made until the first call.
    pub fn new(config: ChainConfig) -> Result<Self> {
        let url = config.rpc_url.parse().map_err(|e| ChainError::Unreachable {
            url: format!("{}: {}", config.rpc_url, e),
        })?;
        let provider = ProviderBuilder::new().connect_http(url).erased();
        Ok(Self { provider, config })
    }

    pub fn provider(&self) -> &DynProvider {
        &self.provider
    }

    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(self.config.request_timeout_secs)
    }

    async fn call_contract<C: SolCall + Send>(
        &self,
        method: &str,
        to: Address,
        call: C,
    ) -> Result<C::Return> {
        let tx = TransactionRequest::default()
            .with_to(to)
            .with_input(call.abi_encode());
        let data = timed_request(
            &self.config.rpc_url,
            method,
            self.timeout(),
            self.provider.call(tx),
        )
        .await?;
        abi::decode_returns::<C>(method, &data)
    }
}

#[async_trait]
impl ChainReader for RpcClient {
    async fn chain_id(&self) -> Result<u64> {
        timed_request(
            &self.config.rpc_url,
            "eth_chainId",
            self.timeout(),
            self.provider.get_chain_id(),
        )
        .await
    }

    async fn native_balance(&self, owner: Address) -> Result<U256> {
        timed_request(
            &self.config.rpc_url,
            "eth_getBalance",
            self.timeout(),
            self.provider.get_balance(owner),
        )
        .await
    }

    async fn gas_price(&self) -> Result<u128> {
        timed_request(
            &self.config.rpc_url,
            "eth_gasPrice",
            self.timeout(),
            self.provider.get_gas_price(),
        )
        .await
    }

    async fn erc20_decimals(&self, token: Address) -> Result<u8> {
        self.call_contract("decimals", token, abi::IERC20::decimalsCall {})
            .await
    }

    async fn erc20_balance(&self, token: Address, owner: Address) -> Result<U256> {
        self.call_contract("balanceOf", token, abi::IERC20::balanceOfCall { owner })
            .await
    }

    async fn erc20_allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> Result<U256> {
        self.call_contract(
            "allowance",
            token,
            abi::IERC20::allowanceCall { owner, spender },
        )
        .await
    }

    async fn amounts_out(
        &self,
        router: Address,
        amount_in: U256,
        path: &[Address],
    ) -> Result<Vec<U256>> {
        self.call_contract(
            "getAmountsOut",
            router,
            abi::IUniswapV2Router::getAmountsOutCall {
                amountIn: amount_in,
                path: path.to_vec(),
            },
        )
        .await
    }

    async fn swap_fee_bps(&self, swapper: Address) -> Result<U256> {
        self.call_contract("feeBps", swapper, abi::ITobySwapper::feeBpsCall {})
            .await
    }

    async fn total_burned(&self, swapper: Address) -> Result<U256> {
        self.call_contract("totalBurned", swapper, abi::ITobySwapper::totalBurnedCall {})
            .await
    }

    async fn estimate_gas(&self, call: &ContractCall) -> Result<u64> {
        timed_request(
            &self.config.rpc_url,
            "eth_estimateGas",
            self.timeout(),
            self.provider.estimate_gas(call.to_request()),
        )
        .await
    }
}

/// Wrap an RPC call with a timeout. Converts both timeout and transport errors to ChainError.
pub(crate) async fn timed_request<T>(
    url: &str,
    method: &str,
    limit: Duration,
    fut: impl IntoFuture<Output = std::result::Result<T, TransportError>>,
) -> Result<T> {
    tokio::time::timeout(limit, fut.into_future())
        .await
        .map_err(|_| ChainError::Timeout {
            method: method.to_string(),
            secs: limit.as_secs(),
        })?
        .map_err(|e| map_rpc_error(url, method, e))
}

/// Run `fut` but give up after `limit`, returning `None` instead of an error.
pub async fn with_soft_timeout<F: IntoFuture>(fut: F, limit: Duration) -> Option<F::Output> {
    match tokio::time::timeout(limit, fut.into_future()).await {
        Ok(out) => Some(out),
        Err(_) => {
            tracing::debug!(limit_ms = limit.as_millis() as u64, "soft timeout elapsed");
            None
        }
    }
}

fn map_rpc_error(url: &str, method: &str, err: TransportError) -> ChainError {
    if let Some(payload) = err.as_error_resp() {
        if let Some(data) = payload.as_revert_data() {
            let reason = alloy::sol_types::decode_revert_reason(&data)
                .unwrap_or_else(|| payload.message.to_string());
            return ChainError::Reverted { reason };
        }
        if let Some(reason) = revert_reason_from_message(&payload.message) {
            return ChainError::Reverted { reason };
        }
        return ChainError::Rpc {
            method: method.to_string(),
            message: payload.message.to_string(),
        };
    }
    if err.is_transport_error() {
        tracing::warn!(url, method, error = %err, "RPC transport failure");
        return ChainError::Unreachable {
            url: url.to_string(),
        };
    }
    ChainError::Rpc {
        method: method.to_string(),
        message: err.to_string(),
    }
}

/// Pull the revert reason out of a node error message.
///
/// Nodes phrase it as `execution reverted: <reason>` or a bare
/// `execution reverted` when the contract gave none.
pub fn revert_reason_from_message(message: &str) -> Option<String> {
    let lower = message.to_ascii_lowercase();
    let idx = lower.find("execution reverted")?;
    let rest = message[idx + "execution reverted".len()..]
        .trim_start_matches(':')
        .trim();
    if rest.is_empty() {
        Some("execution reverted".to_string())
    } else {
        Some(rest.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_revert_reason_from_message() {
        assert_eq!(
            revert_reason_from_message("execution reverted: UniswapV2Library: INSUFFICIENT_INPUT_AMOUNT"),
            Some("UniswapV2Library: INSUFFICIENT_INPUT_AMOUNT".to_string())
        );
        assert_eq!(
            revert_reason_from_message("Execution reverted"),
            Some("execution reverted".to_string())
        );
        assert_eq!(revert_reason_from_message("nonce too low"), None);
    }

    #[test]
    fn test_contract_call_request() {
        let call = ContractCall::new(
            Address::repeat_byte(1),
            Address::repeat_byte(2),
            Bytes::from(vec![0xde, 0xad]),
            U256::from(7u64),
        );
        let req = call.to_request();
        assert_eq!(req.from, Some(Address::repeat_byte(1)));
        assert_eq!(req.value, Some(U256::from(7u64)));
    }

    #[test]
    fn test_rpc_client_rejects_bad_url() {
        let config = ChainConfig {
            rpc_url: "not a url".to_string(),
            ..ChainConfig::default()
        };
        assert!(matches!(
            RpcClient::new(config),
            Err(ChainError::Unreachable { .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_soft_timeout() {
        let fast = with_soft_timeout(async { 5 }, SOFT_TIMEOUT).await;
        assert_eq!(fast, Some(5));

        let slow = with_soft_timeout(
            async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                5
            },
            SOFT_TIMEOUT,
        )
        .await;
        assert_eq!(slow, None);
    }
}
