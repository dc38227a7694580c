//! Preflight / Simulation Guard
//!
//! Runs before any state-changing call: network, token balance, allowance,
//! simulation, then native affordability. The first failing check blocks
//! the submission with a user-facing [`SwapError`].

use alloy_primitives::{Address, U256};
use base_client::{ensure_network, ChainReader, ContractCall};
use toby_core::{constants::NATIVE_DECIMALS, format_amount, Asset, ChainError, SwapError};

use crate::calculator::required_native;
use crate::constants::NATIVE_REPORT_PRECISION;
use crate::state::PreflightResult;

/// Inputs for one preflight run
#[derive(Debug, Clone)]
pub struct PreflightRequest {
    pub owner: Address,
    pub token_in: Asset,
    /// Input token symbol and decimals, for messages
    pub symbol: String,
    pub decimals: u8,
    pub amount_in: U256,
    /// Swap contract (allowance spender)
    pub spender: Address,
    /// Exact call that will be sent
    pub call: ContractCall,
    pub expected_chain_id: u64,
}

fn eth(amount: U256) -> String {
    format_amount(amount, NATIVE_DECIMALS, NATIVE_REPORT_PRECISION)
}

/// Compare `value + gas * gas_price` against the available native balance.
pub fn check_affordability(
    value: U256,
    gas_estimate: u64,
    gas_price: u128,
    available_native: U256,
) -> PreflightResult {
    let required_native = required_native(value, gas_estimate, gas_price);
    PreflightResult {
        required_native,
        available_native,
        sufficient: available_native >= required_native,
        gas_estimate,
        gas_price,
    }
}

/// Error for an unaffordable result, worded by whether the call carries value
pub fn shortfall_error(result: &PreflightResult, value: U256) -> SwapError {
    let required = eth(result.required_native);
    let available = eth(result.available_native);
    if value.is_zero() {
        SwapError::InsufficientGas {
            required,
            available,
        }
    } else {
        SwapError::InsufficientNative {
            required,
            available,
        }
    }
}

/// Dry-run the call. Reverts surface their reason verbatim.
pub async fn simulate(reader: &dyn ChainReader, call: &ContractCall) -> toby_core::Result<u64> {
    match reader.estimate_gas(call).await {
        Ok(gas) => Ok(gas),
        Err(ChainError::Reverted { reason }) => {
            tracing::info!(to = %call.to, %reason, "simulation reverted");
            Err(SwapError::SimulationReverted { reason }.into())
        }
        Err(ChainError::Rpc { message, .. }) => {
            Err(SwapError::SimulationReverted { reason: message }.into())
        }
        Err(e) => Err(e.into()),
    }
}

/// Run every check in order; `Ok` means the call may be sent.
pub async fn run_preflight(
    reader: &dyn ChainReader,
    request: &PreflightRequest,
) -> toby_core::Result<PreflightResult> {
    ensure_network(reader, request.expected_chain_id).await?;

    let owner = request.owner;
    if let Some(token) = request.token_in.token_address() {
        let balance = reader.erc20_balance(token, owner).await?;
        if balance < request.amount_in {
            return Err(SwapError::InsufficientTokens {
                symbol: request.symbol.clone(),
                required: format_amount(request.amount_in, request.decimals, NATIVE_REPORT_PRECISION),
                available: format_amount(balance, request.decimals, NATIVE_REPORT_PRECISION),
            }
            .into());
        }

        let allowance = reader
            .erc20_allowance(token, owner, request.spender)
            .await?;
        if allowance < request.amount_in {
            return Err(SwapError::ApprovalRequired {
                symbol: request.symbol.clone(),
                allowance: format_amount(allowance, request.decimals, NATIVE_REPORT_PRECISION),
                required: format_amount(request.amount_in, request.decimals, NATIVE_REPORT_PRECISION),
            }
            .into());
        }
    }

    let value = request.call.value;
    let available = reader.native_balance(owner).await?;
    // value alone is already short; skip simulation
    if available < value {
        return Err(SwapError::InsufficientTradeValue {
            required: eth(value),
            available: eth(available),
        }
        .into());
    }

    let gas = simulate(reader, &request.call).await?;
    let gas_price = reader.gas_price().await?;
    let result = check_affordability(value, gas, gas_price, available);

    if !result.sufficient {
        tracing::info!(
            required = %result.required_native,
            available = %result.available_native,
            "preflight blocked: insufficient native balance"
        );
        return Err(shortfall_error(&result, value).into());
    }

    tracing::debug!(gas, gas_price, "preflight passed");
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::Bytes;
    use base_client::testing::FakeChain;
    use toby_core::registry::base;

    const GWEI: u128 = 1_000_000_000;

    fn owner() -> Address {
        Address::repeat_byte(0x0a)
    }

    fn swapper() -> Address {
        Address::repeat_byte(0x5a)
    }

    fn token_request(amount: u64) -> PreflightRequest {
        PreflightRequest {
            owner: owner(),
            token_in: Asset::Token(base::USDC),
            symbol: "USDC".to_string(),
            decimals: 6,
            amount_in: U256::from(amount),
            spender: swapper(),
            call: ContractCall::new(owner(), swapper(), Bytes::new(), U256::ZERO),
            expected_chain_id: 8453,
        }
    }

    fn native_request(value: U256) -> PreflightRequest {
        PreflightRequest {
            owner: owner(),
            token_in: Asset::Native,
            symbol: "ETH".to_string(),
            decimals: 18,
            amount_in: value,
            spender: swapper(),
            call: ContractCall::new(owner(), swapper(), Bytes::new(), value),
            expected_chain_id: 8453,
        }
    }

    fn funded_token_chain() -> FakeChain {
        FakeChain::new(8453)
            .with_token_balance(base::USDC, owner(), U256::from(5_000_000u64))
            .with_allowance(base::USDC, owner(), swapper(), U256::MAX)
    }

    #[test]
    fn test_blocked_iff_balance_below_required() {
        let value = U256::from(1_000u64);
        let gas = 21_000u64;
        let price = 3u128;
        let required = value + U256::from(gas * 3);
        for delta in [-2i64, -1, 0, 1, 2] {
            let balance = if delta < 0 {
                required - U256::from(delta.unsigned_abs())
            } else {
                required + U256::from(delta as u64)
            };
            let result = check_affordability(value, gas, price, balance);
            assert_eq!(!result.sufficient, balance < required, "delta {}", delta);
            assert_eq!(result.required_native, required);
        }
    }

    #[tokio::test]
    async fn test_insufficient_gas_reports_six_decimals() {
        // 700_000 gas at 1 gwei = 0.0007 ETH, balance 0.0005 ETH
        let chain = funded_token_chain()
            .with_gas(700_000)
            .with_gas_price(GWEI)
            .with_native(owner(), U256::from(500_000_000_000_000u64));
        let err = run_preflight(&chain, &token_request(1_000_000))
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "insufficient_balance");
        assert_eq!(
            err.to_string(),
            "Swap error: Insufficient ETH for gas: need 0.000700, have 0.000500"
        );
    }

    #[tokio::test]
    async fn test_native_value_counts_toward_required() {
        let value = U256::from(400_000_000_000_000u64);
        let chain = FakeChain::new(8453)
            .with_gas(300_000)
            .with_gas_price(GWEI)
            .with_native(owner(), U256::from(500_000_000_000_000u64));
        let err = run_preflight(&chain, &native_request(value))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            toby_core::Error::Swap(SwapError::InsufficientNative { ref required, ref available })
                if required == "0.000700" && available == "0.000500"
        ));
    }

    #[tokio::test]
    async fn test_native_value_above_balance_skips_simulation() {
        let chain = FakeChain::new(8453).with_native(owner(), U256::from(10u64));
        let err = run_preflight(&chain, &native_request(U256::from(11u64)))
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "insufficient_balance");
        assert!(matches!(
            err,
            toby_core::Error::Swap(SwapError::InsufficientTradeValue { .. })
        ));
        assert!(err.to_string().contains("trade value alone (gas not included)"));
        assert!(chain.estimate_calls().is_empty());
    }

    #[tokio::test]
    async fn test_passes_when_affordable() {
        let chain = funded_token_chain()
            .with_gas(100_000)
            .with_gas_price(GWEI)
            .with_native(owner(), U256::from(1_000_000_000_000_000u64));
        let result = run_preflight(&chain, &token_request(1_000_000))
            .await
            .unwrap();
        assert!(result.sufficient);
        assert_eq!(result.required_native, U256::from(100_000u128 * GWEI));
        assert_eq!(chain.estimate_calls().len(), 1);
    }

    #[tokio::test]
    async fn test_approval_required_before_simulation() {
        let chain = FakeChain::new(8453)
            .with_token_balance(base::USDC, owner(), U256::from(5_000_000u64))
            .with_native(owner(), U256::MAX);
        let err = run_preflight(&chain, &token_request(1_000_000))
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "approval_required");
        assert!(chain.estimate_calls().is_empty());
    }

    #[tokio::test]
    async fn test_token_balance_short() {
        let chain = funded_token_chain();
        let err = run_preflight(&chain, &token_request(6_000_000))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Insufficient USDC balance: need 6.000000, have 5.000000"));
    }

    #[tokio::test]
    async fn test_simulation_revert_reason_verbatim() {
        let chain = funded_token_chain()
            .with_native(owner(), U256::MAX)
            .with_simulation_revert("UniswapV2Router: INSUFFICIENT_OUTPUT_AMOUNT");
        let err = run_preflight(&chain, &token_request(1_000_000))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            toby_core::Error::Swap(SwapError::SimulationReverted { ref reason })
                if reason == "UniswapV2Router: INSUFFICIENT_OUTPUT_AMOUNT"
        ));
    }

    #[tokio::test]
    async fn test_wrong_network_blocks_first() {
        let chain = FakeChain::new(1);
        let err = run_preflight(&chain, &token_request(1))
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "network_mismatch");
    }
}
