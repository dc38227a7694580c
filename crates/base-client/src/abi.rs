//! Contract interfaces and calldata helpers
//!
//! Only the functions the swap flow touches are declared here.

use alloy::primitives::{Address, Bytes, U256};
use alloy::sol;
use alloy::sol_types::SolCall;

use toby_core::ChainError;

sol! {
    interface IUniswapV2Router {
        function getAmountsOut(uint256 amountIn, address[] calldata path) external view returns (uint256[] memory amounts);
    }

    interface IERC20 {
        function decimals() external view returns (uint8);
        function balanceOf(address owner) external view returns (uint256);
        function allowance(address owner, address spender) external view returns (uint256);
        function approve(address spender, uint256 amount) external returns (bool);
    }

    interface ITobySwapper {
        function feeBps() external view returns (uint256);
        function totalBurned() external view returns (uint256);

        function swapETHForTokenWithBurn(
            address tokenOut,
            uint256 amountOutMin,
            address[] calldata path,
            address[] calldata feePath,
            uint256 feeAmountOutMin,
            uint256 deadline
        ) external payable;

        function swapTokenForTokenWithBurn(
            address tokenIn,
            address tokenOut,
            uint256 amountIn,
            uint256 amountOutMin,
            address[] calldata path,
            address[] calldata feePath,
            uint256 feeAmountOutMin,
            uint256 deadline
        ) external;
    }
}

/// Encode `approve(spender, amount)`
pub fn encode_approve(spender: Address, amount: U256) -> Bytes {
    IERC20::approveCall { spender, amount }.abi_encode().into()
}

/// Decode `approve` calldata back into (spender, amount)
pub fn decode_approve(data: &[u8]) -> Option<(Address, U256)> {
    IERC20::approveCall::abi_decode(data)
        .ok()
        .map(|call| (call.spender, call.amount))
}

/// Encode `getAmountsOut(amountIn, path)`
pub fn encode_amounts_out(amount_in: U256, path: &[Address]) -> Bytes {
    IUniswapV2Router::getAmountsOutCall {
        amountIn: amount_in,
        path: path.to_vec(),
    }
    .abi_encode()
    .into()
}

/// Arguments of either swap contract entry point
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapCallArgs {
    /// `None` selects the payable native-input entry point
    pub token_in: Option<Address>,
    pub token_out: Address,
    /// Gross input; sent as call value for native input
    pub amount_in: U256,
    pub amount_out_min: U256,
    pub path: Vec<Address>,
    pub fee_path: Vec<Address>,
    pub fee_amount_out_min: U256,
    pub deadline: U256,
}

/// Encode `swapETHForTokenWithBurn` or `swapTokenForTokenWithBurn`
pub fn encode_swap_call(args: &SwapCallArgs) -> Bytes {
    match args.token_in {
        None => ITobySwapper::swapETHForTokenWithBurnCall {
            tokenOut: args.token_out,
            amountOutMin: args.amount_out_min,
            path: args.path.clone(),
            feePath: args.fee_path.clone(),
            feeAmountOutMin: args.fee_amount_out_min,
            deadline: args.deadline,
        }
        .abi_encode()
        .into(),
        Some(token_in) => ITobySwapper::swapTokenForTokenWithBurnCall {
            tokenIn: token_in,
            tokenOut: args.token_out,
            amountIn: args.amount_in,
            amountOutMin: args.amount_out_min,
            path: args.path.clone(),
            feePath: args.fee_path.clone(),
            feeAmountOutMin: args.fee_amount_out_min,
            deadline: args.deadline,
        }
        .abi_encode()
        .into(),
    }
}

/// Decode swap calldata. `value` supplies the input amount for native swaps.
pub fn decode_swap_call(data: &[u8], value: U256) -> Option<SwapCallArgs> {
    if let Ok(call) = ITobySwapper::swapETHForTokenWithBurnCall::abi_decode(data) {
        return Some(SwapCallArgs {
            token_in: None,
            token_out: call.tokenOut,
            amount_in: value,
            amount_out_min: call.amountOutMin,
            path: call.path,
            fee_path: call.feePath,
            fee_amount_out_min: call.feeAmountOutMin,
            deadline: call.deadline,
        });
    }
    ITobySwapper::swapTokenForTokenWithBurnCall::abi_decode(data)
        .ok()
        .map(|call| SwapCallArgs {
            token_in: Some(call.tokenIn),
            token_out: call.tokenOut,
            amount_in: call.amountIn,
            amount_out_min: call.amountOutMin,
            path: call.path,
            fee_path: call.feePath,
            fee_amount_out_min: call.feeAmountOutMin,
            deadline: call.deadline,
        })
}

pub(crate) fn decode_returns<C: SolCall>(what: &str, data: &[u8]) -> Result<C::Return, ChainError> {
    C::abi_decode_returns(data).map_err(|e| ChainError::Decode {
        what: what.to_string(),
        message: e.to_string(),
    })
}
