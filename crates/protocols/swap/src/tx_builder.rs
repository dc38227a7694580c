//! Swap Transaction Builder
//!
//! Turns a [`SwapQuote`] into the swap contract call. Native input selects
//! the payable `swapETHForTokenWithBurn` entry point with the gross amount
//! attached as value; token input selects `swapTokenForTokenWithBurn`.

use alloy_primitives::{Address, U256};
use base_client::abi::{encode_approve, encode_swap_call, SwapCallArgs};
use base_client::ContractCall;
use serde::{Deserialize, Serialize};
use toby_core::TxError;

use crate::calculator::deadline;
use crate::state::SwapQuote;

/// Build result containing the contract call and a summary
#[derive(Debug, Clone)]
pub struct SwapBuildResult {
    pub call: ContractCall,
    pub summary: SwapTxSummary,
}

/// Summary of the swap transaction for display
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwapTxSummary {
    pub entry_point: String,
    pub input_amount: U256,
    pub value: U256,
    pub min_output: U256,
    pub fee_amount: U256,
    pub fee_min_output: U256,
    pub deadline: U256,
}

/// Build the swap call for `owner`.
///
/// `now_secs` is the current Unix time; the deadline is `now_secs + deadline_secs`.
pub fn build_swap_tx(
    owner: Address,
    swapper: Option<Address>,
    quote: &SwapQuote,
    now_secs: u64,
    deadline_secs: u64,
) -> Result<SwapBuildResult, TxError> {
    let swapper = swapper.ok_or(TxError::SwapperNotConfigured)?;
    if quote.selected.path.last() != quote.token_out {
        return Err(TxError::BuildFailed {
            message: format!(
                "path {} does not end at {}",
                quote.selected.path, quote.token_out
            ),
        });
    }

    let native_in = quote.token_in.is_native();
    let deadline = deadline(now_secs, deadline_secs);
    let args = SwapCallArgs {
        token_in: quote.token_in.token_address(),
        token_out: quote.token_out,
        amount_in: quote.amount_in,
        amount_out_min: quote.selected.min_output,
        path: quote.selected.path.hops().to_vec(),
        fee_path: quote.fee_leg.path.hops().to_vec(),
        fee_amount_out_min: quote.fee_leg.min_output,
        deadline,
    };
    let value = if native_in { quote.amount_in } else { U256::ZERO };
    let call = ContractCall::new(owner, swapper, encode_swap_call(&args), value);

    let entry_point = if native_in {
        "swapETHForTokenWithBurn"
    } else {
        "swapTokenForTokenWithBurn"
    };

    Ok(SwapBuildResult {
        call,
        summary: SwapTxSummary {
            entry_point: entry_point.to_string(),
            input_amount: quote.amount_in,
            value,
            min_output: quote.selected.min_output,
            fee_amount: quote.fee_leg.fee_amount,
            fee_min_output: quote.fee_leg.min_output,
            deadline,
        },
    })
}

/// `approve(spender, amount)` on `token`
pub fn build_approve_tx(owner: Address, token: Address, spender: Address, amount: U256) -> ContractCall {
    ContractCall::new(owner, token, encode_approve(spender, amount), U256::ZERO)
}
