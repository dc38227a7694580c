//! Token approval
//!
//! Tokens that refuse to raise a non-zero allowance directly are handled by
//! resetting to zero first. Each approval is mined before the next step and
//! the allowance is re-read at the end.

use alloy_primitives::{Address, U256};
use base_client::{ChainReader, TxSender};
use toby_core::{SwapError, TxError};

use crate::constants::approval::MAX_APPROVAL;
use crate::tx_builder::build_approve_tx;

/// One approval transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalStep {
    ResetToZero,
    ApproveMax,
}

impl ApprovalStep {
    pub fn amount(&self) -> U256 {
        match self {
            Self::ResetToZero => U256::ZERO,
            Self::ApproveMax => MAX_APPROVAL,
        }
    }
}

/// Steps needed to lift `current` to at least `required`
pub fn plan_approval(current: U256, required: U256) -> Vec<ApprovalStep> {
    if current >= required {
        Vec::new()
    } else if current.is_zero() {
        vec![ApprovalStep::ApproveMax]
    } else {
        vec![ApprovalStep::ResetToZero, ApprovalStep::ApproveMax]
    }
}

/// Approve `spender` for `token` if needed and return the re-read allowance.
pub async fn approve_for_swap(
    reader: &dyn ChainReader,
    sender: &dyn TxSender,
    token: Address,
    spender: Address,
    required: U256,
) -> toby_core::Result<U256> {
    let owner = sender.address();
    let current = reader.erc20_allowance(token, owner, spender).await?;
    let steps = plan_approval(current, required);
    if steps.is_empty() {
        return Ok(current);
    }

    for step in steps {
        let call = build_approve_tx(owner, token, spender, step.amount());
        let tx_hash = sender.send(&call).await.map_err(|e| TxError::SubmissionFailed {
            message: e.to_string(),
        })?;
        tracing::info!(%token, %spender, ?step, %tx_hash, "approval sent");

        if !sender.wait_mined(tx_hash).await? {
            return Err(TxError::RevertedOnChain {
                tx_hash: tx_hash.to_string(),
            }
            .into());
        }
    }

    let allowance = reader.erc20_allowance(token, owner, spender).await?;
    if allowance < required {
        return Err(SwapError::ApprovalRequired {
            symbol: token.to_string(),
            allowance: allowance.to_string(),
            required: required.to_string(),
        }
        .into());
    }
    Ok(allowance)
}
