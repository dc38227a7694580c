//! Transaction Submitter
//!
//! [`SubmissionTracker`] holds the lifecycle of one swap attempt:
//! `Idle -> Simulating -> Sending -> Mined`, or `Error` from any live stage.
//! Stages only move forward; a finished attempt must be reset to `Idle`
//! before the next one.

use alloy_primitives::B256;
use base_client::{ChainReader, TxSender};
use toby_core::{ChainError, Error, TxError};

use crate::preflight::{run_preflight, PreflightRequest};
use crate::state::{PendingTransaction, PreflightResult, TxStage};

const GENERIC_FAILURE: &str = "Transaction failed. Please try again.";

/// Tracks the stage of a single submission
#[derive(Debug, Clone, Default)]
pub struct SubmissionTracker {
    state: PendingTransaction,
}

impl SubmissionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage(&self) -> TxStage {
        self.state.stage
    }

    pub fn snapshot(&self) -> PendingTransaction {
        self.state.clone()
    }

    fn advance(&mut self, from: TxStage, to: TxStage) -> Result<(), TxError> {
        if self.state.stage != from {
            return Err(TxError::InvalidTransition {
                from: self.state.stage.as_str().to_string(),
                to: to.as_str().to_string(),
            });
        }
        self.state.stage = to;
        Ok(())
    }

    pub fn begin_simulation(&mut self) -> Result<(), TxError> {
        self.advance(TxStage::Idle, TxStage::Simulating)
    }

    pub fn begin_sending(&mut self) -> Result<(), TxError> {
        self.advance(TxStage::Simulating, TxStage::Sending)
    }

    /// Record the broadcast hash while still waiting for inclusion
    pub fn record_hash(&mut self, tx_hash: B256) -> Result<(), TxError> {
        if self.state.stage != TxStage::Sending {
            return Err(TxError::InvalidTransition {
                from: self.state.stage.as_str().to_string(),
                to: TxStage::Sending.as_str().to_string(),
            });
        }
        self.state.tx_hash = Some(tx_hash);
        Ok(())
    }

    pub fn mark_mined(&mut self) -> Result<(), TxError> {
        self.advance(TxStage::Sending, TxStage::Mined)
    }

    /// Move to `Error` from any non-terminal stage
    pub fn fail(&mut self, message: impl Into<String>) -> Result<(), TxError> {
        if self.state.stage.is_terminal() {
            return Err(TxError::InvalidTransition {
                from: self.state.stage.as_str().to_string(),
                to: TxStage::Error.as_str().to_string(),
            });
        }
        self.state.stage = TxStage::Error;
        self.state.message = Some(message.into());
        Ok(())
    }

    /// Back to `Idle`; only allowed once the attempt has finished
    pub fn reset(&mut self) -> Result<(), TxError> {
        if !self.state.stage.is_terminal() {
            return Err(TxError::InvalidTransition {
                from: self.state.stage.as_str().to_string(),
                to: TxStage::Idle.as_str().to_string(),
            });
        }
        self.state = PendingTransaction::default();
        Ok(())
    }
}

/// Text shown to the user for a failed attempt.
///
/// Carries the external rejection reason when there is one.
pub fn failure_message(err: &Error) -> String {
    match err {
        Error::Swap(e) => e.to_string(),
        Error::Chain(ChainError::Reverted { reason }) => format!("Transaction reverted: {}", reason),
        Error::Chain(ChainError::Rpc { message, .. }) => message.clone(),
        Error::Transaction(TxError::SubmissionFailed { message }) => message.clone(),
        Error::Transaction(e @ TxError::RevertedOnChain { .. }) => e.to_string(),
        _ => GENERIC_FAILURE.to_string(),
    }
}

/// Outcome of a mined swap
#[derive(Debug, Clone)]
pub struct SubmissionReceipt {
    pub tx_hash: B256,
    pub preflight: PreflightResult,
}

/// Preflight, send and wait, recording each stage on `tracker`.
///
/// The tracker must be `Idle`. On failure it is left in `Error` with the
/// user-facing message and the error is returned.
pub async fn submit_swap(
    reader: &dyn ChainReader,
    sender: &dyn TxSender,
    request: &PreflightRequest,
    tracker: &mut SubmissionTracker,
) -> toby_core::Result<SubmissionReceipt> {
    tracker.begin_simulation()?;

    let result = async {
        let preflight = run_preflight(reader, request).await?;
        tracker.begin_sending()?;

        let tx_hash = sender
            .send(&request.call)
            .await
            .map_err(|e| TxError::SubmissionFailed {
                message: e.to_string(),
            })?;
        tracker.record_hash(tx_hash)?;
        tracing::info!(%tx_hash, "swap sent");

        if !sender.wait_mined(tx_hash).await? {
            return Err(Error::from(TxError::RevertedOnChain {
                tx_hash: tx_hash.to_string(),
            }));
        }
        tracker.mark_mined()?;
        Ok::<_, Error>(SubmissionReceipt { tx_hash, preflight })
    }
    .await;

    if let Err(e) = &result {
        let message = failure_message(e);
        tracing::warn!(stage = tracker.stage().as_str(), %message, "swap failed");
        // Already terminal only if mark_mined itself failed
        let _ = tracker.fail(message);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{Address, Bytes, U256};
    use base_client::testing::{FakeChain, FakeSender};
    use base_client::ContractCall;
    use toby_core::Asset;

    fn owner() -> Address {
        Address::repeat_byte(0x0a)
    }

    fn native_request() -> PreflightRequest {
        let value = U256::from(1_000u64);
        PreflightRequest {
            owner: owner(),
            token_in: Asset::Native,
            symbol: "ETH".to_string(),
            decimals: 18,
            amount_in: value,
            spender: Address::repeat_byte(0x5a),
            call: ContractCall::new(owner(), Address::repeat_byte(0x5a), Bytes::new(), value),
            expected_chain_id: 8453,
        }
    }

    fn rich_chain() -> FakeChain {
        FakeChain::new(8453).with_native(owner(), U256::from(1_000_000_000_000_000_000u64))
    }

    #[test]
    fn test_tracker_happy_path() {
        let mut tracker = SubmissionTracker::new();
        tracker.begin_simulation().unwrap();
        tracker.begin_sending().unwrap();
        tracker.record_hash(B256::with_last_byte(1)).unwrap();
        tracker.mark_mined().unwrap();
        assert_eq!(tracker.stage(), TxStage::Mined);
        assert_eq!(tracker.snapshot().tx_hash, Some(B256::with_last_byte(1)));
    }

    #[test]
    fn test_tracker_is_one_directional() {
        let mut tracker = SubmissionTracker::new();
        assert!(tracker.begin_sending().is_err());
        assert!(tracker.mark_mined().is_err());
        assert!(tracker.reset().is_err());

        tracker.begin_simulation().unwrap();
        assert!(tracker.begin_simulation().is_err());
        tracker.fail("boom").unwrap();
        assert_eq!(tracker.stage(), TxStage::Error);
        assert!(tracker.fail("again").is_err());
        assert!(tracker.begin_sending().is_err());

        tracker.reset().unwrap();
        assert_eq!(tracker.snapshot(), PendingTransaction::default());
    }

    #[tokio::test]
    async fn test_submit_swap_mined() {
        let chain = rich_chain();
        let sender = FakeSender::new(chain.clone(), owner());
        let mut tracker = SubmissionTracker::new();

        let receipt = submit_swap(&chain, &sender, &native_request(), &mut tracker)
            .await
            .unwrap();
        assert_eq!(tracker.stage(), TxStage::Mined);
        assert_eq!(tracker.snapshot().tx_hash, Some(receipt.tx_hash));
        assert_eq!(sender.sent().len(), 1);
        // simulated strictly before the send
        assert_eq!(chain.estimate_calls().len(), 1);
    }

    #[tokio::test]
    async fn test_simulation_revert_never_sends() {
        let chain = rich_chain().with_simulation_revert("TobySwapper: EXPIRED");
        let sender = FakeSender::new(chain.clone(), owner());
        let mut tracker = SubmissionTracker::new();

        let err = submit_swap(&chain, &sender, &native_request(), &mut tracker)
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "simulation_reverted");
        assert!(sender.sent().is_empty());
        let state = tracker.snapshot();
        assert_eq!(state.stage, TxStage::Error);
        assert!(state.message.unwrap().contains("TobySwapper: EXPIRED"));
    }

    #[tokio::test]
    async fn test_rejected_signature_surfaces_message() {
        let chain = rich_chain();
        let sender = FakeSender::new(chain.clone(), owner()).rejecting("User rejected the request.");
        let mut tracker = SubmissionTracker::new();

        submit_swap(&chain, &sender, &native_request(), &mut tracker)
            .await
            .unwrap_err();
        let message = tracker.snapshot().message.unwrap();
        assert!(message.contains("User rejected the request."));
    }

    #[tokio::test]
    async fn test_onchain_revert_ends_in_error() {
        let chain = rich_chain();
        let sender = FakeSender::new(chain.clone(), owner()).reverting();
        let mut tracker = SubmissionTracker::new();

        let err = submit_swap(&chain, &sender, &native_request(), &mut tracker)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Transaction(TxError::RevertedOnChain { .. })
        ));
        assert_eq!(tracker.stage(), TxStage::Error);
        assert!(tracker.snapshot().tx_hash.is_some());
    }

    #[tokio::test]
    async fn test_tracker_must_start_idle() {
        let chain = rich_chain();
        let sender = FakeSender::new(chain.clone(), owner());
        let mut tracker = SubmissionTracker::new();
        submit_swap(&chain, &sender, &native_request(), &mut tracker)
            .await
            .unwrap();

        let err = submit_swap(&chain, &sender, &native_request(), &mut tracker)
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "transaction_error");
        assert_eq!(tracker.stage(), TxStage::Mined);

        tracker.reset().unwrap();
        submit_swap(&chain, &sender, &native_request(), &mut tracker)
            .await
            .unwrap();
    }

    #[test]
    fn test_failure_message_generic_fallback() {
        let err = Error::Config("x".into());
        assert_eq!(failure_message(&err), GENERIC_FAILURE);
    }
}
