//! Swap State Types
//!
//! Data structures for quotes, preflight results and pending transactions.

use std::time::Duration;

use alloy_primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};
use toby_core::Asset;

use crate::path::RoutePath;

/// Outcome of one `getAmountsOut` call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteAttempt {
    pub path: RoutePath,
    pub output_amount: U256,
    pub success: bool,
    #[serde(with = "duration_ms")]
    pub elapsed: Duration,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl QuoteAttempt {
    /// Deterministic one-line rendering (latency excluded)
    pub fn describe(&self) -> String {
        match (&self.error, self.success) {
            (_, true) => format!("{} => ok {}", self.path, self.output_amount),
            (Some(err), false) => format!("{} => failed: {}", self.path, err),
            (None, false) => format!("{} => zero output", self.path),
        }
    }
}

/// First positive quote in priority order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedQuote {
    pub path: RoutePath,
    pub raw_output: U256,
    pub min_output: U256,
}

/// Conversion of the protocol fee into the burn token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeeLegQuote {
    pub path: RoutePath,
    pub fee_amount: U256,
    pub quoted_output: U256,
    pub min_output: U256,
    /// Present when the fee-leg quote failed and `min_output` fell back to zero
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attempt: Option<QuoteAttempt>,
}

/// Quote request as entered by the user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteRequest {
    pub token_in: Asset,
    pub token_out: Asset,
    /// Gross input in smallest units (fee included)
    pub amount_in: U256,
    /// Defaults to the configured slippage when absent
    #[serde(default)]
    pub slippage_bps: Option<u64>,
}

/// Everything needed to display and submit a swap
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwapQuote {
    pub token_in: Asset,
    pub token_out: Address,
    pub amount_in: U256,
    pub fee_bps: u64,
    /// Amount routed through the main leg
    pub net_amount: U256,
    pub slippage_bps: u64,
    pub selected: SelectedQuote,
    pub fee_leg: FeeLegQuote,
    pub attempts: Vec<QuoteAttempt>,
}

/// Native affordability check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreflightResult {
    pub required_native: U256,
    pub available_native: U256,
    pub sufficient: bool,
    pub gas_estimate: u64,
    pub gas_price: u128,
}

/// Submission lifecycle stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxStage {
    Idle,
    Simulating,
    Sending,
    Mined,
    Error,
}

impl TxStage {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Mined | Self::Error)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Simulating => "simulating",
            Self::Sending => "sending",
            Self::Mined => "mined",
            Self::Error => "error",
        }
    }
}

/// Snapshot of the in-flight swap
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingTransaction {
    pub stage: TxStage,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<B256>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Default for PendingTransaction {
    fn default() -> Self {
        Self {
            stage: TxStage::Idle,
            tx_hash: None,
            message: None,
        }
    }
}

mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}
