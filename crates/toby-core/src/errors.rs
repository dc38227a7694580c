//! Error types for Toby Swapper

use thiserror::Error;

/// Core errors that can occur in Toby Swapper
#[derive(Debug, Error)]
pub enum Error {
    #[error("Chain error: {0}")]
    Chain(#[from] ChainError),

    #[error("Swap error: {0}")]
    Swap(#[from] SwapError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] TxError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// RPC connection and query errors
#[derive(Debug, Clone, Error)]
pub enum ChainError {
    #[error("RPC endpoint unreachable at {url}")]
    Unreachable { url: String },

    #[error("RPC call {method} failed: {message}")]
    Rpc { method: String, message: String },

    #[error("RPC call {method} timed out after {secs}s")]
    Timeout { method: String, secs: u64 },

    #[error("Call reverted: {reason}")]
    Reverted { reason: String },

    #[error("Failed to decode {what}: {message}")]
    Decode { what: String, message: String },

    #[error("No signer configured")]
    NoSigner,
}

impl ChainError {
    /// Revert reason if this error came from a reverted call
    pub fn revert_reason(&self) -> Option<&str> {
        match self {
            Self::Reverted { reason } => Some(reason),
            _ => None,
        }
    }
}

/// Swap flow errors surfaced to the user
#[derive(Debug, Clone, Error)]
pub enum SwapError {
    #[error("No route found for {pair} at this size")]
    NoRouteFound { pair: String },

    #[error("Insufficient ETH for gas: need {required}, have {available}")]
    InsufficientGas { required: String, available: String },

    #[error("Insufficient ETH including trade value: need {required}, have {available}")]
    InsufficientNative { required: String, available: String },

    #[error("Insufficient ETH for trade value alone (gas not included): need {required}, have {available}")]
    InsufficientTradeValue { required: String, available: String },

    #[error("Insufficient {symbol} balance: need {required}, have {available}")]
    InsufficientTokens {
        symbol: String,
        required: String,
        available: String,
    },

    #[error("Approval required: {symbol} allowance {allowance} is below {required}")]
    ApprovalRequired {
        symbol: String,
        allowance: String,
        required: String,
    },

    #[error("Simulation reverted: {reason}")]
    SimulationReverted { reason: String },

    #[error("Wrong network: connected to chain {actual}, expected {expected}")]
    NetworkMismatch { expected: u64, actual: u64 },

    #[error("Invalid amount: {message}")]
    InvalidAmount { message: String },

    #[error("Invalid slippage: {bps} bps exceeds maximum {max_bps} bps")]
    InvalidSlippage { bps: u64, max_bps: u64 },

    #[error("Unsupported pair: {reason}")]
    UnsupportedPair { reason: String },

    #[error("Unknown token: {reference}")]
    UnknownToken { reference: String },

    #[error("Swap contract state unavailable: {reason}")]
    StateUnavailable { reason: String },
}

/// Transaction building and submission errors
#[derive(Debug, Clone, Error)]
pub enum TxError {
    #[error("Swap contract address not configured")]
    SwapperNotConfigured,

    #[error("Failed to build transaction: {message}")]
    BuildFailed { message: String },

    #[error("Transaction submission failed: {message}")]
    SubmissionFailed { message: String },

    #[error("Transaction {tx_hash} reverted on-chain")]
    RevertedOnChain { tx_hash: String },

    #[error("Invalid submission transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },
}

/// Result type alias for Toby Swapper operations
pub type Result<T> = std::result::Result<T, Error>;

impl SwapError {
    /// Get an HTTP-friendly error code
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NoRouteFound { .. } => "no_route_found",
            Self::InsufficientGas { .. }
            | Self::InsufficientNative { .. }
            | Self::InsufficientTradeValue { .. }
            | Self::InsufficientTokens { .. } => "insufficient_balance",
            Self::ApprovalRequired { .. } => "approval_required",
            Self::SimulationReverted { .. } => "simulation_reverted",
            Self::NetworkMismatch { .. } => "network_mismatch",
            Self::InvalidAmount { .. } => "invalid_amount",
            Self::InvalidSlippage { .. } => "invalid_slippage",
            Self::UnsupportedPair { .. } => "unsupported_pair",
            Self::UnknownToken { .. } => "unknown_token",
            Self::StateUnavailable { .. } => "state_unavailable",
        }
    }

    /// Get HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidAmount { .. }
            | Self::InvalidSlippage { .. }
            | Self::UnsupportedPair { .. }
            | Self::UnknownToken { .. } => 400,
            Self::NoRouteFound { .. } => 404,
            Self::NetworkMismatch { .. } => 409,
            Self::InsufficientGas { .. }
            | Self::InsufficientNative { .. }
            | Self::InsufficientTradeValue { .. }
            | Self::InsufficientTokens { .. }
            | Self::ApprovalRequired { .. }
            | Self::SimulationReverted { .. } => 422,
            Self::StateUnavailable { .. } => 503,
        }
    }
}

impl Error {
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Swap(e) => e.error_code(),
            Self::Chain(_) => "chain_error",
            Self::Transaction(_) => "transaction_error",
            Self::Config(_) => "config_error",
            Self::Serialization(_) => "serialization_error",
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            Self::Swap(e) => e.status_code(),
            Self::Chain(_) => 502,
            Self::Transaction(TxError::SwapperNotConfigured) | Self::Config(_) => 503,
            Self::Transaction(_) => 422,
            Self::Serialization(_) => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_swap_error_codes() {
        let err = SwapError::NoRouteFound {
            pair: "USDC/cbBTC".into(),
        };
        assert_eq!(err.error_code(), "no_route_found");
        assert_eq!(err.status_code(), 404);

        let err = SwapError::InsufficientGas {
            required: "0.000700".into(),
            available: "0.000500".into(),
        };
        assert_eq!(err.error_code(), "insufficient_balance");
        assert_eq!(err.status_code(), 422);
        assert_eq!(
            err.to_string(),
            "Insufficient ETH for gas: need 0.000700, have 0.000500"
        );
    }

    #[test]
    fn test_umbrella_error_delegates() {
        let err: Error = SwapError::NetworkMismatch {
            expected: 8453,
            actual: 1,
        }
        .into();
        assert_eq!(err.error_code(), "network_mismatch");
        assert_eq!(err.status_code(), 409);

        let err: Error = TxError::SwapperNotConfigured.into();
        assert_eq!(err.status_code(), 503);
    }

    #[test]
    fn test_revert_reason() {
        let err = ChainError::Reverted {
            reason: "INSUFFICIENT_OUTPUT_AMOUNT".into(),
        };
        assert_eq!(err.revert_reason(), Some("INSUFFICIENT_OUTPUT_AMOUNT"));
        assert!(ChainError::NoSigner.revert_reason().is_none());
    }
}
