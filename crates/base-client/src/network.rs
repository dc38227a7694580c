//! Network detection
//!
//! Probes the RPC endpoint for its chain id and gas price so callers can
//! refuse to quote or submit against the wrong chain.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use toby_core::{Chain, SwapError};

use crate::ChainReader;

/// Result of probing the RPC endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkStatus {
    /// Endpoint answered `eth_chainId`
    pub is_online: bool,

    /// Chain id reported by the endpoint
    pub chain_id: Option<u64>,

    /// Chain id the app is configured for
    pub expected_chain_id: u64,

    /// Current gas price in wei (if it could be read)
    pub gas_price_wei: Option<u128>,

    pub latency_ms: u64,
}

impl NetworkStatus {
    pub fn is_expected_chain(&self) -> bool {
        self.chain_id == Some(self.expected_chain_id)
    }

    /// The mismatch error, if connected to some other chain
    pub fn mismatch(&self) -> Option<SwapError> {
        match self.chain_id {
            Some(actual) if actual != self.expected_chain_id => Some(SwapError::NetworkMismatch {
                expected: self.expected_chain_id,
                actual,
            }),
            _ => None,
        }
    }
}

/// Probe the endpoint. Never fails; an unreachable endpoint is reported offline.
pub async fn detect_network(reader: &dyn ChainReader, expected: Chain) -> NetworkStatus {
    let start = Instant::now();
    let chain_id = match reader.chain_id().await {
        Ok(id) => id,
        Err(e) => {
            tracing::warn!(error = %e, "RPC endpoint did not answer eth_chainId");
            return NetworkStatus {
                is_online: false,
                chain_id: None,
                expected_chain_id: expected.id(),
                gas_price_wei: None,
                latency_ms: start.elapsed().as_millis() as u64,
            };
        }
    };
    let latency_ms = start.elapsed().as_millis() as u64;
    let gas_price_wei = reader.gas_price().await.ok();

    if chain_id != expected.id() {
        tracing::warn!(
            chain_id,
            expected = expected.id(),
            "RPC endpoint is on an unexpected chain"
        );
    }

    NetworkStatus {
        is_online: true,
        chain_id: Some(chain_id),
        expected_chain_id: expected.id(),
        gas_price_wei,
        latency_ms,
    }
}

/// Fail with `NetworkMismatch` unless the endpoint reports `expected_id`.
pub async fn ensure_network(reader: &dyn ChainReader, expected_id: u64) -> toby_core::Result<()> {
    let actual = reader.chain_id().await?;
    if actual != expected_id {
        return Err(SwapError::NetworkMismatch {
            expected: expected_id,
            actual,
        }
        .into());
    }
    Ok(())
}
