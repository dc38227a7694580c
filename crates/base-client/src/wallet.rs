//! Local-key transaction sender

use std::time::Duration;

use alloy::network::{EthereumWallet, ReceiptResponse};
use alloy::primitives::{Address, B256};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::signers::local::PrivateKeySigner;
use async_trait::async_trait;
use toby_core::{ChainConfig, ChainError};

use crate::{timed_request, ContractCall, Result, TxSender};

/// How often to poll for a receipt
const RECEIPT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Give up waiting for a receipt after this long
const RECEIPT_TIMEOUT: Duration = Duration::from_secs(180);

/// Sends transactions signed by a private key held in memory.
///
/// The provider's fillers take care of nonce, gas limit and fees.
#[derive(Clone)]
pub struct WalletSender {
    provider: DynProvider,
    address: Address,
    config: ChainConfig,
}

impl WalletSender {
    /// Build from a hex private key (with or without `0x`).
    pub fn from_private_key(config: ChainConfig, key: &str) -> Result<Self> {
        let signer: PrivateKeySigner = key.trim().parse().map_err(|e| ChainError::Decode {
            what: "private key".to_string(),
            message: format!("{}", e),
        })?;
        let address = signer.address();
        let url = config.rpc_url.parse().map_err(|e| ChainError::Unreachable {
            url: format!("{}: {}", config.rpc_url, e),
        })?;
        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::from(signer))
            .connect_http(url)
            .erased();

        tracing::info!(%address, "Loaded signing key");
        Ok(Self {
            provider,
            address,
            config,
        })
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(self.config.request_timeout_secs)
    }
}

#[async_trait]
impl TxSender for WalletSender {
    fn address(&self) -> Address {
        self.address
    }

    async fn send(&self, call: &ContractCall) -> Result<B256> {
        let pending = timed_request(
            &self.config.rpc_url,
            "eth_sendTransaction",
            self.timeout(),
            self.provider.send_transaction(call.to_request()),
        )
        .await?;
        let tx_hash = *pending.tx_hash();
        tracing::info!(%tx_hash, to = %call.to, "Transaction broadcast");
        Ok(tx_hash)
    }

    async fn wait_mined(&self, tx_hash: B256) -> Result<bool> {
        let started = tokio::time::Instant::now();
        loop {
            let receipt = timed_request(
                &self.config.rpc_url,
                "eth_getTransactionReceipt",
                self.timeout(),
                self.provider.get_transaction_receipt(tx_hash),
            )
            .await;

            match receipt {
                Ok(Some(receipt)) => {
                    let success = receipt.status();
                    tracing::info!(%tx_hash, success, "Transaction mined");
                    return Ok(success);
                }
                Ok(None) => {}
                Err(e) => tracing::debug!(%tx_hash, error = %e, "Receipt poll failed"),
            }

            if started.elapsed() >= RECEIPT_TIMEOUT {
                return Err(ChainError::Timeout {
                    method: "eth_getTransactionReceipt".to_string(),
                    secs: RECEIPT_TIMEOUT.as_secs(),
                });
            }
            tokio::time::sleep(RECEIPT_POLL_INTERVAL).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_private_key_derives_address() {
        // Well-known development key #0
        let sender = WalletSender::from_private_key(
            ChainConfig::default(),
            "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80",
        )
        .unwrap();
        assert_eq!(
            sender.address(),
            "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"
                .parse::<Address>()
                .unwrap()
        );
    }

    #[test]
    fn test_from_private_key_rejects_garbage() {
        let err = WalletSender::from_private_key(ChainConfig::default(), "0x1234")
            .err()
            .unwrap();
        assert!(matches!(err, ChainError::Decode { .. }));
    }
}
