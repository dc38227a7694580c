//! Swap service
//!
//! Ties the registry, config and chain reader together for callers that
//! want whole operations: quote, build, preflight, approve and execute.
//! Shared by the HTTP API and the CLI.

use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::{Address, U256};
use base_client::{detect_network, ChainReader, NetworkStatus, TxSender};
use futures::future::join_all;
use toby_core::{AppConfig, Asset, SwapError, TokenDescriptor, TokenRegistry, TtlCache, TxError};

use crate::approval::approve_for_swap;
use crate::cache::{AllowanceKey, BalanceKey};
use crate::calculator::unix_now;
use crate::preflight::{run_preflight, PreflightRequest};
use crate::quote::quote_swap;
use crate::session::{LatestValue, QuoteSession};
use crate::state::{PreflightResult, QuoteRequest, SwapQuote};
use crate::submit::{submit_swap, SubmissionReceipt, SubmissionTracker};
use crate::tx_builder::{build_swap_tx, SwapBuildResult};

/// Swap operations over one chain connection
pub struct SwapService {
    reader: Arc<dyn ChainReader>,
    registry: Arc<TokenRegistry>,
    config: Arc<AppConfig>,
    balances: TtlCache<BalanceKey, U256>,
    allowances: TtlCache<AllowanceKey, U256>,
}

impl SwapService {
    pub fn new(
        reader: Arc<dyn ChainReader>,
        registry: Arc<TokenRegistry>,
        config: Arc<AppConfig>,
    ) -> Self {
        let max_age = Duration::from_secs(config.polling.balance_interval_secs);
        Self {
            reader,
            registry,
            config,
            balances: TtlCache::new(max_age),
            allowances: TtlCache::new(max_age),
        }
    }

    pub fn reader(&self) -> &Arc<dyn ChainReader> {
        &self.reader
    }

    pub fn registry(&self) -> &TokenRegistry {
        &self.registry
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Resolve a symbol, address or native alias against the registry
    pub fn resolve_token(&self, reference: &str) -> Result<TokenDescriptor, SwapError> {
        self.registry
            .resolve(reference)
            .cloned()
            .ok_or_else(|| SwapError::UnknownToken {
                reference: reference.to_string(),
            })
    }

    pub async fn network_status(&self) -> NetworkStatus {
        detect_network(self.reader.as_ref(), self.config.chain.chain).await
    }

    pub async fn quote(&self, request: &QuoteRequest) -> toby_core::Result<SwapQuote> {
        quote_swap(self.reader.as_ref(), &self.registry, &self.config, request).await
    }

    /// Debounced quote for interactive input.
    ///
    /// Returns `None` when a newer request superseded this one, either during
    /// the debounce window or while the quote was in flight. A successful
    /// current quote is stored in `displayed`.
    pub async fn quote_latest(
        &self,
        session: &QuoteSession,
        displayed: &LatestValue<SwapQuote>,
        request: &QuoteRequest,
    ) -> Option<toby_core::Result<SwapQuote>> {
        let ticket = session.debounced().await?;
        let result = self.quote(request).await;
        let applied = match &result {
            Ok(quote) => displayed.apply(&ticket, quote.clone()),
            Err(_) => ticket.is_current(),
        };
        applied.then_some(result)
    }

    /// Unsigned swap call for `owner`
    pub fn build_swap(&self, owner: Address, quote: &SwapQuote) -> toby_core::Result<SwapBuildResult> {
        Ok(build_swap_tx(
            owner,
            self.config.contracts.swapper,
            quote,
            unix_now(),
            self.config.swap.deadline_secs,
        )?)
    }

    fn descriptor(&self, asset: &Asset) -> (String, u8) {
        self.registry
            .by_asset(asset)
            .map(|t| (t.symbol.clone(), t.decimals))
            .unwrap_or_else(|| (asset.to_string(), 18))
    }

    /// Build the call and the matching preflight inputs
    pub fn prepare(
        &self,
        owner: Address,
        quote: &SwapQuote,
    ) -> toby_core::Result<(SwapBuildResult, PreflightRequest)> {
        let built = self.build_swap(owner, quote)?;
        let (symbol, decimals) = self.descriptor(&quote.token_in);
        let request = PreflightRequest {
            owner,
            token_in: quote.token_in,
            symbol,
            decimals,
            amount_in: quote.amount_in,
            spender: built.call.to,
            call: built.call.clone(),
            expected_chain_id: self.config.chain.chain.id(),
        };
        Ok((built, request))
    }

    pub async fn preflight(&self, owner: Address, quote: &SwapQuote) -> toby_core::Result<PreflightResult> {
        let (_, request) = self.prepare(owner, quote)?;
        run_preflight(self.reader.as_ref(), &request).await
    }

    /// Cached native or token balance
    pub async fn balance(&self, owner: Address, asset: Asset) -> toby_core::Result<U256> {
        let key = BalanceKey {
            chain: self.config.chain.chain,
            owner,
            asset,
        };
        let reader = self.reader.as_ref();
        let value = self
            .balances
            .get_or_fetch(key, || async move {
                match asset {
                    Asset::Native => reader.native_balance(owner).await,
                    Asset::Token(token) => reader.erc20_balance(token, owner).await,
                }
            })
            .await?;
        Ok(value)
    }

    /// Cached allowance granted to the swap contract
    pub async fn allowance(&self, owner: Address, token: Address) -> toby_core::Result<U256> {
        let spender = self
            .config
            .contracts
            .swapper
            .ok_or(TxError::SwapperNotConfigured)?;
        let key = AllowanceKey {
            chain: self.config.chain.chain,
            owner,
            token,
            spender,
        };
        let reader = self.reader.as_ref();
        let value = self
            .allowances
            .get_or_fetch(key, || reader.erc20_allowance(token, owner, spender))
            .await?;
        Ok(value)
    }

    /// Drop cached balances for `owner` and re-read them concurrently
    pub async fn refresh_balances(
        &self,
        owner: Address,
        assets: &[Asset],
    ) -> Vec<(Asset, toby_core::Result<U256>)> {
        for asset in assets {
            self.balances
                .invalidate(&BalanceKey {
                    chain: self.config.chain.chain,
                    owner,
                    asset: *asset,
                });
        }
        let reads = assets.iter().map(|asset| async move {
            (*asset, self.balance(owner, *asset).await)
        });
        join_all(reads).await
    }

    /// Approve the swap contract for `token` and refresh the cached allowance
    pub async fn approve(
        &self,
        sender: &dyn TxSender,
        token: Address,
        required: U256,
    ) -> toby_core::Result<U256> {
        let spender = self
            .config
            .contracts
            .swapper
            .ok_or(TxError::SwapperNotConfigured)?;
        let key = AllowanceKey {
            chain: self.config.chain.chain,
            owner: sender.address(),
            token,
            spender,
        };
        self.allowances.invalidate(&key);
        let allowance =
            approve_for_swap(self.reader.as_ref(), sender, token, spender, required).await?;
        self.allowances.insert(key, allowance);
        Ok(allowance)
    }

    /// Preflight, send and wait for a quoted swap
    pub async fn execute(
        &self,
        sender: &dyn TxSender,
        quote: &SwapQuote,
        tracker: &mut SubmissionTracker,
    ) -> toby_core::Result<SubmissionReceipt> {
        let owner = sender.address();
        let (_, request) = self.prepare(owner, quote)?;
        let receipt = submit_swap(self.reader.as_ref(), sender, &request, tracker).await?;

        for asset in [quote.token_in, Asset::Token(quote.token_out), Asset::Native] {
            self.balances
                .invalidate(&BalanceKey {
                    chain: self.config.chain.chain,
                    owner,
                    asset,
                });
        }
        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::TxStage;
    use base_client::abi::decode_swap_call;
    use base_client::testing::{FakeChain, FakeSender};
    use toby_core::registry::base;

    const ETH: u64 = 1_000_000_000_000_000_000;

    fn owner() -> Address {
        Address::repeat_byte(0x0a)
    }

    fn swapper() -> Address {
        Address::repeat_byte(0x5a)
    }

    fn service(chain: &FakeChain) -> SwapService {
        let mut config = AppConfig::default();
        config.contracts.swapper = Some(swapper());
        SwapService::new(
            Arc::new(chain.clone()),
            Arc::new(TokenRegistry::base_mainnet()),
            Arc::new(config),
        )
    }

    fn usdc_request(amount: u64) -> QuoteRequest {
        QuoteRequest {
            token_in: Asset::Token(base::USDC),
            token_out: Asset::Token(base::TOBY),
            amount_in: U256::from(amount),
            slippage_bps: Some(100),
        }
    }

    #[tokio::test]
    async fn test_quote_approve_execute() {
        let chain = FakeChain::new(8453)
            .with_fee_bps(100)
            .with_quote(&[base::USDC, base::TOBY], U256::from(1_000_000u64))
            .with_quote(&[base::USDC, base::WETH, base::TOBY], U256::from(50u64))
            .with_token_balance(base::USDC, owner(), U256::from(10_000_000u64))
            .with_native(owner(), U256::from(ETH));
        let sender = FakeSender::new(chain.clone(), owner());
        let service = service(&chain);

        let quote = service.quote(&usdc_request(1_000_000)).await.unwrap();
        assert_eq!(quote.selected.min_output, U256::from(990_000u64));
        assert_eq!(quote.fee_leg.min_output, U256::from(49u64));

        let blocked = service.preflight(owner(), &quote).await.unwrap_err();
        assert_eq!(blocked.error_code(), "approval_required");
        assert_eq!(service.allowance(owner(), base::USDC).await.unwrap(), U256::ZERO);

        service
            .approve(&sender, base::USDC, quote.amount_in)
            .await
            .unwrap();
        assert_eq!(service.allowance(owner(), base::USDC).await.unwrap(), U256::MAX);

        let mut tracker = SubmissionTracker::new();
        service.execute(&sender, &quote, &mut tracker).await.unwrap();
        assert_eq!(tracker.stage(), TxStage::Mined);

        let swap = sender.sent().pop().unwrap();
        let args = decode_swap_call(&swap.data, swap.value).unwrap();
        assert_eq!(args.token_in, Some(base::USDC));
        assert_eq!(args.path, vec![base::USDC, base::TOBY]);
        assert_eq!(args.fee_path, vec![base::USDC, base::WETH, base::TOBY]);
    }

    #[tokio::test]
    async fn test_balance_is_cached_until_refreshed() {
        let chain = FakeChain::new(8453).with_native(owner(), U256::from(5u64));
        let service = service(&chain);

        assert_eq!(service.balance(owner(), Asset::Native).await.unwrap(), U256::from(5u64));
        chain.set_native(owner(), U256::from(9u64));
        assert_eq!(service.balance(owner(), Asset::Native).await.unwrap(), U256::from(5u64));

        let refreshed = service.refresh_balances(owner(), &[Asset::Native]).await;
        assert_eq!(refreshed.len(), 1);
        assert_eq!(*refreshed[0].1.as_ref().unwrap(), U256::from(9u64));
    }

    #[tokio::test(start_paused = true)]
    async fn test_quote_latest_drops_superseded_edit() {
        let chain = FakeChain::new(8453)
            .with_fee_bps(0)
            .with_quote(&[base::USDC, base::TOBY], U256::from(42u64));
        let service = Arc::new(service(&chain));
        let session = QuoteSession::new(Duration::from_millis(300));
        let displayed = Arc::new(LatestValue::new());

        let first = {
            let (service, session, displayed) =
                (Arc::clone(&service), session.clone(), Arc::clone(&displayed));
            tokio::spawn(async move {
                service
                    .quote_latest(&session, &displayed, &usdc_request(1))
                    .await
                    .is_some()
            })
        };
        tokio::time::sleep(Duration::from_millis(100)).await;
        let second = service
            .quote_latest(&session, &displayed, &usdc_request(2))
            .await;

        assert!(!first.await.unwrap());
        let quote = second.unwrap().unwrap();
        assert_eq!(quote.amount_in, U256::from(2u64));
        assert_eq!(displayed.get().unwrap().amount_in, U256::from(2u64));
        // only the surviving edit reached the router
        assert_eq!(chain.quote_amounts(), vec![U256::from(2u64)]);
    }

    #[test]
    fn test_resolve_unknown_token() {
        let service = service(&FakeChain::new(8453));
        assert_eq!(service.resolve_token("toby").unwrap().decimals, 18);
        assert!(matches!(
            service.resolve_token("DOGE"),
            Err(SwapError::UnknownToken { .. })
        ));
    }
}
