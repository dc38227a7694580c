//! market-data: auxiliary read-through data for the swap front end
//!
//! Token price and holder count come from ordered provider chains and fall
//! back to neutral defaults (zero price, unknown holders). The burn total is
//! read from the swap contract. All three are cached in-process and may be
//! served stale when their sources are down.

pub mod burn;
pub mod http;
pub mod provider;
pub mod share;

use std::time::Duration;

use alloy_primitives::Address;
use base_client::ChainReader;
use toby_core::{Cached, MarketConfig, TtlCache};

pub use burn::{read_burn_total, BurnTotal};
pub use http::{build_client, JsonHttpProvider};
pub use provider::{FallbackChain, ProviderError, ValueProvider};

/// Per-provider wait before moving on to the next one
pub const PROVIDER_TIMEOUT: Duration = Duration::from_secs(5);

/// Cached price, holder and burn lookups
pub struct MarketData {
    prices: FallbackChain<f64>,
    holders: FallbackChain<u64>,
    price_cache: TtlCache<Address, f64>,
    holder_cache: TtlCache<Address, u64>,
    burn_cache: TtlCache<Address, BurnTotal>,
}

impl MarketData {
    pub fn new(prices: FallbackChain<f64>, holders: FallbackChain<u64>, config: &MarketConfig) -> Self {
        let ttl = &config.cache;
        Self::with_ttls(
            prices,
            holders,
            [ttl.price_ttl_secs, ttl.holders_ttl_secs, ttl.burn_total_ttl_secs].map(Duration::from_secs),
        )
    }

    /// Price, holder and burn TTLs in that order
    fn with_ttls(prices: FallbackChain<f64>, holders: FallbackChain<u64>, ttls: [Duration; 3]) -> Self {
        let [price_ttl, holders_ttl, burn_ttl] = ttls;
        Self {
            prices,
            holders,
            price_cache: TtlCache::with_last_known(price_ttl),
            holder_cache: TtlCache::with_last_known(holders_ttl),
            burn_cache: TtlCache::with_last_known(burn_ttl),
        }
    }

    /// Build HTTP provider chains from config
    pub fn from_config(config: &MarketConfig) -> Result<Self, ProviderError> {
        let client = build_client()?;
        let mut prices = FallbackChain::new(PROVIDER_TIMEOUT);
        for source in &config.price_sources {
            prices.push(Box::new(JsonHttpProvider::new(source.clone(), client.clone())));
        }
        let mut holders = FallbackChain::new(PROVIDER_TIMEOUT);
        for source in &config.holder_sources {
            holders.push(Box::new(JsonHttpProvider::new(source.clone(), client.clone())));
        }
        tracing::info!(
            price_sources = prices.len(),
            holder_sources = holders.len(),
            "market data providers configured"
        );
        Ok(Self::new(prices, holders, config))
    }

    /// USD price, zero when no provider knows it
    pub async fn price_usd(&self, token: Address) -> f64 {
        match self.price_cache.lookup(&token) {
            Cached::Fresh(price) => price,
            cached => match self.prices.first_value(token).await {
                Some(price) => {
                    self.price_cache.insert(token, price);
                    price
                }
                None => match cached {
                    Cached::Stale(price) => price,
                    _ => 0.0,
                },
            },
        }
    }

    /// Holder count, `None` when no provider knows it
    pub async fn holder_count(&self, token: Address) -> Option<u64> {
        match self.holder_cache.lookup(&token) {
            Cached::Fresh(count) => Some(count),
            cached => match self.holders.first_value(token).await {
                Some(count) => {
                    self.holder_cache.insert(token, count);
                    Some(count)
                }
                None => match cached {
                    Cached::Stale(count) => Some(count),
                    _ => None,
                },
            },
        }
    }

    /// Burn total for `swapper`, stale or `None` if the chain read fails
    pub async fn burn_total(
        &self,
        reader: &dyn ChainReader,
        swapper: Address,
        burn_token: Address,
    ) -> Option<BurnTotal> {
        let cached = self.burn_cache.lookup(&swapper);
        if let Cached::Fresh(total) = cached {
            return Some(total);
        }
        self.refresh_burn_total(reader, swapper, burn_token)
            .await
            .or(match cached {
                Cached::Stale(total) => Some(total),
                _ => None,
            })
    }

    /// Read the burn total now and store it
    pub async fn refresh_burn_total(
        &self,
        reader: &dyn ChainReader,
        swapper: Address,
        burn_token: Address,
    ) -> Option<BurnTotal> {
        match read_burn_total(reader, swapper, burn_token).await {
            Ok(total) => {
                self.burn_cache.insert(swapper, total.clone());
                Some(total)
            }
            Err(e) => {
                tracing::warn!(%swapper, error = %e, "burn total read failed");
                None
            }
        }
    }
}
