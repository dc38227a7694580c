//! Configuration types for Toby Swapper

use std::path::Path;

use alloy_primitives::{address, Address};
use serde::{Deserialize, Serialize};

use crate::registry::TokenRegistry;
use crate::types::{Chain, TokenDescriptor};
use crate::Error;

/// Uniswap V2 Router02 on Base
pub const BASE_V2_ROUTER: Address = address!("4752ba5DBc23f44D87826276BF6Fd6b1C372aD24");

/// RPC connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainConfig {
    /// JSON-RPC URL (e.g., "https://mainnet.base.org")
    pub rpc_url: String,

    /// Expected chain
    pub chain: Chain,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_request_timeout_secs() -> u64 {
    20
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            rpc_url: "https://mainnet.base.org".to_string(),
            chain: Chain::Base,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// External contract addresses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractsConfig {
    /// Router used for `getAmountsOut` quotes
    pub router: Address,

    /// Swap contract (fee + burn wrapper around the router)
    #[serde(default)]
    pub swapper: Option<Address>,
}

impl Default for ContractsConfig {
    fn default() -> Self {
        Self {
            router: BASE_V2_ROUTER,
            swapper: None,
        }
    }
}

/// Swap behaviour settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwapConfig {
    /// Default slippage tolerance in basis points (100 = 1%)
    #[serde(default = "default_slippage_bps")]
    pub default_slippage_bps: u64,

    /// Largest slippage a caller may request
    #[serde(default = "default_max_slippage_bps")]
    pub max_slippage_bps: u64,

    /// Seconds from now until the swap deadline
    #[serde(default = "default_deadline_secs")]
    pub deadline_secs: u64,

    /// Submit with a zero minimum output. Unsafe: disables slippage protection.
    #[serde(default)]
    pub force_zero_min_output: bool,

    /// Fee used when the contract's fee cannot be read or is out of range
    #[serde(default = "default_fallback_fee_bps")]
    pub fallback_fee_bps: u64,

    /// Debounce window for amount changes
    #[serde(default = "default_quote_debounce_ms")]
    pub quote_debounce_ms: u64,
}

fn default_slippage_bps() -> u64 {
    100
}

fn default_max_slippage_bps() -> u64 {
    5_000
}

fn default_deadline_secs() -> u64 {
    600
}

fn default_fallback_fee_bps() -> u64 {
    100
}

fn default_quote_debounce_ms() -> u64 {
    300
}

impl Default for SwapConfig {
    fn default() -> Self {
        Self {
            default_slippage_bps: default_slippage_bps(),
            max_slippage_bps: default_max_slippage_bps(),
            deadline_secs: default_deadline_secs(),
            force_zero_min_output: false,
            fallback_fee_bps: default_fallback_fee_bps(),
            quote_debounce_ms: default_quote_debounce_ms(),
        }
    }
}

/// Background refresh intervals
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingConfig {
    #[serde(default = "default_balance_interval_secs")]
    pub balance_interval_secs: u64,

    #[serde(default = "default_burn_interval_secs")]
    pub burn_interval_secs: u64,
}

fn default_balance_interval_secs() -> u64 {
    15
}

fn default_burn_interval_secs() -> u64 {
    20
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            balance_interval_secs: default_balance_interval_secs(),
            burn_interval_secs: default_burn_interval_secs(),
        }
    }
}

/// One HTTP JSON source for an auxiliary value
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpSourceConfig {
    /// Display name used in logs
    pub name: String,
    /// URL with a `{token}` placeholder for the token address
    pub url_template: String,
    /// JSON pointer to the value in the response (e.g. "/data/price")
    pub json_pointer: String,
}

/// Auxiliary market data sources and cache lifetimes
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarketConfig {
    /// Price sources, tried in order
    #[serde(default)]
    pub price_sources: Vec<HttpSourceConfig>,

    /// Holder-count sources, tried in order
    #[serde(default)]
    pub holder_sources: Vec<HttpSourceConfig>,

    #[serde(default)]
    pub cache: MarketCacheConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketCacheConfig {
    #[serde(default = "default_price_ttl_secs")]
    pub price_ttl_secs: u64,
    #[serde(default = "default_holders_ttl_secs")]
    pub holders_ttl_secs: u64,
    #[serde(default = "default_burn_total_ttl_secs")]
    pub burn_total_ttl_secs: u64,
}

fn default_price_ttl_secs() -> u64 {
    60
}

fn default_holders_ttl_secs() -> u64 {
    6 * 60 * 60
}

fn default_burn_total_ttl_secs() -> u64 {
    5 * 60
}

impl Default for MarketCacheConfig {
    fn default() -> Self {
        Self {
            price_ttl_secs: default_price_ttl_secs(),
            holders_ttl_secs: default_holders_ttl_secs(),
            burn_total_ttl_secs: default_burn_total_ttl_secs(),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// RPC settings
    #[serde(default)]
    pub chain: ChainConfig,

    #[serde(default)]
    pub contracts: ContractsConfig,

    #[serde(default)]
    pub swap: SwapConfig,

    #[serde(default)]
    pub polling: PollingConfig,

    #[serde(default)]
    pub market: MarketConfig,

    /// Tokens added to the default registry
    #[serde(default)]
    pub extra_tokens: Vec<TokenDescriptor>,

    /// Public base URL used in share links
    #[serde(default = "default_app_url")]
    pub app_url: String,

    /// API server port
    #[serde(default = "default_api_port")]
    pub api_port: u16,
}

fn default_api_port() -> u16 {
    18453
}

fn default_app_url() -> String {
    "https://tobyswapper.xyz".to_string()
}

impl AppConfig {
    /// Load from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {}", path.display(), e)))?;
        serde_json::from_str(&raw)
            .map_err(|e| Error::Config(format!("invalid config {}: {}", path.display(), e)))
    }

    /// Reject inconsistent settings
    pub fn validate(&self) -> Result<(), Error> {
        if self.chain.rpc_url.trim().is_empty() {
            return Err(Error::Config("chain.rpc_url is empty".to_string()));
        }
        if self.swap.max_slippage_bps > crate::types::constants::BPS_DENOMINATOR {
            return Err(Error::Config(
                "swap.max_slippage_bps exceeds 10000".to_string(),
            ));
        }
        if self.swap.default_slippage_bps > self.swap.max_slippage_bps {
            return Err(Error::Config(format!(
                "swap.default_slippage_bps ({}) exceeds max_slippage_bps ({})",
                self.swap.default_slippage_bps, self.swap.max_slippage_bps
            )));
        }
        if self.swap.deadline_secs == 0 {
            return Err(Error::Config("swap.deadline_secs must be > 0".to_string()));
        }
        if self.swap.force_zero_min_output {
            tracing::warn!("force_zero_min_output is enabled: swaps have no slippage protection");
        }
        Ok(())
    }

    /// Token registry with any configured extras
    pub fn registry(&self) -> TokenRegistry {
        TokenRegistry::base_mainnet().with_extra(self.extra_tokens.iter().cloned())
    }
}
