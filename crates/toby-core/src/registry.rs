//! Static token registry for a single chain
//!
//! Built once at startup and shared by reference. Holds the two hub tokens
//! used for routing (wrapped native and a stable) and the burn token that
//! protocol fees are converted into.

use alloy_primitives::{address, Address};
use serde::{Deserialize, Serialize};

use crate::types::{constants::NATIVE_DECIMALS, Asset, TokenDescriptor};

/// Base mainnet token addresses
pub mod base {
    use super::*;

    pub const WETH: Address = address!("4200000000000000000000000000000000000006");
    pub const USDC: Address = address!("833589fCD6eDb6E08f4c7C32D4f71b54bdA02913");
    pub const TOBY: Address = address!("b8D98a102b0079B69FFbc760C8d857A31653e56e");
    pub const CBBTC: Address = address!("cbB7C0000aB88B473b1f5aFd9ef808440eed33Bf");
}

/// Token registry keyed by symbol
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenRegistry {
    tokens: Vec<TokenDescriptor>,
    /// Wrapped native token (primary routing hub)
    pub wrapped_native: Address,
    /// Stable token (secondary routing hub)
    pub stable: Address,
    /// Token that collected fees are converted into and burned
    pub burn_token: Address,
}

impl TokenRegistry {
    pub fn new(
        tokens: Vec<TokenDescriptor>,
        wrapped_native: Address,
        stable: Address,
        burn_token: Address,
    ) -> Self {
        Self {
            tokens,
            wrapped_native,
            stable,
            burn_token,
        }
    }

    /// Default Base mainnet registry
    pub fn base_mainnet() -> Self {
        Self::new(
            vec![
                TokenDescriptor::new("ETH", Asset::Native, NATIVE_DECIMALS),
                TokenDescriptor::new("WETH", Asset::Token(base::WETH), 18),
                TokenDescriptor::new("USDC", Asset::Token(base::USDC), 6),
                TokenDescriptor::new("TOBY", Asset::Token(base::TOBY), 18),
                TokenDescriptor::new("cbBTC", Asset::Token(base::CBBTC), 8),
            ],
            base::WETH,
            base::USDC,
            base::TOBY,
        )
    }

    /// Add extra tokens (e.g. from config). Existing symbols are kept.
    pub fn with_extra(mut self, extra: impl IntoIterator<Item = TokenDescriptor>) -> Self {
        for token in extra {
            if self.by_symbol(&token.symbol).is_none() && self.by_asset(&token.asset).is_none() {
                self.tokens.push(token);
            }
        }
        self
    }

    pub fn tokens(&self) -> &[TokenDescriptor] {
        &self.tokens
    }

    /// Case-insensitive symbol lookup
    pub fn by_symbol(&self, symbol: &str) -> Option<&TokenDescriptor> {
        self.tokens
            .iter()
            .find(|t| t.symbol.eq_ignore_ascii_case(symbol))
    }

    pub fn by_asset(&self, asset: &Asset) -> Option<&TokenDescriptor> {
        self.tokens.iter().find(|t| &t.asset == asset)
    }

    pub fn by_address(&self, address: Address) -> Option<&TokenDescriptor> {
        self.by_asset(&Asset::Token(address))
    }

    /// Resolve a user-supplied token reference: symbol, address, or native alias.
    pub fn resolve(&self, reference: &str) -> Option<&TokenDescriptor> {
        if let Some(t) = self.by_symbol(reference) {
            return Some(t);
        }
        let asset: Asset = reference.parse().ok()?;
        self.by_asset(&asset)
    }

    pub fn burn_descriptor(&self) -> Option<&TokenDescriptor> {
        self.by_address(self.burn_token)
    }

    /// On-chain address of an asset (native mapped to wrapped native)
    pub fn onchain(&self, asset: &Asset) -> Address {
        asset.onchain_address(self.wrapped_native)
    }
}

impl Default for TokenRegistry {
    fn default() -> Self {
        Self::base_mainnet()
    }
}
