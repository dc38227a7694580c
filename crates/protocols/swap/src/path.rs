//! Path Builder
//!
//! Produces the candidate router paths for a pair, highest priority first,
//! and the fee-conversion path toward the burn token. Both are pure
//! functions of the registry and their arguments.

use std::collections::HashSet;
use std::fmt;

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use toby_core::{Asset, TokenRegistry};

/// Ordered router path. At least two hops, no adjacent repeats, except the
/// identity fee path built by [`RoutePath::identity`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "Vec<Address>", try_from = "Vec<Address>")]
pub struct RoutePath(Vec<Address>);

impl TryFrom<Vec<Address>> for RoutePath {
    type Error = String;

    fn try_from(hops: Vec<Address>) -> Result<Self, Self::Error> {
        match hops.as_slice() {
            [a, b] if a == b => Ok(Self::identity(*a)),
            _ => Self::new(hops).ok_or_else(|| {
                "route path needs at least two hops and no adjacent repeats".to_string()
            }),
        }
    }
}

impl From<RoutePath> for Vec<Address> {
    fn from(path: RoutePath) -> Self {
        path.0
    }
}

impl RoutePath {
    /// Validate and wrap a hop list
    pub fn new(hops: Vec<Address>) -> Option<Self> {
        if hops.len() < 2 || hops.windows(2).any(|w| w[0] == w[1]) {
            return None;
        }
        Some(Self(hops))
    }

    /// Degenerate `[token, token]` path: no conversion needed
    pub fn identity(token: Address) -> Self {
        Self(vec![token, token])
    }

    pub fn hops(&self) -> &[Address] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn first(&self) -> Address {
        self.0[0]
    }

    pub fn last(&self) -> Address {
        self.0[self.0.len() - 1]
    }

    pub fn is_identity(&self) -> bool {
        self.0.len() == 2 && self.0[0] == self.0[1]
    }

    pub fn into_vec(self) -> Vec<Address> {
        self.0
    }
}

impl fmt::Display for RoutePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hops: Vec<String> = self.0.iter().map(|a| a.to_string()).collect();
        write!(f, "{}", hops.join(" -> "))
    }
}

/// Candidate paths for `token_in -> token_out` in priority order:
/// direct, via wrapped native, via stable, then both two-hub orders.
///
/// Native input is routed from the wrapped native token. Duplicates and
/// paths with adjacent repeated hops are dropped, keeping relative order.
pub fn build_candidate_paths(
    registry: &TokenRegistry,
    token_in: &Asset,
    token_out: Address,
) -> Vec<RoutePath> {
    let input = registry.onchain(token_in);
    let hub = registry.wrapped_native;
    let stable = registry.stable;

    let raw = [
        vec![input, token_out],
        vec![input, hub, token_out],
        vec![input, stable, token_out],
        vec![input, hub, stable, token_out],
        vec![input, stable, hub, token_out],
    ];

    let mut seen = HashSet::new();
    raw.into_iter()
        .filter_map(RoutePath::new)
        .filter(|path| seen.insert(path.clone()))
        .collect()
}

/// Path that converts the protocol fee into the burn token.
pub fn build_fee_path(registry: &TokenRegistry, token_in: &Asset) -> RoutePath {
    let input = registry.onchain(token_in);
    let hub = registry.wrapped_native;
    let burn = registry.burn_token;

    if input == burn {
        RoutePath::identity(burn)
    } else if input == hub {
        RoutePath(vec![hub, burn])
    } else {
        RoutePath(vec![input, hub, burn])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use toby_core::registry::base;

    fn registry() -> TokenRegistry {
        TokenRegistry::base_mainnet()
    }

    fn assert_valid(paths: &[RoutePath]) {
        let mut seen = HashSet::new();
        for path in paths {
            assert!(path.len() >= 2, "short path {}", path);
            assert!(
                path.hops().windows(2).all(|w| w[0] != w[1]),
                "adjacent repeat in {}",
                path
            );
            let lowered = path.to_string().to_lowercase();
            assert!(seen.insert(lowered), "duplicate path {}", path);
        }
    }

    #[test]
    fn test_candidate_order_for_unrelated_tokens() {
        let other = Address::repeat_byte(0x42);
        let paths = build_candidate_paths(&registry(), &Asset::Token(base::CBBTC), other);
        let expected = vec![
            vec![base::CBBTC, other],
            vec![base::CBBTC, base::WETH, other],
            vec![base::CBBTC, base::USDC, other],
            vec![base::CBBTC, base::WETH, base::USDC, other],
            vec![base::CBBTC, base::USDC, base::WETH, other],
        ];
        let got: Vec<Vec<Address>> = paths.into_iter().map(RoutePath::into_vec).collect();
        assert_eq!(got, expected);
    }

    #[test]
    fn test_native_input_uses_wrapped_hub() {
        let paths = build_candidate_paths(&registry(), &Asset::Native, base::TOBY);
        assert_eq!(paths[0].hops(), &[base::WETH, base::TOBY]);
        // [WETH, WETH, TOBY] and [WETH, WETH, USDC, TOBY] collapse away
        assert_eq!(paths.len(), 3);
        assert_eq!(paths[1].hops(), &[base::WETH, base::USDC, base::TOBY]);
        assert_eq!(paths[2].hops(), &[base::WETH, base::USDC, base::WETH, base::TOBY]);
        assert_valid(&paths);
    }

    #[test]
    fn test_stable_input_drops_stable_hops() {
        let paths = build_candidate_paths(&registry(), &Asset::Token(base::USDC), base::CBBTC);
        let got: Vec<Vec<Address>> = paths.into_iter().map(RoutePath::into_vec).collect();
        assert_eq!(
            got,
            vec![
                vec![base::USDC, base::CBBTC],
                vec![base::USDC, base::WETH, base::CBBTC],
                vec![base::USDC, base::WETH, base::USDC, base::CBBTC],
            ]
        );
    }

    #[test]
    fn test_paths_valid_for_all_registry_pairs() {
        let registry = registry();
        for a in registry.tokens() {
            for b in registry.tokens() {
                let Some(out) = b.asset.token_address() else {
                    continue;
                };
                assert_valid(&build_candidate_paths(&registry, &a.asset, out));
            }
        }
    }

    #[test]
    fn test_fee_path_rules() {
        let registry = registry();
        assert_eq!(
            build_fee_path(&registry, &Asset::Native).hops(),
            &[base::WETH, base::TOBY]
        );
        assert_eq!(
            build_fee_path(&registry, &Asset::Token(base::WETH)).hops(),
            &[base::WETH, base::TOBY]
        );
        assert_eq!(
            build_fee_path(&registry, &Asset::Token(base::USDC)).hops(),
            &[base::USDC, base::WETH, base::TOBY]
        );
    }

    #[test]
    fn test_fee_path_is_pure_and_identity_for_burn_token() {
        let registry = registry();
        let burn = Asset::Token(base::TOBY);
        let first = build_fee_path(&registry, &burn);
        let second = build_fee_path(&registry, &burn);
        assert_eq!(first, second);
        assert!(first.is_identity());
        assert_eq!(first.first(), base::TOBY);
        assert_eq!(first.last(), base::TOBY);
        assert!(RoutePath::new(vec![base::TOBY, base::TOBY]).is_none());
    }

    #[test]
    fn test_route_path_rejects_short() {
        assert!(RoutePath::new(vec![base::WETH]).is_none());
        assert!(RoutePath::new(vec![base::WETH, base::USDC]).is_some());
    }

    #[test]
    fn test_route_path_deserialize_keeps_invariant() {
        let parse = |hops: &[Address]| serde_json::from_value::<RoutePath>(serde_json::json!(hops));

        assert!(parse(&[]).is_err());
        assert!(parse(&[base::WETH]).is_err());
        assert!(parse(&[base::WETH, base::USDC, base::USDC]).is_err());

        let path = parse(&[base::WETH, base::USDC, base::TOBY]).unwrap();
        assert_eq!(path.first(), base::WETH);
        assert_eq!(path.last(), base::TOBY);
        assert!(parse(&[base::TOBY, base::TOBY]).unwrap().is_identity());

        let json = serde_json::to_value(&path).unwrap();
        assert_eq!(json.as_array().unwrap().len(), 3);
    }
}
