//! Quote Selector
//!
//! Walks the candidate paths in priority order and accepts the first one the
//! router quotes above zero. Later candidates are not consulted once one
//! succeeds, so a longer path with a better price is never preferred over a
//! working shorter one. That trade-off is a known limitation of priority
//! routing.

use alloy_primitives::{Address, U256};
use base_client::ChainReader;
use tokio::time::Instant;
use toby_core::{AppConfig, Asset, SwapError, TokenRegistry};

use crate::calculator::{fee_amount, min_output, net_amount, sanitize_fee_bps, validate_slippage};
use crate::constants::fees::MAX_FEE_BPS;
use crate::path::{build_candidate_paths, build_fee_path, RoutePath};
use crate::state::{FeeLegQuote, QuoteAttempt, QuoteRequest, SelectedQuote, SwapQuote};

/// Result of walking the candidate list
#[derive(Debug, Clone)]
pub struct QuoteOutcome {
    pub attempts: Vec<QuoteAttempt>,
    /// Selected path and its raw output
    pub selected: Option<(RoutePath, U256)>,
}

impl QuoteOutcome {
    pub fn is_no_route(&self) -> bool {
        self.selected.is_none()
    }

    /// Attempt log, one line per candidate, stable for identical responses
    pub fn audit_log(&self) -> String {
        self.attempts
            .iter()
            .map(QuoteAttempt::describe)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Quote each candidate in order, stopping at the first positive output.
///
/// Failing candidates are recorded and skipped.
pub async fn select_quote(
    reader: &dyn ChainReader,
    router: Address,
    candidates: &[RoutePath],
    amount_in: U256,
) -> QuoteOutcome {
    let mut attempts = Vec::with_capacity(candidates.len());

    for path in candidates {
        let started = Instant::now();
        let result = reader.amounts_out(router, amount_in, path.hops()).await;
        let elapsed = started.elapsed();

        match result {
            Ok(amounts) => {
                let output = amounts.last().copied().unwrap_or_default();
                let success = output > U256::ZERO;
                attempts.push(QuoteAttempt {
                    path: path.clone(),
                    output_amount: output,
                    success,
                    elapsed,
                    error: None,
                });
                if success {
                    tracing::debug!(path = %path, output = %output, "quote candidate selected");
                    return QuoteOutcome {
                        attempts,
                        selected: Some((path.clone(), output)),
                    };
                }
            }
            Err(e) => {
                tracing::debug!(path = %path, error = %e, "quote candidate failed");
                attempts.push(QuoteAttempt {
                    path: path.clone(),
                    output_amount: U256::ZERO,
                    success: false,
                    elapsed,
                    error: Some(e.to_string()),
                });
            }
        }
    }

    QuoteOutcome {
        attempts,
        selected: None,
    }
}

/// Read and sanity-check the swap contract's fee, falling back to `fallback_bps`.
pub async fn read_fee_bps(
    reader: &dyn ChainReader,
    swapper: Option<Address>,
    fallback_bps: u64,
) -> u64 {
    let Some(swapper) = swapper else {
        return fallback_bps.min(MAX_FEE_BPS);
    };
    match reader.swap_fee_bps(swapper).await {
        Ok(raw) => sanitize_fee_bps(raw, fallback_bps),
        Err(e) => {
            tracing::warn!(%swapper, error = %e, fallback_bps, "feeBps read failed");
            fallback_bps.min(MAX_FEE_BPS)
        }
    }
}

/// Quote the fee amount's conversion into the burn token.
///
/// Never fails: a failed or zero quote leaves `min_output` at zero and keeps
/// the attempt for display.
pub async fn quote_fee_leg(
    reader: &dyn ChainReader,
    router: Address,
    path: RoutePath,
    fee: U256,
    slippage_bps: u64,
    force_zero: bool,
) -> FeeLegQuote {
    if fee.is_zero() || path.is_identity() {
        let quoted_output = if path.is_identity() { fee } else { U256::ZERO };
        return FeeLegQuote {
            path,
            fee_amount: fee,
            quoted_output,
            min_output: U256::ZERO,
            attempt: None,
        };
    }

    let outcome = select_quote(reader, router, std::slice::from_ref(&path), fee).await;
    match outcome.selected {
        Some((_, quoted)) => FeeLegQuote {
            min_output: min_output(quoted, slippage_bps, force_zero),
            path,
            fee_amount: fee,
            quoted_output: quoted,
            attempt: None,
        },
        None => {
            tracing::warn!(path = %path, "fee leg quote failed, using zero minimum");
            FeeLegQuote {
                path,
                fee_amount: fee,
                quoted_output: U256::ZERO,
                min_output: U256::ZERO,
                attempt: outcome.attempts.into_iter().next(),
            }
        }
    }
}

/// Human label for a pair, by symbol where known
pub fn pair_label(registry: &TokenRegistry, token_in: &Asset, token_out: &Asset) -> String {
    let label = |asset: &Asset| {
        registry
            .by_asset(asset)
            .map(|t| t.symbol.clone())
            .unwrap_or_else(|| asset.to_string())
    };
    format!("{}/{}", label(token_in), label(token_out))
}

/// Full quote: fee split, main leg selection and fee leg.
pub async fn quote_swap(
    reader: &dyn ChainReader,
    registry: &TokenRegistry,
    config: &AppConfig,
    request: &QuoteRequest,
) -> toby_core::Result<SwapQuote> {
    let token_out = match request.token_out {
        Asset::Token(addr) => addr,
        Asset::Native => {
            return Err(SwapError::UnsupportedPair {
                reason: "native ETH output is not supported, swap to WETH".to_string(),
            }
            .into())
        }
    };
    if registry.onchain(&request.token_in) == token_out {
        return Err(SwapError::UnsupportedPair {
            reason: "input and output token are the same".to_string(),
        }
        .into());
    }
    if request.amount_in.is_zero() {
        return Err(SwapError::InvalidAmount {
            message: "amount must be greater than zero".to_string(),
        }
        .into());
    }

    let slippage_bps = request
        .slippage_bps
        .unwrap_or(config.swap.default_slippage_bps);
    validate_slippage(slippage_bps, config.swap.max_slippage_bps)?;

    let fee_bps = read_fee_bps(reader, config.contracts.swapper, config.swap.fallback_fee_bps).await;
    let net = net_amount(request.amount_in, fee_bps);
    if net.is_zero() {
        return Err(SwapError::InvalidAmount {
            message: "amount is too small after the protocol fee".to_string(),
        }
        .into());
    }

    let router = config.contracts.router;
    let candidates = build_candidate_paths(registry, &request.token_in, token_out);
    let outcome = select_quote(reader, router, &candidates, net).await;

    let Some((path, raw_output)) = outcome.selected else {
        let pair = pair_label(registry, &request.token_in, &request.token_out);
        tracing::info!(%pair, attempts = outcome.attempts.len(), "no route found");
        return Err(SwapError::NoRouteFound { pair }.into());
    };

    let force_zero = config.swap.force_zero_min_output;
    let fee_leg = quote_fee_leg(
        reader,
        router,
        build_fee_path(registry, &request.token_in),
        fee_amount(request.amount_in, fee_bps),
        slippage_bps,
        force_zero,
    )
    .await;

    tracing::info!(
        path = %path,
        amount_in = %request.amount_in,
        output = %raw_output,
        fee_bps,
        "quote selected"
    );

    Ok(SwapQuote {
        token_in: request.token_in,
        token_out,
        amount_in: request.amount_in,
        fee_bps,
        net_amount: net,
        slippage_bps,
        selected: SelectedQuote {
            min_output: min_output(raw_output, slippage_bps, force_zero),
            path,
            raw_output,
        },
        fee_leg,
        attempts: outcome.attempts,
    })
}
