//! Data Transfer Objects for API requests and responses

use alloy_primitives::{Address, Bytes, U256};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use swap::{PreflightResult, QuoteAttempt, SwapQuote, SwapTxSummary};
use toby_core::{format_amount, Asset, TokenDescriptor};

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub chain: String,
    pub expected_chain_id: u64,
    /// `None` when the RPC did not answer within the soft timeout
    pub rpc_online: Option<bool>,
    pub chain_id: Option<u64>,
    pub swapper_configured: bool,
}

/// Token list entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenDto {
    pub symbol: String,
    pub address: Asset,
    pub decimals: u8,
    pub is_native: bool,
    pub is_burn_token: bool,
}

impl TokenDto {
    pub fn from_descriptor(token: &TokenDescriptor, burn_token: Address) -> Self {
        Self {
            symbol: token.symbol.clone(),
            address: token.asset,
            decimals: token.decimals,
            is_native: token.asset.is_native(),
            is_burn_token: token.asset.token_address() == Some(burn_token),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokensResponse {
    pub tokens: Vec<TokenDto>,
    pub count: usize,
}

/// Quote request: tokens by symbol or address, amount in human units
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteApiRequest {
    pub token_in: String,
    pub token_out: String,
    pub amount: String,
    #[serde(default)]
    pub slippage_bps: Option<u64>,
}

/// Preflight or build request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwapApiRequest {
    pub owner: Address,
    #[serde(flatten)]
    pub quote: QuoteApiRequest,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptDto {
    pub path: Vec<Address>,
    pub output_amount: U256,
    pub success: bool,
    pub elapsed_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&QuoteAttempt> for AttemptDto {
    fn from(a: &QuoteAttempt) -> Self {
        Self {
            path: a.path.hops().to_vec(),
            output_amount: a.output_amount,
            success: a.success,
            elapsed_ms: a.elapsed.as_millis() as u64,
            error: a.error.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteResponse {
    pub token_in: Asset,
    pub token_out: Address,
    pub amount_in: U256,
    pub fee_bps: u64,
    pub net_amount: U256,
    pub slippage_bps: u64,
    pub path: Vec<Address>,
    pub raw_output: U256,
    pub min_output: U256,
    /// Human output, truncated to 6 decimals
    pub output_formatted: String,
    pub min_output_formatted: String,
    pub fee_path: Vec<Address>,
    pub fee_amount: U256,
    pub fee_min_output: U256,
    pub attempts: Vec<AttemptDto>,
}

impl QuoteResponse {
    pub fn from_quote(quote: &SwapQuote, out_decimals: u8) -> Self {
        Self {
            token_in: quote.token_in,
            token_out: quote.token_out,
            amount_in: quote.amount_in,
            fee_bps: quote.fee_bps,
            net_amount: quote.net_amount,
            slippage_bps: quote.slippage_bps,
            path: quote.selected.path.hops().to_vec(),
            raw_output: quote.selected.raw_output,
            min_output: quote.selected.min_output,
            output_formatted: format_amount(quote.selected.raw_output, out_decimals, 6),
            min_output_formatted: format_amount(quote.selected.min_output, out_decimals, 6),
            fee_path: quote.fee_leg.path.hops().to_vec(),
            fee_amount: quote.fee_leg.fee_amount,
            fee_min_output: quote.fee_leg.min_output,
            attempts: quote.attempts.iter().map(AttemptDto::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreflightResponse {
    pub sufficient: bool,
    pub required_native: U256,
    pub available_native: U256,
    pub required_formatted: String,
    pub available_formatted: String,
    pub gas_estimate: u64,
    pub gas_price: u128,
}

impl From<PreflightResult> for PreflightResponse {
    fn from(r: PreflightResult) -> Self {
        Self {
            sufficient: r.sufficient,
            required_native: r.required_native,
            available_native: r.available_native,
            required_formatted: format_amount(r.required_native, 18, 6),
            available_formatted: format_amount(r.available_native, 18, 6),
            gas_estimate: r.gas_estimate,
            gas_price: r.gas_price,
        }
    }
}

/// Unsigned call for an external wallet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildSwapResponse {
    pub from: Address,
    pub to: Address,
    pub data: Bytes,
    pub value: U256,
    pub chain_id: u64,
    pub summary: SwapTxSummary,
    pub quote: QuoteResponse,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BurnTotalResponse {
    pub token: Address,
    /// `None` when the total could not be read and nothing is cached
    pub raw: Option<U256>,
    pub formatted: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceResponse {
    pub token: Address,
    pub price_usd: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HoldersResponse {
    pub token: Address,
    pub holders: Option<u64>,
}

/// Share query: describe a swap, or omit everything to share the burn total
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShareQuery {
    pub amount_in: Option<String>,
    pub symbol_in: Option<String>,
    pub amount_out: Option<String>,
    pub symbol_out: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareResponse {
    pub text: String,
    pub x_url: Option<String>,
    pub warpcast_url: Option<String>,
}

/// Generic API error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new("bad_request", message)
    }
}

/// Error half of every handler result
pub type ApiFailure = (StatusCode, Json<ApiError>);

/// Map a domain error to its status and `{ code, message }` body
pub fn failure(err: &toby_core::Error) -> ApiFailure {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if status.is_server_error() {
        tracing::warn!(code = err.error_code(), error = %err, "request failed");
    }
    (status, Json(ApiError::new(err.error_code(), err.to_string())))
}
