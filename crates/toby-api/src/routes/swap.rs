//! Quote, preflight and unsigned-build endpoints
//!
//! All three re-quote from the request body; nothing is kept between calls.

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use swap::QuoteRequest;
use toby_core::{parse_amount, SwapError};

use crate::dto::{
    failure, ApiFailure, BuildSwapResponse, PreflightResponse, QuoteApiRequest, QuoteResponse,
    SwapApiRequest,
};
use crate::AppState;

/// Create the swap router (mounted under /swap)
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/preflight", post(preflight))
        .route("/build", post(build))
}

/// Resolve tokens and scale the amount. Returns the output token's decimals too.
fn to_quote_request(
    state: &AppState,
    req: &QuoteApiRequest,
) -> Result<(QuoteRequest, u8), toby_core::Error> {
    let service = state.service();
    let token_in = service.resolve_token(&req.token_in)?;
    let token_out = service.resolve_token(&req.token_out)?;
    let amount_in = parse_amount(&req.amount, token_in.decimals)
        .map_err(|message| SwapError::InvalidAmount { message })?;
    let request = QuoteRequest {
        token_in: token_in.asset,
        token_out: token_out.asset,
        amount_in,
        slippage_bps: req.slippage_bps,
    };
    Ok((request, token_out.decimals))
}

async fn fresh_quote(
    state: &AppState,
    req: &QuoteApiRequest,
) -> Result<(swap::SwapQuote, u8), ApiFailure> {
    let (request, out_decimals) = to_quote_request(state, req).map_err(|e| failure(&e))?;
    let quote = state
        .service()
        .quote(&request)
        .await
        .map_err(|e| failure(&e))?;
    Ok((quote, out_decimals))
}

/// POST /quote
pub async fn quote(
    State(state): State<AppState>,
    Json(req): Json<QuoteApiRequest>,
) -> Result<Json<QuoteResponse>, ApiFailure> {
    let (quote, out_decimals) = fresh_quote(&state, &req).await?;
    Ok(Json(QuoteResponse::from_quote(&quote, out_decimals)))
}

/// POST /swap/preflight
pub async fn preflight(
    State(state): State<AppState>,
    Json(req): Json<SwapApiRequest>,
) -> Result<Json<PreflightResponse>, ApiFailure> {
    let (quote, _) = fresh_quote(&state, &req.quote).await?;
    let result = state
        .service()
        .preflight(req.owner, &quote)
        .await
        .map_err(|e| failure(&e))?;
    Ok(Json(result.into()))
}

/// POST /swap/build - unsigned call for an external wallet
pub async fn build(
    State(state): State<AppState>,
    Json(req): Json<SwapApiRequest>,
) -> Result<Json<BuildSwapResponse>, ApiFailure> {
    let (quote, out_decimals) = fresh_quote(&state, &req.quote).await?;
    let built = state
        .service()
        .build_swap(req.owner, &quote)
        .map_err(|e| failure(&e))?;

    tracing::debug!(
        owner = %req.owner,
        entry_point = %built.summary.entry_point,
        "built unsigned swap call"
    );

    Ok(Json(BuildSwapResponse {
        from: built.call.from,
        to: built.call.to,
        data: built.call.data,
        value: built.call.value,
        chain_id: state.config().chain.chain.id(),
        summary: built.summary,
        quote: QuoteResponse::from_quote(&quote, out_decimals),
    }))
}
