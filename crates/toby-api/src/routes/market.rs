//! Price and holder-count endpoints

use alloy_primitives::Address;
use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};

use crate::dto::{failure, ApiFailure, HoldersResponse, PriceResponse};
use crate::AppState;

/// Create the market router (mounted under /market)
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/price/:token", get(price))
        .route("/holders/:token", get(holders))
}

/// Registry symbol, native alias or raw address. Native maps to wrapped.
fn token_address(state: &AppState, reference: &str) -> Result<Address, ApiFailure> {
    let registry = state.service().registry();
    if let Some(token) = registry.resolve(reference) {
        return Ok(registry.onchain(&token.asset));
    }
    reference.parse::<Address>().map_err(|_| {
        failure(
            &toby_core::SwapError::UnknownToken {
                reference: reference.to_string(),
            }
            .into(),
        )
    })
}

/// GET /market/price/:token - zero when unknown
pub async fn price(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<PriceResponse>, ApiFailure> {
    let token = token_address(&state, &token)?;
    let price_usd = state.market().price_usd(token).await;
    Ok(Json(PriceResponse { token, price_usd }))
}

/// GET /market/holders/:token - null when unknown
pub async fn holders(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<HoldersResponse>, ApiFailure> {
    let token = token_address(&state, &token)?;
    let holders = state.market().holder_count(token).await;
    Ok(Json(HoldersResponse { token, holders }))
}
