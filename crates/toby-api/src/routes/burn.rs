//! Burn total endpoint

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use toby_core::TxError;

use crate::dto::{failure, ApiFailure, BurnTotalResponse};
use crate::AppState;

/// Create the burn router (mounted under /burn)
pub fn router() -> Router<AppState> {
    Router::new().route("/total", get(burn_total))
}

/// GET /burn/total - cached, may be stale or null
pub async fn burn_total(
    State(state): State<AppState>,
) -> Result<Json<BurnTotalResponse>, ApiFailure> {
    let swapper = state
        .config()
        .contracts
        .swapper
        .ok_or_else(|| failure(&TxError::SwapperNotConfigured.into()))?;
    let burn_token = state.service().registry().burn_token;

    let total = state
        .market()
        .burn_total(state.reader(), swapper, burn_token)
        .await;

    Ok(Json(BurnTotalResponse {
        token: burn_token,
        raw: total.as_ref().map(|t| t.raw),
        formatted: total.map(|t| t.formatted),
    }))
}

#[cfg(test)]
mod tests {
    use alloy_primitives::{address, U256};
    use axum::http::StatusCode;
    use base_client::testing::FakeChain;
    use toby_core::AppConfig;

    use crate::routes::test_support::{app, get};

    fn config() -> AppConfig {
        let mut config = AppConfig::default();
        config.contracts.swapper = Some(address!("5555555555555555555555555555555555555555"));
        config
    }

    #[tokio::test]
    async fn test_burn_total_scaled_by_decimals() {
        let burned = U256::from(1_234_567_890_000_000_000_000u128);
        let chain = FakeChain::new(8453).with_total_burned(burned);
        let (status, body) = get(app(chain, config()), "/burn/total").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["formatted"], "1234.56");
    }

    #[tokio::test]
    async fn test_burn_total_null_when_unreadable() {
        let chain = FakeChain::new(8453).offline();
        let (status, body) = get(app(chain, config()), "/burn/total").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["raw"].is_null());
        assert!(body["formatted"].is_null());
    }

    #[tokio::test]
    async fn test_burn_total_without_swapper() {
        let (status, _) = get(app(FakeChain::new(8453), AppConfig::default()), "/burn/total").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }
}
