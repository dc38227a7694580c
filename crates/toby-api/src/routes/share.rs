//! Share text and intent links

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use market_data::share::{burn_share_text, swap_share_text, warpcast_intent_url, x_intent_url};

use crate::dto::{failure, ApiError, ApiFailure, ShareQuery, ShareResponse};
use crate::AppState;

/// GET /share - swap text when all four swap fields are given, burn text otherwise
pub async fn share(
    State(state): State<AppState>,
    Query(query): Query<ShareQuery>,
) -> Result<Json<ShareResponse>, ApiFailure> {
    let text = match (
        &query.amount_in,
        &query.symbol_in,
        &query.amount_out,
        &query.symbol_out,
    ) {
        (Some(a_in), Some(s_in), Some(a_out), Some(s_out)) => {
            swap_share_text(a_in, s_in, a_out, s_out)
        }
        (None, None, None, None) => {
            let swapper = state
                .config()
                .contracts
                .swapper
                .ok_or_else(|| failure(&toby_core::TxError::SwapperNotConfigured.into()))?;
            let burn_token = state.service().registry().burn_token;
            let total = state
                .market()
                .burn_total(state.reader(), swapper, burn_token)
                .await
                .ok_or_else(|| {
                    (
                        StatusCode::SERVICE_UNAVAILABLE,
                        Json(ApiError::new("burn_total_unavailable", "burn total is unavailable")),
                    )
                })?;
            burn_share_text(&total.formatted)
        }
        _ => {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(ApiError::bad_request(
                    "amount_in, symbol_in, amount_out and symbol_out must be given together",
                )),
            ))
        }
    };

    let link = &state.config().app_url;
    Ok(Json(ShareResponse {
        x_url: x_intent_url(&text, link),
        warpcast_url: warpcast_intent_url(&text, link),
        text,
    }))
}

#[cfg(test)]
mod tests {
    use alloy_primitives::{address, U256};
    use axum::http::StatusCode;
    use base_client::testing::FakeChain;
    use toby_core::AppConfig;

    use crate::routes::test_support::{app, get};

    #[tokio::test]
    async fn test_swap_share_text() {
        let uri = "/share?amount_in=0.1&symbol_in=ETH&amount_out=1000000&symbol_out=TOBY";
        let (status, body) = get(app(FakeChain::new(8453), AppConfig::default()), uri).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["text"].as_str().unwrap().contains("0.1 ETH for 1000000 TOBY"));
        assert!(body["x_url"].as_str().unwrap().starts_with("https://twitter.com/intent/tweet?"));
        assert!(body["warpcast_url"].as_str().unwrap().contains("embeds"));
    }

    #[tokio::test]
    async fn test_burn_share_text() {
        let mut config = AppConfig::default();
        config.contracts.swapper = Some(address!("5555555555555555555555555555555555555555"));
        let chain = FakeChain::new(8453).with_total_burned(U256::from(42_000_000_000_000_000_000u128));
        let (status, body) = get(app(chain, config), "/share").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["text"].as_str().unwrap().starts_with("42.00 $TOBY burned"));
    }

    #[tokio::test]
    async fn test_partial_swap_fields_rejected() {
        let (status, body) = get(app(FakeChain::new(8453), AppConfig::default()), "/share?amount_in=1").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "bad_request");
    }
}
