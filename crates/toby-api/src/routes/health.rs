//! Health check endpoint

use axum::extract::State;
use axum::Json;
use base_client::{with_soft_timeout, SOFT_TIMEOUT};

use crate::dto::HealthResponse;
use crate::AppState;

/// GET /health - API liveness plus a soft-timed RPC probe
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let config = state.config();
    let network = with_soft_timeout(state.service().network_status(), SOFT_TIMEOUT).await;

    let status = match &network {
        Some(n) if n.is_online && n.is_expected_chain() => "ok",
        _ => "degraded",
    };

    Json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        chain: config.chain.chain.to_string(),
        expected_chain_id: config.chain.chain.id(),
        rpc_online: network.as_ref().map(|n| n.is_online),
        chain_id: network.and_then(|n| n.chain_id),
        swapper_configured: config.contracts.swapper.is_some(),
    })
}

#[cfg(test)]
mod tests {
    use base_client::testing::FakeChain;
    use toby_core::AppConfig;

    use crate::routes::test_support::{app, get};

    #[tokio::test]
    async fn test_health_ok_on_expected_chain() {
        let (status, body) = get(app(FakeChain::new(8453), AppConfig::default()), "/health").await;
        assert!(status.is_success());
        assert_eq!(body["status"], "ok");
        assert_eq!(body["chain_id"], 8453);
        assert_eq!(body["swapper_configured"], false);
    }

    #[tokio::test]
    async fn test_health_degraded_on_wrong_chain() {
        let (_, body) = get(app(FakeChain::new(1), AppConfig::default()), "/health").await;
        assert_eq!(body["status"], "degraded");
        assert_eq!(body["rpc_online"], true);
    }

    #[tokio::test]
    async fn test_health_degraded_when_offline() {
        let chain = FakeChain::new(8453).offline();
        let (status, body) = get(app(chain, AppConfig::default()), "/health").await;
        assert!(status.is_success());
        assert_eq!(body["status"], "degraded");
        assert_eq!(body["rpc_online"], false);
    }
}
