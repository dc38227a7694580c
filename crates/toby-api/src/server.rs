//! HTTP server: middleware, binding and graceful shutdown

use std::future::Future;
use std::net::SocketAddr;

use axum::http::{header, Method};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::routes::create_router;
use crate::AppState;

/// Router with tracing and a CORS policy for browser wallets.
///
/// Every route is a read or an unsigned build, so any origin may call it,
/// but only with GET or POST and a JSON body.
pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Bind on localhost. Port 0 picks a free port.
pub async fn bind(port: u16) -> Result<TcpListener, std::io::Error> {
    TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], port))).await
}

/// Serve on `listener` until `shutdown` resolves, then drain in-flight requests
pub async fn serve_until<F>(
    state: AppState,
    listener: TcpListener,
    shutdown: F,
) -> Result<(), std::io::Error>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr()?;
    let config = state.config();
    tracing::info!(
        %addr,
        chain = %config.chain.chain,
        swapper = ?config.contracts.swapper,
        "serving swap API"
    );

    axum::serve(listener, create_app(state))
        .with_graceful_shutdown(shutdown)
        .await?;

    tracing::info!(%addr, "API server stopped");
    Ok(())
}

/// Serve the API on localhost until ctrl-c
pub async fn start_server(state: AppState, port: u16) -> Result<(), std::io::Error> {
    let listener = bind(port).await?;
    serve_until(state, listener, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "ctrl-c handler failed");
        }
    })
    .await
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use base_client::testing::FakeChain;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use toby_core::AppConfig;
    use tower::ServiceExt;

    use super::*;
    use crate::routes::test_support::{app, empty_market};

    fn preflight(method: &str) -> Request<Body> {
        Request::options("/quote")
            .header(header::ORIGIN, "https://tobyswapper.xyz")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, method)
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_cors_allows_post_from_any_origin() {
        let response = app(FakeChain::new(8453), AppConfig::default())
            .oneshot(preflight("POST"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        let methods = response.headers()[header::ACCESS_CONTROL_ALLOW_METHODS]
            .to_str()
            .unwrap();
        assert!(methods.contains("POST"));
        assert!(!methods.contains("DELETE"));
    }

    #[tokio::test]
    async fn test_serve_until_answers_then_stops() {
        let listener = bind(0).await.unwrap();
        let addr = listener.local_addr().unwrap();
        let state = AppState::new(
            AppConfig::default(),
            std::sync::Arc::new(FakeChain::new(8453)),
            empty_market(),
        );
        let (stop, stopped) = tokio::sync::oneshot::channel::<()>();
        let server = tokio::spawn(serve_until(state, listener, async {
            let _ = stopped.await;
        }));

        let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
        stream
            .write_all(b"GET /health HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
            .await
            .unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();
        assert!(response.starts_with("HTTP/1.1 200"));
        assert!(response.contains("\"status\":\"ok\""));

        stop.send(()).unwrap();
        server.await.unwrap().unwrap();
    }
}
