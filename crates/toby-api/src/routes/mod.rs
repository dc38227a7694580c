//! API route handlers

pub mod burn;
pub mod health;
pub mod market;
pub mod share;
pub mod swap;
pub mod tokens;

use axum::{
    routing::{get, post},
    Router,
};

use crate::AppState;

/// Create the API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/tokens", get(tokens::list_tokens))
        .route("/quote", post(swap::quote))
        .route("/share", get(share::share))
        .nest("/swap", swap::router())
        .nest("/burn", burn::router())
        .nest("/market", market::router())
        .with_state(state)
}
