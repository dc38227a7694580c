//! Token registry listing

use axum::extract::State;
use axum::Json;

use crate::dto::{TokenDto, TokensResponse};
use crate::AppState;

/// GET /tokens
pub async fn list_tokens(State(state): State<AppState>) -> Json<TokensResponse> {
    let registry = state.service().registry();
    let tokens: Vec<TokenDto> = registry
        .tokens()
        .iter()
        .map(|t| TokenDto::from_descriptor(t, registry.burn_token))
        .collect();
    Json(TokensResponse {
        count: tokens.len(),
        tokens,
    })
}
