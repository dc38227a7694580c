//! toby-api: HTTP API layer for Toby Swapper
//!
//! Read-through endpoints for quotes, preflight checks, unsigned swap calls
//! and auxiliary market data. Signing stays with the caller's wallet.

pub mod dto;
pub mod routes;
pub mod server;
pub mod state;

pub use server::*;
pub use state::AppState;
