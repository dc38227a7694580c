//! toby-core: Shared types, token registry, errors, and configuration
//!
//! This crate provides the foundational types used across the Toby Swapper workspace.

pub mod cache;
pub mod config;
pub mod errors;
pub mod registry;
pub mod types;

pub use cache::{Cached, TtlCache};
pub use config::*;
pub use errors::*;
pub use registry::TokenRegistry;
pub use types::*;
