//! Application state shared across API handlers

use std::sync::Arc;

use base_client::ChainReader;
use market_data::MarketData;
use swap::SwapService;
use toby_core::AppConfig;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Arc<AppConfig>,
    service: SwapService,
    market: MarketData,
}

impl AppState {
    /// Build state around a chain reader. The registry comes from `config`.
    pub fn new(config: AppConfig, reader: Arc<dyn ChainReader>, market: MarketData) -> Self {
        let registry = Arc::new(config.registry());
        let config = Arc::new(config);
        let service = SwapService::new(reader, registry, config.clone());
        Self {
            inner: Arc::new(AppStateInner {
                config,
                service,
                market,
            }),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    pub fn service(&self) -> &SwapService {
        &self.inner.service
    }

    pub fn market(&self) -> &MarketData {
        &self.inner.market
    }

    pub fn reader(&self) -> &dyn ChainReader {
        self.inner.service.reader().as_ref()
    }
}
