//! API host

use std::sync::Arc;
use std::time::Duration;

use base_client::ChainReader;
use market_data::MarketData;
use swap::Poller;
use toby_api::{start_server, AppState};
use toby_core::AppConfig;

/// Serve the API. With a swap contract configured, the burn total is
/// refreshed in the background so requests rarely wait on the chain.
pub async fn serve(
    mut config: AppConfig,
    reader: Arc<dyn ChainReader>,
    port: Option<u16>,
) -> anyhow::Result<()> {
    if let Some(port) = port {
        config.api_port = port;
    }
    let port = config.api_port;
    let burn_interval = Duration::from_secs(config.polling.burn_interval_secs);

    let market = MarketData::from_config(&config.market)?;
    let state = AppState::new(config, reader, market);

    let _burn_poller = state.config().contracts.swapper.map(|swapper| {
        let state = state.clone();
        Poller::spawn("burn-total", burn_interval, move || {
            let state = state.clone();
            async move {
                let burn_token = state.service().registry().burn_token;
                state
                    .market()
                    .refresh_burn_total(state.reader(), swapper, burn_token)
                    .await
                    .map(|_| ())
                    .ok_or("burn total unavailable")
            }
        })
    });

    start_server(state, port).await?;
    Ok(())
}
