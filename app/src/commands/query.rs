//! Read-only commands

use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::Address;
use market_data::read_burn_total;
use swap::{Poller, SwapService};
use toby_core::{Asset, TxError};

use super::display;

pub fn tokens(service: &SwapService) -> anyhow::Result<()> {
    let registry = service.registry();
    for token in registry.tokens() {
        let marker = if token.asset.token_address() == Some(registry.burn_token) {
            " (burn)"
        } else {
            ""
        };
        println!(
            "{:<8} {:>2} decimals  {}{}",
            token.symbol, token.decimals, token.asset, marker
        );
    }
    Ok(())
}

pub async fn burn_total(service: &SwapService) -> anyhow::Result<()> {
    let swapper = service
        .config()
        .contracts
        .swapper
        .ok_or(TxError::SwapperNotConfigured)?;
    let burn_token = service.registry().burn_token;
    let total = read_burn_total(service.reader().as_ref(), swapper, burn_token).await?;
    let symbol = service
        .registry()
        .by_address(burn_token)
        .map(|t| t.symbol.as_str())
        .unwrap_or("tokens");
    println!("{} {} burned", total.formatted, symbol);
    Ok(())
}

/// Read every registry balance for `owner`. Fails if any read failed.
async fn print_balances(service: &SwapService, owner: Address) -> Result<(), String> {
    let assets: Vec<Asset> = service.registry().tokens().iter().map(|t| t.asset).collect();
    let mut first_error = None;
    for (asset, result) in service.refresh_balances(owner, &assets).await {
        let Some(token) = service.registry().by_asset(&asset) else {
            continue;
        };
        match result {
            Ok(amount) => println!("{:>24}", display(token, amount)),
            Err(e) => {
                println!("{:>24}", format!("? {}", token.symbol));
                first_error.get_or_insert_with(|| e.to_string());
            }
        }
    }
    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

pub async fn balances(service: &SwapService, owner: Address) -> anyhow::Result<()> {
    println!("balances for {}", owner);
    print_balances(service, owner)
        .await
        .map_err(anyhow::Error::msg)
}

/// Refresh balances on the polling interval until ctrl-c
pub async fn watch_balances(service: Arc<SwapService>, owner: Address) -> anyhow::Result<()> {
    let interval = Duration::from_secs(service.config().polling.balance_interval_secs);
    println!("balances for {} every {}s (ctrl-c to stop)", owner, interval.as_secs());

    let poller = Poller::spawn("balances", interval, move || {
        let service = service.clone();
        async move {
            println!("--");
            print_balances(&service, owner).await
        }
    });

    tokio::signal::ctrl_c().await?;
    poller.stop();
    Ok(())
}
