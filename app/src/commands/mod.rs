//! Command implementations

mod query;
mod serve;
mod trade;

use std::sync::Arc;

use alloy_primitives::Address;
use anyhow::{anyhow, Context};
use base_client::{ChainReader, RpcClient, TxSender, WalletSender};
use swap::SwapService;
use toby_core::{format_amount, AppConfig, TokenDescriptor, TokenRegistry};

use crate::cli::Command;

/// Environment variable holding the signing key. Never read from the config file.
pub const PRIVATE_KEY_ENV: &str = "TOBY_PRIVATE_KEY";

/// Decimal places shown for balances and quotes
const DISPLAY_PRECISION: usize = 6;

pub async fn run(command: Command, config: AppConfig) -> anyhow::Result<()> {
    let reader: Arc<dyn ChainReader> = Arc::new(
        RpcClient::new(config.chain.clone())
            .with_context(|| format!("connecting to {}", config.chain.rpc_url))?,
    );

    if let Command::Serve { port } = command {
        return serve::serve(config, reader, port).await;
    }

    let registry = Arc::new(config.registry());
    let service = Arc::new(SwapService::new(reader, registry, Arc::new(config)));

    match command {
        // handled above
        Command::Serve { .. } => Ok(()),
        Command::Tokens => query::tokens(&service),
        Command::Quote {
            from,
            to,
            amount: Some(amount),
            slippage_bps,
            watch: false,
        } => trade::quote(&service, &from, &to, &amount, slippage_bps).await,
        Command::Quote {
            from,
            to,
            slippage_bps,
            ..
        } => trade::quote_watch(service, &from, &to, slippage_bps).await,
        Command::Swap {
            from,
            to,
            amount,
            slippage_bps,
            approve,
            dry_run,
        } => {
            let sender = signer(service.config())?;
            let args = trade::SwapArgs {
                from,
                to,
                amount,
                slippage_bps,
                approve,
                dry_run,
            };
            trade::swap(&service, &sender, &args).await
        }
        Command::Approve { token, amount } => {
            let sender = signer(service.config())?;
            trade::approve(&service, &sender, &token, amount.as_deref()).await
        }
        Command::BurnTotal => query::burn_total(&service).await,
        Command::Balances { owner, watch } => {
            let owner = match owner {
                Some(owner) => owner,
                None => signer(service.config())?.address(),
            };
            if watch {
                query::watch_balances(service, owner).await
            } else {
                query::balances(&service, owner).await
            }
        }
    }
}

/// Signing wallet from `TOBY_PRIVATE_KEY`
fn signer(config: &AppConfig) -> anyhow::Result<WalletSender> {
    let key = std::env::var(PRIVATE_KEY_ENV)
        .map_err(|_| anyhow!("{} is not set; it is required to sign transactions", PRIVATE_KEY_ENV))?;
    Ok(WalletSender::from_private_key(config.chain.clone(), &key)?)
}

/// Symbol for a path hop, falling back to the address
fn hop_label(registry: &TokenRegistry, hop: Address) -> String {
    registry
        .by_address(hop)
        .map(|t| t.symbol.clone())
        .unwrap_or_else(|| format!("{:#x}", hop))
}

/// Route rendered with symbols, e.g. "USDC -> WETH -> TOBY"
fn route_label(registry: &TokenRegistry, hops: &[Address]) -> String {
    hops.iter()
        .map(|hop| hop_label(registry, *hop))
        .collect::<Vec<_>>()
        .join(" -> ")
}

fn display(token: &TokenDescriptor, amount: alloy_primitives::U256) -> String {
    format!(
        "{} {}",
        format_amount(amount, token.decimals, DISPLAY_PRECISION),
        token.symbol
    )
}
