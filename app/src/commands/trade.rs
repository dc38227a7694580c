//! Quote, swap and approve commands

use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::U256;
use anyhow::{anyhow, bail};
use base_client::{TxSender, WalletSender};
use market_data::share::{swap_share_text, warpcast_intent_url, x_intent_url};
use swap::constants::approval::MAX_APPROVAL;
use swap::{
    failure_message, LatestValue, QuoteRequest, QuoteSession, SubmissionTracker, SwapQuote,
    SwapService,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use toby_core::{parse_amount, Asset, SwapError, TokenDescriptor};

use super::{display, route_label};

pub struct SwapArgs {
    pub from: String,
    pub to: String,
    pub amount: String,
    pub slippage_bps: Option<u64>,
    pub approve: bool,
    pub dry_run: bool,
}

struct Pair {
    token_in: TokenDescriptor,
    token_out: TokenDescriptor,
}

fn resolve_pair(service: &SwapService, from: &str, to: &str) -> anyhow::Result<Pair> {
    Ok(Pair {
        token_in: service.resolve_token(from)?,
        token_out: service.resolve_token(to)?,
    })
}

fn request(pair: &Pair, amount: &str, slippage_bps: Option<u64>) -> anyhow::Result<QuoteRequest> {
    let amount_in = parse_amount(amount, pair.token_in.decimals)
        .map_err(|message| SwapError::InvalidAmount { message })?;
    Ok(QuoteRequest {
        token_in: pair.token_in.asset,
        token_out: pair.token_out.asset,
        amount_in,
        slippage_bps,
    })
}

fn print_quote(service: &SwapService, pair: &Pair, quote: &SwapQuote) {
    let registry = service.registry();
    println!(
        "{} -> {}",
        display(&pair.token_in, quote.amount_in),
        display(&pair.token_out, quote.selected.raw_output)
    );
    println!("  route:      {}", route_label(registry, quote.selected.path.hops()));
    println!(
        "  min out:    {} ({} bps slippage)",
        display(&pair.token_out, quote.selected.min_output),
        quote.slippage_bps
    );
    println!(
        "  fee:        {} bps, {} via {}",
        quote.fee_bps,
        display(&pair.token_in, quote.fee_leg.fee_amount),
        route_label(registry, quote.fee_leg.path.hops())
    );
    for attempt in &quote.attempts {
        tracing::debug!(attempt = %attempt.describe(), elapsed_ms = attempt.elapsed.as_millis() as u64);
    }
}

pub async fn quote(
    service: &SwapService,
    from: &str,
    to: &str,
    amount: &str,
    slippage_bps: Option<u64>,
) -> anyhow::Result<()> {
    let pair = resolve_pair(service, from, to)?;
    let quote = service.quote(&request(&pair, amount, slippage_bps)?).await?;
    print_quote(service, &pair, &quote);
    Ok(())
}

/// Quote each amount read from stdin. Lines arriving within the debounce
/// window replace each other; only the latest amount's quote is printed.
pub async fn quote_watch(
    service: Arc<SwapService>,
    from: &str,
    to: &str,
    slippage_bps: Option<u64>,
) -> anyhow::Result<()> {
    let pair = Arc::new(resolve_pair(&service, from, to)?);
    let session = QuoteSession::new(Duration::from_millis(service.config().swap.quote_debounce_ms));
    let displayed = Arc::new(LatestValue::<SwapQuote>::new());

    eprintln!(
        "enter {} amounts, one per line (ctrl-d to stop)",
        pair.token_in.symbol
    );
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut last = None;
    while let Some(line) = lines.next_line().await? {
        let amount = line.trim();
        if amount.is_empty() {
            continue;
        }
        let request = match request(&pair, amount, slippage_bps) {
            Ok(request) => request,
            Err(e) => {
                eprintln!("{}", e);
                continue;
            }
        };

        let (service, session, displayed, pair) =
            (service.clone(), session.clone(), displayed.clone(), pair.clone());
        last = Some(tokio::spawn(async move {
            match service.quote_latest(&session, &displayed, &request).await {
                Some(Ok(quote)) => print_quote(&service, &pair, &quote),
                Some(Err(e)) => eprintln!("{}", e),
                None => tracing::debug!(generation = session.current_generation(), "superseded"),
            }
        }));
    }

    if let Some(task) = last {
        task.await?;
    }
    Ok(())
}

pub async fn swap(service: &SwapService, sender: &WalletSender, args: &SwapArgs) -> anyhow::Result<()> {
    let pair = resolve_pair(service, &args.from, &args.to)?;
    let quote = service
        .quote(&request(&pair, &args.amount, args.slippage_bps)?)
        .await?;
    print_quote(service, &pair, &quote);

    let owner = sender.address();
    if let Asset::Token(token) = quote.token_in {
        let allowance = service.allowance(owner, token).await?;
        if allowance < quote.amount_in {
            if !args.approve {
                bail!(
                    "{} allowance {} is below {}; rerun with --approve",
                    pair.token_in.symbol,
                    display(&pair.token_in, allowance),
                    display(&pair.token_in, quote.amount_in)
                );
            }
            let allowance = service.approve(sender, token, quote.amount_in).await?;
            println!("approved: allowance now {}", display(&pair.token_in, allowance));
        }
    }

    if args.dry_run {
        let preflight = service.preflight(owner, &quote).await?;
        println!(
            "preflight ok: needs {} ETH, have {} ETH, gas {}",
            toby_core::format_amount(preflight.required_native, 18, 6),
            toby_core::format_amount(preflight.available_native, 18, 6),
            preflight.gas_estimate
        );
        return Ok(());
    }

    let mut tracker = SubmissionTracker::new();
    let receipt = service
        .execute(sender, &quote, &mut tracker)
        .await
        .map_err(|e| anyhow!(failure_message(&e)))?;
    println!("swap mined: {:#x}", receipt.tx_hash);

    let text = swap_share_text(
        &toby_core::format_amount(quote.amount_in, pair.token_in.decimals, 6),
        &pair.token_in.symbol,
        &toby_core::format_amount(quote.selected.raw_output, pair.token_out.decimals, 6),
        &pair.token_out.symbol,
    );
    let link = &service.config().app_url;
    if let Some(url) = x_intent_url(&text, link) {
        println!("share on X: {}", url);
    }
    if let Some(url) = warpcast_intent_url(&text, link) {
        println!("share on Warpcast: {}", url);
    }
    Ok(())
}

pub async fn approve(
    service: &SwapService,
    sender: &WalletSender,
    token: &str,
    amount: Option<&str>,
) -> anyhow::Result<()> {
    let descriptor = service.resolve_token(token)?;
    let Asset::Token(address) = descriptor.asset else {
        bail!("native ETH needs no approval");
    };
    let required: U256 = match amount {
        Some(amount) => parse_amount(amount, descriptor.decimals)
            .map_err(|message| SwapError::InvalidAmount { message })?,
        None => MAX_APPROVAL,
    };
    let allowance = service.approve(sender, address, required).await?;
    if allowance == MAX_APPROVAL {
        println!("{} allowance: unlimited", descriptor.symbol);
    } else {
        println!("{} allowance: {}", descriptor.symbol, display(&descriptor, allowance));
    }
    Ok(())
}
