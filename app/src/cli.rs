//! Command-line arguments

use std::path::PathBuf;

use alloy_primitives::Address;
use clap::{Args, Parser, Subcommand};
use toby_core::AppConfig;

/// Toby Swapper - swap on Base and burn $TOBY with every trade
///
/// Read-only commands need only an RPC endpoint. Commands that send
/// transactions sign with the key in TOBY_PRIVATE_KEY.
#[derive(Parser, Debug, Clone, PartialEq)]
#[clap(name = "toby-swapper", version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// JSON config file. Environment overrides are applied on top.
    #[clap(long, env = "TOBY_CONFIG")]
    pub config: Option<PathBuf>,

    #[clap(flatten)]
    pub overrides: ConfigOverrides,

    #[clap(subcommand)]
    pub command: Command,
}

/// Settings that take precedence over the config file
#[derive(Args, Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    /// JSON-RPC endpoint for Base
    #[clap(long, env = "TOBY_RPC_URL")]
    pub rpc_url: Option<String>,

    /// Swap contract address
    #[clap(long, env = "TOBY_SWAPPER_ADDRESS")]
    pub swapper_address: Option<Address>,

    /// API server port
    #[clap(long, env = "TOBY_API_PORT")]
    pub api_port: Option<u16>,
}

impl ConfigOverrides {
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(url) = &self.rpc_url {
            config.chain.rpc_url = url.clone();
        }
        if let Some(swapper) = self.swapper_address {
            config.contracts.swapper = Some(swapper);
        }
        if let Some(port) = self.api_port {
            config.api_port = port;
        }
    }
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Serve the HTTP API on localhost
    Serve {
        /// Overrides `api_port` from the config
        #[clap(long)]
        port: Option<u16>,
    },

    /// List registry tokens
    Tokens,

    /// Quote a swap without sending anything
    Quote {
        /// Input token: symbol, address or "eth"
        from: String,
        /// Output token: symbol or address
        to: String,
        /// Amount of the input token in human units, e.g. 0.25
        amount: Option<String>,
        #[clap(long)]
        slippage_bps: Option<u64>,
        /// Read amounts from stdin, one per line, and quote the latest one
        #[clap(long)]
        watch: bool,
    },

    /// Quote, preflight and send a swap
    Swap {
        from: String,
        to: String,
        amount: String,
        #[clap(long)]
        slippage_bps: Option<u64>,
        /// Approve the swap contract first if the allowance is too low
        #[clap(long)]
        approve: bool,
        /// Stop after preflight
        #[clap(long)]
        dry_run: bool,
    },

    /// Approve the swap contract to spend a token
    Approve {
        token: String,
        /// Minimum allowance in human units. Approves the maximum when omitted.
        #[clap(long)]
        amount: Option<String>,
    },

    /// Show the cumulative burn total
    BurnTotal,

    /// Show registry token balances
    Balances {
        /// Defaults to the signer's address
        #[clap(long)]
        owner: Option<Address>,
        /// Keep refreshing on the configured polling interval
        #[clap(long)]
        watch: bool,
    },
}

impl Cli {
    pub fn validate(&self) -> Result<(), String> {
        match &self.command {
            Command::Quote {
                amount: None,
                watch: false,
                ..
            } => Err("quote needs an amount unless --watch is given".to_string()),
            Command::Quote {
                amount: Some(_),
                watch: true,
                ..
            } => Err("quote --watch reads amounts from stdin; drop the amount argument".to_string()),
            _ => Ok(()),
        }
    }
}
