//! Toby Swapper command-line entry point

mod cli;
mod commands;

use std::path::Path;

use anyhow::Context;
use clap::Parser;
use toby_core::AppConfig;

use crate::cli::{Cli, ConfigOverrides};

fn init_tracing() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("toby_swapper=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

/// File (if any), then command-line or `TOBY_*` environment overrides, then validation
fn load_config(path: Option<&Path>, overrides: &ConfigOverrides) -> anyhow::Result<AppConfig> {
    let mut config = match path {
        Some(path) => AppConfig::from_file(path)?,
        None => AppConfig::default(),
    };
    overrides.apply(&mut config);
    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing()?;

    let cli = Cli::parse();
    cli.validate().map_err(anyhow::Error::msg)?;

    let config = load_config(cli.config.as_deref(), &cli.overrides).context("loading configuration")?;
    tracing::debug!(
        rpc_url = %config.chain.rpc_url,
        chain = %config.chain.chain,
        swapper = ?config.contracts.swapper,
        "configuration loaded"
    );

    commands::run(cli.command, config).await
}
