//! Cache keys and poller
//!
//! Balances and allowances are cached per key in a [`toby_core::TtlCache`]
//! and refreshed on a fixed interval. Each key is independent: invalidating
//! one allowance does not touch any balance.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use alloy_primitives::Address;
use tokio::task::JoinHandle;
use toby_core::{Asset, Chain};

/// Key for a balance read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BalanceKey {
    pub chain: Chain,
    pub owner: Address,
    pub asset: Asset,
}

/// Key for an allowance read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AllowanceKey {
    pub chain: Chain,
    pub owner: Address,
    pub token: Address,
    pub spender: Address,
}

/// Runs a refresh closure on a fixed interval until dropped.
///
/// A failed tick is logged and the next tick runs as scheduled.
#[derive(Debug)]
pub struct Poller {
    name: &'static str,
    handle: JoinHandle<()>,
}

impl Poller {
    pub fn spawn<F, Fut, E>(name: &'static str, interval: Duration, mut refresh: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), E>> + Send + 'static,
        E: Display,
    {
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if let Err(e) = refresh().await {
                    tracing::warn!(poller = name, error = %e, "poll failed");
                }
            }
        });
        tracing::debug!(poller = name, interval_secs = interval.as_secs(), "poller started");
        Self { name, handle }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn stop(self) {}
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.handle.abort();
        tracing::debug!(poller = self.name, "poller stopped");
    }
}
