//! Quote sessions
//!
//! Every quote cycle takes a [`QuoteTicket`] carrying a generation number.
//! Starting a new cycle bumps the generation, so results from any earlier
//! cycle can be recognised and dropped no matter when they resolve.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Generation counter shared by all cycles of one input form
#[derive(Debug, Clone)]
pub struct QuoteSession {
    generation: Arc<AtomicU64>,
    debounce: Duration,
}

/// Handle for one quote cycle
#[derive(Debug, Clone)]
pub struct QuoteTicket {
    generation: u64,
    latest: Arc<AtomicU64>,
}

impl QuoteTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// No newer cycle has started since this one
    pub fn is_current(&self) -> bool {
        self.latest.load(Ordering::SeqCst) == self.generation
    }
}

impl QuoteSession {
    pub fn new(debounce: Duration) -> Self {
        Self {
            generation: Arc::new(AtomicU64::new(0)),
            debounce,
        }
    }

    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    pub fn current_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Start a new cycle, superseding every earlier ticket
    pub fn begin(&self) -> QuoteTicket {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        QuoteTicket {
            generation,
            latest: Arc::clone(&self.generation),
        }
    }

    /// Start a cycle, wait out the debounce window and return the ticket
    /// only if nothing newer started meanwhile.
    pub async fn debounced(&self) -> Option<QuoteTicket> {
        let ticket = self.begin();
        tokio::time::sleep(self.debounce).await;
        if ticket.is_current() {
            Some(ticket)
        } else {
            tracing::trace!(generation = ticket.generation(), "debounced cycle superseded");
            None
        }
    }
}

/// Most recent accepted result of a session
#[derive(Debug)]
pub struct LatestValue<T> {
    slot: Mutex<Option<(u64, T)>>,
}

impl<T> Default for LatestValue<T> {
    fn default() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }
}

impl<T: Clone> LatestValue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` if `ticket` is still current. Returns whether it was applied.
    pub fn apply(&self, ticket: &QuoteTicket, value: T) -> bool {
        let Ok(mut slot) = self.slot.lock() else {
            return false;
        };
        if !ticket.is_current() {
            tracing::debug!(generation = ticket.generation(), "discarding stale result");
            return false;
        }
        *slot = Some((ticket.generation(), value));
        true
    }

    pub fn get(&self) -> Option<T> {
        self.slot
            .lock()
            .ok()
            .and_then(|slot| slot.as_ref().map(|(_, v)| v.clone()))
    }

    /// Generation of the stored value
    pub fn generation(&self) -> Option<u64> {
        self.slot
            .lock()
            .ok()
            .and_then(|slot| slot.as_ref().map(|(g, _)| *g))
    }
}
