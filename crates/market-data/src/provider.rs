//! Ordered provider chains
//!
//! Each provider answers `value | null` for a token. A [`FallbackChain`]
//! asks them in priority order and returns the first non-null answer; a
//! failing or slow provider is skipped, never surfaced to the caller.

use std::time::Duration;

use alloy_primitives::Address;
use async_trait::async_trait;
use base_client::with_soft_timeout;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("{provider} unavailable: {reason}")]
    Unavailable { provider: String, reason: String },
}

/// One source of a per-token value
#[async_trait]
pub trait ValueProvider<T>: Send + Sync {
    fn name(&self) -> &str;

    /// `Ok(None)` when the provider has no value for this token
    async fn fetch(&self, token: Address) -> Result<Option<T>, ProviderError>;
}

/// Providers tried in order
pub struct FallbackChain<T> {
    providers: Vec<Box<dyn ValueProvider<T>>>,
    per_provider_timeout: Duration,
}

impl<T: Send + 'static> FallbackChain<T> {
    pub fn new(per_provider_timeout: Duration) -> Self {
        Self {
            providers: Vec::new(),
            per_provider_timeout,
        }
    }

    pub fn with_provider(mut self, provider: impl ValueProvider<T> + 'static) -> Self {
        self.providers.push(Box::new(provider));
        self
    }

    pub fn push(&mut self, provider: Box<dyn ValueProvider<T>>) {
        self.providers.push(provider);
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// First non-null value, or `None` once every provider has been tried
    pub async fn first_value(&self, token: Address) -> Option<T> {
        for provider in &self.providers {
            match with_soft_timeout(provider.fetch(token), self.per_provider_timeout).await {
                Some(Ok(Some(value))) => {
                    tracing::debug!(provider = provider.name(), %token, "provider answered");
                    return Some(value);
                }
                Some(Ok(None)) => {
                    tracing::debug!(provider = provider.name(), %token, "provider has no value");
                }
                Some(Err(e)) => {
                    tracing::warn!(provider = provider.name(), %token, error = %e, "provider failed");
                }
                None => {
                    tracing::warn!(provider = provider.name(), %token, "provider timed out");
                }
            }
        }
        None
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Scripted provider for tests
    pub(crate) struct Scripted<T> {
        pub name: &'static str,
        pub answer: Result<Option<T>, ()>,
        pub delay: Duration,
        pub calls: Arc<AtomicUsize>,
    }

    impl<T> Scripted<T> {
        pub fn new(name: &'static str, answer: Result<Option<T>, ()>) -> Self {
            Self {
                name,
                answer,
                delay: Duration::ZERO,
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    #[async_trait]
    impl<T: Clone + Send + Sync> ValueProvider<T> for Scripted<T> {
        fn name(&self) -> &str {
            self.name
        }

        async fn fetch(&self, _token: Address) -> Result<Option<T>, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            self.answer.clone().map_err(|_| ProviderError::Unavailable {
                provider: self.name.to_string(),
                reason: "HTTP 500".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn test_first_non_null_wins() {
        let last = Scripted::new("last", Ok(Some(3u64)));
        let last_calls = Arc::clone(&last.calls);
        let chain = FallbackChain::new(Duration::from_secs(1))
            .with_provider(Scripted::new("down", Err(())))
            .with_provider(Scripted::new("empty", Ok(None)))
            .with_provider(Scripted::new("good", Ok(Some(2u64))))
            .with_provider(last);

        assert_eq!(chain.first_value(Address::ZERO).await, Some(2));
        assert_eq!(last_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_exhausted_chain_is_null() {
        let chain = FallbackChain::<u64>::new(Duration::from_secs(1))
            .with_provider(Scripted::new("down", Err(())))
            .with_provider(Scripted::new("empty", Ok(None)));
        assert_eq!(chain.first_value(Address::ZERO).await, None);
        assert!(FallbackChain::<u64>::new(Duration::ZERO)
            .first_value(Address::ZERO)
            .await
            .is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_provider_is_skipped() {
        let mut slow = Scripted::new("slow", Ok(Some(1.0f64)));
        slow.delay = Duration::from_secs(10);
        let chain = FallbackChain::new(Duration::from_millis(1200))
            .with_provider(slow)
            .with_provider(Scripted::new("fast", Ok(Some(2.0f64))));
        assert_eq!(chain.first_value(Address::ZERO).await, Some(2.0));
    }
}
