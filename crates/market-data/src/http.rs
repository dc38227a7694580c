//! HTTP JSON providers
//!
//! A provider is a URL template with a `{token}` placeholder and a JSON
//! pointer to the value in the response body.

use alloy_primitives::Address;
use async_trait::async_trait;
use serde_json::Value;
use toby_core::HttpSourceConfig;

use crate::provider::{ProviderError, ValueProvider};

/// Values that can be read out of a JSON response
pub trait FromJsonValue: Sized {
    fn from_json(value: &Value) -> Option<Self>;
}

impl FromJsonValue for f64 {
    fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
        .filter(|v: &f64| v.is_finite())
    }
}

impl FromJsonValue for u64 {
    fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.trim().replace(',', "").parse().ok(),
            _ => None,
        }
    }
}

/// Provider backed by a JSON HTTP endpoint
#[derive(Debug, Clone)]
pub struct JsonHttpProvider {
    source: HttpSourceConfig,
    client: reqwest::Client,
}

impl JsonHttpProvider {
    pub fn new(source: HttpSourceConfig, client: reqwest::Client) -> Self {
        Self { source, client }
    }

    /// Request URL for `token` (lowercase hex address)
    pub fn url_for(&self, token: Address) -> String {
        self.source
            .url_template
            .replace("{token}", &format!("{:#x}", token))
    }

    /// Pull the configured value out of a response body
    pub fn extract<T: FromJsonValue>(&self, body: &Value) -> Option<T> {
        body.pointer(&self.source.json_pointer)
            .and_then(T::from_json)
    }

    fn unavailable(&self, reason: impl ToString) -> ProviderError {
        ProviderError::Unavailable {
            provider: self.source.name.clone(),
            reason: reason.to_string(),
        }
    }
}

#[async_trait]
impl<T: FromJsonValue + Send + 'static> ValueProvider<T> for JsonHttpProvider {
    fn name(&self) -> &str {
        &self.source.name
    }

    async fn fetch(&self, token: Address) -> Result<Option<T>, ProviderError> {
        let response = self
            .client
            .get(self.url_for(token))
            .send()
            .await
            .map_err(|e| self.unavailable(e))?;
        if !response.status().is_success() {
            return Err(self.unavailable(format!("HTTP {}", response.status())));
        }
        let body: Value = response.json().await.map_err(|e| self.unavailable(e))?;
        Ok(self.extract(&body))
    }
}

/// Shared client for market providers
pub fn build_client() -> Result<reqwest::Client, ProviderError> {
    reqwest::Client::builder()
        .user_agent("toby-swapper")
        .build()
        .map_err(|e| ProviderError::Unavailable {
            provider: "http".to_string(),
            reason: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn provider(pointer: &str) -> JsonHttpProvider {
        JsonHttpProvider::new(
            HttpSourceConfig {
                name: "test".to_string(),
                url_template: "https://api.example.com/tokens/{token}/price".to_string(),
                json_pointer: pointer.to_string(),
            },
            reqwest::Client::new(),
        )
    }

    #[test]
    fn test_url_for_uses_lowercase_address() {
        let p = provider("/price");
        let token: Address = "0xb8D98a102b0079B69FFbc760C8d857A31653e56e".parse().unwrap();
        assert_eq!(
            p.url_for(token),
            "https://api.example.com/tokens/0xb8d98a102b0079b69ffbc760c8d857a31653e56e/price"
        );
    }

    #[test]
    fn test_extract_number_and_string() {
        let p = provider("/data/attributes/price_usd");
        let body = json!({"data": {"attributes": {"price_usd": "0.00000123"}}});
        assert_eq!(p.extract::<f64>(&body), Some(0.00000123));

        let p = provider("/holders");
        assert_eq!(p.extract::<u64>(&json!({"holders": 41234})), Some(41234));
        assert_eq!(p.extract::<u64>(&json!({"holders": "41,234"})), Some(41234));
        assert_eq!(p.extract::<u64>(&json!({"holders": null})), None);
        assert_eq!(p.extract::<u64>(&json!({})), None);
    }
}
