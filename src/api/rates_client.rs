// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;

use crate::models::ExchangeRateResponse;

#[async_trait]
pub trait RateSource: Send + Sync {
    /// Latest rate table with `base` as the base currency, or `None` on any failure
    async fn latest(&self, base: &str) -> Option<ExchangeRateResponse>;
}

pub struct ExchangeRateClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl ExchangeRateClient {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            api_key,
        }
    }

    async fn fetch(&self, base: &str) -> Result<ExchangeRateResponse> {
        let api_key = self
            .api_key
            .as_deref()
            .context("No exchange rate API key configured")?;

        let url = format!(
            "{}/{}/latest/{}",
            self.base_url.trim_end_matches('/'),
            api_key,
            base
        );

        // Strip the URL from transport errors, it carries the key
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| e.without_url())
            .context("Failed to send request")?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| e.without_url())
            .context("Failed to get response text")?;

        if !status.is_success() {
            anyhow::bail!("Error fetching the exchange rate: {}", status);
        }

        serde_json::from_str(&text).context("Failed to parse exchange rate response")
    }
}

#[async_trait]
impl RateSource for ExchangeRateClient {
    async fn latest(&self, base: &str) -> Option<ExchangeRateResponse> {
        match self.fetch(base).await {
            Ok(response) => {
                log::debug!(
                    "Fetched rates for {} (result: {})",
                    base,
                    response.result.as_deref().unwrap_or("unknown")
                );
                Some(response)
            }
            Err(e) => {
                log::error!("Error fetching rates for {}: {:#}", base, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "test-key";

    #[tokio::test]
    async fn test_latest_requests_base_currency() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/v6/test-key/latest/USD")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{ "result": "success", "base_code": "USD", "conversion_rates": { "USD": 1, "EUR": 0.9 } }"#)
            .create_async()
            .await;

        let client = ExchangeRateClient::new(format!("{}/v6/", server.url()), Some(KEY.to_string()));
        let response = client.latest("USD").await.unwrap();

        mock.assert_async().await;
        assert_eq!(response.base_code.as_deref(), Some("USD"));
        let table = response.into_table().unwrap();
        assert_eq!(table.lookup("EUR"), Some(0.9));
    }

    #[tokio::test]
    async fn test_latest_error_status_is_none() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/v6/test-key/latest/USD")
            .with_status(403)
            .with_body(r#"{ "result": "error", "error-type": "invalid-key" }"#)
            .create_async()
            .await;

        let client = ExchangeRateClient::new(format!("{}/v6", server.url()), Some(KEY.to_string()));
        assert!(client.latest("USD").await.is_none());
    }

    #[tokio::test]
    async fn test_latest_invalid_body_is_none() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/v6/test-key/latest/USD")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let client = ExchangeRateClient::new(format!("{}/v6", server.url()), Some(KEY.to_string()));
        assert!(client.latest("USD").await.is_none());
    }

    #[tokio::test]
    async fn test_latest_without_key_makes_no_request() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", mockito::Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let client = ExchangeRateClient::new(format!("{}/v6", server.url()), None);
        assert!(client.latest("USD").await.is_none());
        mock.assert_async().await;
    }
}
