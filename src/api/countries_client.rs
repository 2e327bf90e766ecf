// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::models::CountryRecord;

/// Where the currency selects get their entries from
#[async_trait]
pub trait CountrySource: Send + Sync {
    /// Fetch the directory once. Any failure yields an empty list.
    async fn load(&self) -> Vec<CountryRecord>;
}

pub struct RestCountriesClient {
    client: Client,
    url: String,
}

impl RestCountriesClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            url: url.into(),
        }
    }

    async fn fetch(&self) -> Result<Vec<CountryRecord>> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .context("Failed to send request")?;

        let status = response.status();
        let text = response.text().await.context("Failed to get response text")?;

        if !status.is_success() {
            anyhow::bail!("Error fetching country data: {}", status);
        }

        let data: Value =
            serde_json::from_str(&text).context("Failed to parse country data")?;

        let Value::Array(entries) = data else {
            anyhow::bail!("Invalid response format: expected a list of countries");
        };

        let records: Vec<CountryRecord> =
            entries.iter().filter_map(CountryRecord::from_value).collect();

        if records.len() < entries.len() {
            log::debug!(
                "Dropped {} malformed country records",
                entries.len() - records.len()
            );
        }

        Ok(records)
    }
}

#[async_trait]
impl CountrySource for RestCountriesClient {
    async fn load(&self) -> Vec<CountryRecord> {
        match self.fetch().await {
            Ok(records) => {
                log::info!("Loaded {} country records", records.len());
                records
            }
            Err(e) => {
                log::error!("Error loading countries: {:#}", e);
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    async fn serve(status: usize, body: &str) -> (mockito::ServerGuard, mockito::Mock) {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/v3.1/all")
            .match_query(Matcher::UrlEncoded(
                "fields".into(),
                "name,currencies,flags".into(),
            ))
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await;
        (server, mock)
    }

    fn client_for(server: &mockito::ServerGuard) -> RestCountriesClient {
        RestCountriesClient::new(format!(
            "{}/v3.1/all?fields=name,currencies,flags",
            server.url()
        ))
    }

    #[tokio::test]
    async fn test_load_keeps_well_formed_records() {
        let body = r#"[
            { "name": { "common": "France" }, "currencies": { "EUR": { "name": "Euro", "symbol": "€" } }, "flags": { "png": "fr.png" } },
            null,
            "Atlantis",
            { "name": { "common": "Nowhere" }, "currencies": {} },
            { "name": { "common": "Japan" }, "currencies": { "JPY": { "name": "Japanese yen", "symbol": "¥" } }, "flags": {} }
        ]"#;
        let (server, mock) = serve(200, body).await;

        let records = client_for(&server).load().await;

        mock.assert_async().await;
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].common_name(), Some("France"));
        assert_eq!(records[1].primary_currency().map(|(code, _)| code), Some("JPY"));
    }

    #[tokio::test]
    async fn test_load_non_array_payload_is_empty() {
        let (server, _mock) = serve(200, r#"{ "status": 404, "message": "Not Found" }"#).await;
        assert!(client_for(&server).load().await.is_empty());
    }

    #[tokio::test]
    async fn test_load_error_status_is_empty() {
        let body = r#"[{ "name": { "common": "France" }, "currencies": { "EUR": {} }, "flags": {} }]"#;
        let (server, _mock) = serve(500, body).await;
        assert!(client_for(&server).load().await.is_empty());
    }

    #[tokio::test]
    async fn test_load_invalid_json_is_empty() {
        let (server, _mock) = serve(200, "<html>oops</html>").await;
        assert!(client_for(&server).load().await.is_empty());
    }

    #[tokio::test]
    async fn test_load_unreachable_host_is_empty() {
        let client = RestCountriesClient::new("http://127.0.0.1:9/v3.1/all");
        assert!(client.load().await.is_empty());
    }
}
