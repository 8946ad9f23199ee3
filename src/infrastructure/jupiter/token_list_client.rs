use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};

use super::{ensure_success, ListingSource};
use crate::shared::errors::FetchError;
use crate::shared::types::Asset;

/// Entry of the Jupiter token list
#[derive(Debug, Deserialize)]
struct TokenListEntry {
    address: String,
    symbol: String,
    #[serde(default)]
    name: Option<String>,
}

impl From<TokenListEntry> for Asset {
    fn from(entry: TokenListEntry) -> Self {
        let name = entry.name.filter(|n| !n.trim().is_empty());
        Asset::new(entry.address, entry.symbol, name)
    }
}

/// Token list client (`GET` returning the full listing)
pub struct TokenListClient {
    http_client: Client,
    url: String,
}

impl TokenListClient {
    pub fn new(http_client: Client, url: impl Into<String>) -> Self {
        Self {
            http_client,
            url: url.into(),
        }
    }
}

fn parse_token_list(body: &[u8]) -> Result<Vec<Asset>, FetchError> {
    let entries: Vec<TokenListEntry> = serde_json::from_slice(body)
        .map_err(|e| FetchError::Protocol(format!("malformed token list: {}", e)))?;
    Ok(entries.into_iter().map(Asset::from).collect())
}

#[async_trait]
impl ListingSource for TokenListClient {
    async fn fetch_universe(&self) -> Result<Vec<Asset>, FetchError> {
        debug!("Fetching token list from {}", self.url);

        let response = self.http_client.get(&self.url).send().await?;
        let response = ensure_success(response, "token list").await?;
        let body = response.bytes().await?;

        let assets = parse_token_list(&body)?;
        info!("📋 Token list fetched: {} assets", assets.len());
        Ok(assets)
    }
}
