use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::debug;

use super::{ensure_success, PriceSource};
use crate::shared::errors::FetchError;
use crate::shared::types::PriceQuote;

/// Price API response (`{"data": {"SOL": {...}}, "timeTaken": ...}`)
#[derive(Debug, Deserialize)]
struct PriceApiResponse {
    #[serde(default)]
    data: HashMap<String, PriceEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PriceEntry {
    price: Option<f64>,
    mint_symbol: Option<String>,
    vs_token_symbol: Option<String>,
}

/// Prices the configured base symbol against each sampled asset
pub struct PriceApiClient {
    http_client: Client,
    base_url: String,
    base_symbol: String,
}

impl PriceApiClient {
    pub fn new(http_client: Client, base_url: impl Into<String>, base_symbol: impl Into<String>) -> Self {
        Self {
            http_client,
            base_url: base_url.into(),
            base_symbol: base_symbol.into(),
        }
    }
}

fn parse_price(body: &[u8], base_symbol: &str) -> Result<PriceQuote, FetchError> {
    let response: PriceApiResponse = serde_json::from_slice(body)
        .map_err(|e| FetchError::Protocol(format!("malformed price payload: {}", e)))?;

    let entry = response
        .data
        .get(base_symbol)
        .ok_or_else(|| FetchError::Protocol(format!("no price entry for {}", base_symbol)))?;

    let missing = |field: &str| FetchError::Protocol(format!("price entry missing '{}'", field));
    let price = entry.price.ok_or_else(|| missing("price"))?;
    if !price.is_finite() {
        return Err(FetchError::Protocol(format!("non-finite price {}", price)));
    }

    Ok(PriceQuote {
        price,
        base_symbol: entry.mint_symbol.clone().ok_or_else(|| missing("mintSymbol"))?,
        quote_symbol: entry.vs_token_symbol.clone().ok_or_else(|| missing("vsTokenSymbol"))?,
    })
}

#[async_trait]
impl PriceSource for PriceApiClient {
    async fn price_for(&self, symbol: &str) -> Result<PriceQuote, FetchError> {
        debug!("Fetching {} price against {}", self.base_symbol, symbol);

        let response = self
            .http_client
            .get(&self.base_url)
            .query(&[("ids", self.base_symbol.as_str()), ("vsToken", symbol)])
            .send()
            .await?;
        let response = ensure_success(response, "price").await?;
        let body = response.bytes().await?;

        parse_price(&body, &self.base_symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_price() {
        let body = br#"{"data": {"SOL": {"id": "So11111111111111111111111111111111111111112",
            "mintSymbol": "SOL", "vsToken": "Mint2", "vsTokenSymbol": "BONK", "price": 1234.5678}},
            "timeTaken": 0.001}"#;
        let quote = parse_price(body, "SOL").unwrap();
        assert_eq!(quote.price, 1234.5678);
        assert_eq!(quote.base_symbol, "SOL");
        assert_eq!(quote.quote_symbol, "BONK");
    }

    #[test]
    fn test_missing_entry_is_protocol_error() {
        let err = parse_price(br#"{"data": {}}"#, "SOL").unwrap_err();
        assert!(matches!(err, FetchError::Protocol(_)));
    }

    #[test]
    fn test_missing_fields_are_protocol_errors() {
        let no_price = br#"{"data": {"SOL": {"mintSymbol": "SOL", "vsTokenSymbol": "X"}}}"#;
        assert!(matches!(parse_price(no_price, "SOL"), Err(FetchError::Protocol(_))));

        let no_symbol = br#"{"data": {"SOL": {"price": 1.0, "mintSymbol": "SOL"}}}"#;
        assert!(matches!(parse_price(no_symbol, "SOL"), Err(FetchError::Protocol(_))));
    }

    #[test]
    fn test_malformed_body_is_protocol_error() {
        assert!(matches!(parse_price(b"<html>", "SOL"), Err(FetchError::Protocol(_))));
    }
}
