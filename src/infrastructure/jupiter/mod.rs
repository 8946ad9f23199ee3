//! Jupiter aggregator HTTP clients: token list, price, quote and swap-build

pub mod token_list_client;
pub mod price_client;
pub mod swap_api_client;

pub use token_list_client::TokenListClient;
pub use price_client::PriceApiClient;
pub use swap_api_client::{QuoteResponse, SwapApiClient};

use async_trait::async_trait;
use reqwest::{Client, Response};
use solana_sdk::pubkey::Pubkey;
use std::time::Duration;

use crate::shared::errors::FetchError;
use crate::shared::types::{Asset, PriceQuote};

/// Source of the full tradable-asset universe
#[async_trait]
pub trait ListingSource: Send + Sync {
    async fn fetch_universe(&self) -> Result<Vec<Asset>, FetchError>;
}

/// Price lookup keyed by asset symbol
#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn price_for(&self, symbol: &str) -> Result<PriceQuote, FetchError>;
}

/// Parameters of a quote request
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteParams {
    pub input_mint: String,
    pub output_mint: String,
    pub amount: u64,
    pub slippage_bps: u16,
}

/// Quote-and-build protocol of the swap aggregator
#[async_trait]
pub trait SwapApi: Send + Sync {
    async fn quote(&self, params: &QuoteParams) -> Result<QuoteResponse, FetchError>;

    /// Returns the unsigned transaction in its base64 transport encoding
    async fn build_swap(
        &self,
        quote: &QuoteResponse,
        user_public_key: &Pubkey,
        wrap_and_unwrap_sol: bool,
    ) -> Result<String, FetchError>;
}

/// HTTP client with the request timeout every outbound call must carry
pub fn http_client(timeout: Duration) -> Result<Client, FetchError> {
    Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout)
        .build()
        .map_err(|e| FetchError::Transport(format!("failed to build HTTP client: {}", e)))
}

/// Turn a non-2xx response into a protocol error carrying the body
pub(crate) async fn ensure_success(response: Response, endpoint: &str) -> Result<Response, FetchError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let body: String = body.chars().take(200).collect();
    Err(FetchError::Protocol(format!(
        "{} returned {}: {}",
        endpoint, status, body
    )))
}
