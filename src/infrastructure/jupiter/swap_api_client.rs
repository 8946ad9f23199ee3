use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use solana_sdk::pubkey::Pubkey;
use tracing::{debug, info};

use super::{ensure_success, QuoteParams, SwapApi};
use crate::shared::errors::FetchError;

/// Quote returned by the aggregator.
///
/// Only the amounts are read here; every other field is kept verbatim so the
/// quote can be posted back to the swap-build endpoint unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteResponse {
    pub input_mint: String,
    pub output_mint: String,
    pub in_amount: String,
    pub out_amount: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SwapBuildRequest<'a> {
    quote_response: &'a QuoteResponse,
    user_public_key: String,
    wrap_and_unwrap_sol: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SwapBuildResponse {
    swap_transaction: Option<String>,
    error: Option<String>,
}

/// Jupiter v6 quote and swap-build client
pub struct SwapApiClient {
    http_client: Client,
    quote_url: String,
    swap_url: String,
}

impl SwapApiClient {
    pub fn new(http_client: Client, quote_url: impl Into<String>, swap_url: impl Into<String>) -> Self {
        Self {
            http_client,
            quote_url: quote_url.into(),
            swap_url: swap_url.into(),
        }
    }
}

/// The aggregator reports some failures as `{"error": "..."}` bodies
fn error_payload(value: &Value) -> Option<String> {
    value
        .get("error")
        .map(|e| e.as_str().map(str::to_string).unwrap_or_else(|| e.to_string()))
}

fn parse_quote(body: &[u8]) -> Result<QuoteResponse, FetchError> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| FetchError::Protocol(format!("malformed quote payload: {}", e)))?;
    if let Some(error) = error_payload(&value) {
        return Err(FetchError::Protocol(format!("quote rejected: {}", error)));
    }
    serde_json::from_value(value)
        .map_err(|e| FetchError::Protocol(format!("unexpected quote shape: {}", e)))
}

fn parse_swap_build(body: &[u8]) -> Result<String, FetchError> {
    let response: SwapBuildResponse = serde_json::from_slice(body)
        .map_err(|e| FetchError::Protocol(format!("malformed swap payload: {}", e)))?;
    if let Some(error) = response.error {
        return Err(FetchError::Protocol(format!("swap build rejected: {}", error)));
    }
    response
        .swap_transaction
        .ok_or_else(|| FetchError::Protocol("swap payload missing 'swapTransaction'".to_string()))
}

#[async_trait]
impl SwapApi for SwapApiClient {
    async fn quote(&self, params: &QuoteParams) -> Result<QuoteResponse, FetchError> {
        debug!(
            input_mint = %params.input_mint,
            output_mint = %params.output_mint,
            amount = params.amount,
            slippage_bps = params.slippage_bps,
            "Requesting quote"
        );

        let response = self
            .http_client
            .get(&self.quote_url)
            .query(&[
                ("inputMint", params.input_mint.clone()),
                ("outputMint", params.output_mint.clone()),
                ("amount", params.amount.to_string()),
                ("slippageBps", params.slippage_bps.to_string()),
            ])
            .send()
            .await?;
        let response = ensure_success(response, "quote").await?;
        let quote = parse_quote(&response.bytes().await?)?;

        info!("💱 Quote: {} {} → {} {}", quote.in_amount, quote.input_mint, quote.out_amount, quote.output_mint);
        Ok(quote)
    }

    async fn build_swap(
        &self,
        quote: &QuoteResponse,
        user_public_key: &Pubkey,
        wrap_and_unwrap_sol: bool,
    ) -> Result<String, FetchError> {
        let request = SwapBuildRequest {
            quote_response: quote,
            user_public_key: user_public_key.to_string(),
            wrap_and_unwrap_sol,
        };

        let response = self.http_client.post(&self.swap_url).json(&request).send().await?;
        let response = ensure_success(response, "swap").await?;
        parse_swap_build(&response.bytes().await?)
    }
}
