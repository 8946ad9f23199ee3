//! In-memory fakes behind the infrastructure traits

use async_trait::async_trait;
use solana_sdk::pubkey::Pubkey;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::infrastructure::blockchain::TransactionSubmitter;
use crate::infrastructure::jupiter::{ListingSource, PriceSource, QuoteParams, QuoteResponse, SwapApi};
use crate::infrastructure::messaging::MessageSender;
use crate::shared::errors::{FetchError, NotifyError, SubmitError};
use crate::shared::types::{Asset, ChatId, PriceQuote, SubmissionId};

pub fn asset(id: &str, symbol: &str) -> Asset {
    Asset::new(id, symbol, Some(format!("{} Token", symbol)))
}

/// Records every delivery; recipients in `failing` raise an error
#[derive(Default)]
pub struct RecordingSender {
    pub sent: Mutex<Vec<(ChatId, String)>>,
    pub failing: HashSet<ChatId>,
}

impl RecordingSender {
    pub fn failing_for(chats: &[i64]) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            failing: chats.iter().copied().map(ChatId).collect(),
        }
    }

    pub fn messages(&self) -> Vec<(ChatId, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessageSender for RecordingSender {
    async fn send_message(&self, chat_id: ChatId, text: &str) -> Result<(), NotifyError> {
        if self.failing.contains(&chat_id) {
            return Err(NotifyError::DeliveryFailed {
                chat_id: chat_id.0,
                reason: "blocked".to_string(),
            });
        }
        self.sent.lock().unwrap().push((chat_id, text.to_string()));
        Ok(())
    }
}

/// Returns queued listing results in order
#[derive(Default)]
pub struct ScriptedListing {
    responses: Mutex<VecDeque<Result<Vec<Asset>, FetchError>>>,
}

impl ScriptedListing {
    pub fn new(responses: Vec<Result<Vec<Asset>, FetchError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
        }
    }
}

#[async_trait]
impl ListingSource for ScriptedListing {
    async fn fetch_universe(&self) -> Result<Vec<Asset>, FetchError> {
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(FetchError::Transport("no scripted response".to_string())))
    }
}

/// Prices keyed by symbol; unknown symbols fail with a protocol error
#[derive(Default)]
pub struct FixedPrices {
    pub prices: HashMap<String, f64>,
    pub requested: Mutex<Vec<String>>,
}

impl FixedPrices {
    pub fn new(prices: &[(&str, f64)]) -> Self {
        Self {
            prices: prices.iter().map(|(s, p)| (s.to_string(), *p)).collect(),
            requested: Mutex::new(Vec::new()),
        }
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl PriceSource for FixedPrices {
    async fn price_for(&self, symbol: &str) -> Result<PriceQuote, FetchError> {
        self.requested.lock().unwrap().push(symbol.to_string());
        match self.prices.get(symbol) {
            Some(price) => Ok(PriceQuote {
                price: *price,
                base_symbol: "SOL".to_string(),
                quote_symbol: symbol.to_string(),
            }),
            None => Err(FetchError::Protocol(format!("price endpoint returned 500 for {}", symbol))),
        }
    }
}

/// Swap API returning fixed results and counting calls per step
pub struct ScriptedSwapApi {
    pub quote_result: Result<QuoteResponse, FetchError>,
    pub build_result: Result<String, FetchError>,
    pub quote_calls: AtomicUsize,
    pub build_calls: AtomicUsize,
    pub last_wrap_flag: Mutex<Option<bool>>,
}

impl ScriptedSwapApi {
    pub fn new(
        quote_result: Result<QuoteResponse, FetchError>,
        build_result: Result<String, FetchError>,
    ) -> Self {
        Self {
            quote_result,
            build_result,
            quote_calls: AtomicUsize::new(0),
            build_calls: AtomicUsize::new(0),
            last_wrap_flag: Mutex::new(None),
        }
    }

    pub fn build_calls(&self) -> usize {
        self.build_calls.load(Ordering::SeqCst)
    }
}

pub fn sample_quote(input_mint: &str, output_mint: &str) -> QuoteResponse {
    QuoteResponse {
        input_mint: input_mint.to_string(),
        output_mint: output_mint.to_string(),
        in_amount: "1000".to_string(),
        out_amount: "2000".to_string(),
        extra: Default::default(),
    }
}

#[async_trait]
impl SwapApi for ScriptedSwapApi {
    async fn quote(&self, _params: &QuoteParams) -> Result<QuoteResponse, FetchError> {
        self.quote_calls.fetch_add(1, Ordering::SeqCst);
        self.quote_result.clone()
    }

    async fn build_swap(
        &self,
        _quote: &QuoteResponse,
        _user_public_key: &Pubkey,
        wrap_and_unwrap_sol: bool,
    ) -> Result<String, FetchError> {
        self.build_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_wrap_flag.lock().unwrap() = Some(wrap_and_unwrap_sol);
        self.build_result.clone()
    }
}

/// Records submitted wire transactions
pub struct RecordingSubmitter {
    pub submitted: Mutex<Vec<Vec<u8>>>,
    pub result: Result<SubmissionId, SubmitError>,
}

impl RecordingSubmitter {
    pub fn accepting(signature: &str) -> Self {
        Self {
            submitted: Mutex::new(Vec::new()),
            result: Ok(SubmissionId(signature.to_string())),
        }
    }

    pub fn rejecting(reason: &str) -> Self {
        Self {
            submitted: Mutex::new(Vec::new()),
            result: Err(SubmitError::Rejected(reason.to_string())),
        }
    }

    pub fn submissions(&self) -> usize {
        self.submitted.lock().unwrap().len()
    }
}

#[async_trait]
impl TransactionSubmitter for RecordingSubmitter {
    async fn submit(&self, wire_transaction: &[u8]) -> Result<SubmissionId, SubmitError> {
        self.submitted.lock().unwrap().push(wire_transaction.to_vec());
        self.result.clone()
    }
}
