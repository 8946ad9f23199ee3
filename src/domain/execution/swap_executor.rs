//! On-demand swap: quote, build, decode, sign and submit

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use solana_sdk::signature::{Keypair, Signer};
use solana_sdk::transaction::VersionedTransaction;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::infrastructure::blockchain::TransactionSubmitter;
use crate::infrastructure::jupiter::{QuoteParams, SwapApi};
use crate::shared::errors::{SubmitError, SwapError};
use crate::shared::types::{KeyMaterial, SubmissionId, SwapRequest};

pub type SwapOutcome = Result<SubmissionId, SwapError>;

/// Runs the swap pipeline for one request at a time per call.
///
/// Every step short-circuits on failure, so a failed quote never reaches the
/// build endpoint and an unsigned transaction never reaches the node.
pub struct SwapExecutor {
    api: Arc<dyn SwapApi>,
    submitter: Arc<dyn TransactionSubmitter>,
}

impl SwapExecutor {
    pub fn new(api: Arc<dyn SwapApi>, submitter: Arc<dyn TransactionSubmitter>) -> Self {
        Self { api, submitter }
    }

    pub async fn execute_swap(&self, request: SwapRequest) -> SwapOutcome {
        info!(
            "🔄 Swap requested: {} {} -> {} ({} bps)",
            request.amount_in, request.input_mint, request.output_mint, request.slippage_bps
        );

        let params = QuoteParams {
            input_mint: request.input_mint.clone(),
            output_mint: request.output_mint.clone(),
            amount: request.amount_in,
            slippage_bps: request.slippage_bps,
        };
        let quote = self.api.quote(&params).await.map_err(SwapError::Quote)?;
        debug!(in_amount = %quote.in_amount, out_amount = %quote.out_amount, "quote received");

        let encoded = self
            .api
            .build_swap(&quote, &request.user_public_key, request.touches_native_mint())
            .await
            .map_err(SwapError::Build)?;

        let unsigned = decode_transaction(&encoded)?;
        let signed = sign_transaction(unsigned, &request)?;
        let wire = encode_transaction(&signed)?;

        match self.submitter.submit(&wire).await {
            Ok(id) => {
                info!("✅ Swap submitted: {}", id);
                Ok(id)
            }
            Err(e) => {
                warn!("❌ Swap submission failed: {}", e);
                Err(SwapError::Submit(e))
            }
        }
    }
}

/// Base64 transport payload to an unsigned versioned transaction
pub fn decode_transaction(encoded: &str) -> Result<VersionedTransaction, SwapError> {
    let bytes = STANDARD
        .decode(encoded.trim())
        .map_err(|e| SwapError::Decode(e.to_string()))?;
    bincode::deserialize::<VersionedTransaction>(&bytes).map_err(|e| SwapError::Deserialize(e.to_string()))
}

/// Signed transaction to wire bytes; a failure here belongs to the submit step
pub fn encode_transaction(signed: &VersionedTransaction) -> Result<Vec<u8>, SwapError> {
    bincode::serialize(signed).map_err(|e| SwapError::Submit(SubmitError::Encode(e.to_string())))
}

fn keypair_from(material: &KeyMaterial) -> Result<Keypair, SwapError> {
    Keypair::from_bytes(material.as_bytes())
        .map_err(|_| SwapError::Signing("key material is not a valid ed25519 keypair".to_string()))
}

/// Re-sign the transaction message with the requester's key
fn sign_transaction(
    unsigned: VersionedTransaction,
    request: &SwapRequest,
) -> Result<VersionedTransaction, SwapError> {
    let keypair = keypair_from(&request.key_material)?;
    if keypair.pubkey() != request.user_public_key {
        return Err(SwapError::Signing(format!(
            "key material does not belong to {}",
            request.user_public_key
        )));
    }
    VersionedTransaction::try_new(unsigned.message, &[&keypair])
        .map_err(|e| SwapError::Signing(e.to_string()))
}
