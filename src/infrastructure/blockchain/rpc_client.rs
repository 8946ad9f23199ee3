//! Solana RPC client for raw transaction submission

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use serde_json::json;
use solana_client::client_error::{ClientError, ClientErrorKind};
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_client::rpc_request::RpcRequest;
use solana_sdk::commitment_config::CommitmentConfig;
use std::time::Duration;
use tracing::info;

use super::TransactionSubmitter;
use crate::shared::errors::SubmitError;
use crate::shared::types::SubmissionId;

/// Solana RPC client wrapper
pub struct SolanaRpcClient {
    client: RpcClient,
    skip_preflight: bool,
}

impl SolanaRpcClient {
    /// Create new RPC client; every request is bounded by `timeout`
    pub fn new(rpc_url: String, timeout: Duration, skip_preflight: bool) -> Self {
        Self {
            client: RpcClient::new_with_timeout_and_commitment(
                rpc_url,
                timeout,
                CommitmentConfig::confirmed(),
            ),
            skip_preflight,
        }
    }
}

fn classify(err: ClientError) -> SubmitError {
    match err.kind() {
        ClientErrorKind::Io(_) | ClientErrorKind::Reqwest(_) => {
            SubmitError::Transport(err.to_string())
        }
        _ => SubmitError::Rejected(err.to_string()),
    }
}

#[async_trait]
impl TransactionSubmitter for SolanaRpcClient {
    async fn submit(&self, wire_transaction: &[u8]) -> Result<SubmissionId, SubmitError> {
        let params = json!([
            STANDARD.encode(wire_transaction),
            {
                "encoding": "base64",
                "skipPreflight": self.skip_preflight,
                "preflightCommitment": "confirmed",
            }
        ]);

        let signature: String = self
            .client
            .send(RpcRequest::SendTransaction, params)
            .await
            .map_err(classify)?;

        info!("🚀 Transaction submitted: {}", signature);
        Ok(SubmissionId(signature))
    }
}
