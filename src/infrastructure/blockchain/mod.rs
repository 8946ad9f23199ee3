//! Blockchain node access

pub mod rpc_client;

pub use rpc_client::SolanaRpcClient;

use async_trait::async_trait;
use crate::shared::errors::SubmitError;
use crate::shared::types::SubmissionId;

/// Accepts a serialized signed transaction and returns the node's acknowledgement
#[async_trait]
pub trait TransactionSubmitter: Send + Sync {
    async fn submit(&self, wire_transaction: &[u8]) -> Result<SubmissionId, SubmitError>;
}
