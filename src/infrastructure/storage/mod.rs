//! Durable key-value storage for snapshots, subscribers and user settings

pub mod file_store;
pub mod memory_store;

pub use file_store::FileStore;
pub use memory_store::MemoryStore;

use async_trait::async_trait;
use crate::shared::errors::StoreError;

/// Narrow byte store; the backend decides where values live
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a value, `None` when the key was never written
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Replace a value. Either the whole new value is stored or the old one is kept.
    async fn put(&self, key: &str, value: &[u8]) -> Result<(), StoreError>;
}
