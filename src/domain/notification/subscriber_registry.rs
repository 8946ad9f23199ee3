//! Thread-safe set of notification recipients

use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

use crate::infrastructure::storage::KeyValueStore;
use crate::shared::errors::StoreError;
use crate::shared::types::ChatId;

const SUBSCRIBERS_KEY: &str = "subscribers";

/// Subscribers are only ever added; there is no unsubscribe path
pub struct SubscriberRegistry {
    subscribers: RwLock<BTreeSet<ChatId>>,
    store: Arc<dyn KeyValueStore>,
}

impl SubscriberRegistry {
    /// Load the persisted set; a missing entry starts an empty registry
    pub async fn load(store: Arc<dyn KeyValueStore>) -> Result<Self, StoreError> {
        let subscribers = match store.get(SUBSCRIBERS_KEY).await? {
            Some(bytes) => serde_json::from_slice(&bytes).map_err(|e| StoreError::Corrupt {
                key: SUBSCRIBERS_KEY.to_string(),
                reason: e.to_string(),
            })?,
            None => BTreeSet::new(),
        };
        Ok(Self {
            subscribers: RwLock::new(subscribers),
            store,
        })
    }

    /// Add a subscriber; returns `false` when it was already present
    pub async fn add(&self, chat_id: ChatId) -> Result<bool, StoreError> {
        let mut subscribers = self.subscribers.write().await;
        if !subscribers.insert(chat_id) {
            return Ok(false);
        }

        let bytes = serde_json::to_vec(&*subscribers).map_err(|e| StoreError::Corrupt {
            key: SUBSCRIBERS_KEY.to_string(),
            reason: e.to_string(),
        })?;
        if let Err(e) = self.store.put(SUBSCRIBERS_KEY, &bytes).await {
            subscribers.remove(&chat_id);
            return Err(e);
        }

        info!("👤 New subscriber {} ({} total)", chat_id, subscribers.len());
        Ok(true)
    }

    /// Point-in-time copy for fan-out
    pub async fn snapshot(&self) -> Vec<ChatId> {
        self.subscribers.read().await.iter().copied().collect()
    }

    pub async fn len(&self) -> usize {
        self.subscribers.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.subscribers.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::storage::MemoryStore;

    #[tokio::test]
    async fn test_add_is_idempotent() {
        let registry = SubscriberRegistry::load(Arc::new(MemoryStore::new())).await.unwrap();
        assert!(registry.add(ChatId(1)).await.unwrap());
        assert!(!registry.add(ChatId(1)).await.unwrap());
        assert!(registry.add(ChatId(2)).await.unwrap());
        assert_eq!(registry.snapshot().await, vec![ChatId(1), ChatId(2)]);
    }

    #[tokio::test]
    async fn test_subscribers_survive_reload() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let registry = SubscriberRegistry::load(store.clone()).await.unwrap();
        registry.add(ChatId(42)).await.unwrap();
        registry.add(ChatId(-100)).await.unwrap();

        let reloaded = SubscriberRegistry::load(store).await.unwrap();
        assert_eq!(reloaded.snapshot().await, vec![ChatId(-100), ChatId(42)]);
    }

    #[tokio::test]
    async fn test_corrupt_state_is_reported() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        store.put("subscribers", b"not json").await.unwrap();
        assert!(matches!(
            SubscriberRegistry::load(store).await,
            Err(StoreError::Corrupt { .. })
        ));
    }
}
