//! Durable set of already-announced asset identifiers

use std::collections::HashSet;
use std::sync::Arc;

use crate::infrastructure::storage::KeyValueStore;
use crate::shared::errors::StoreError;

const SNAPSHOT_KEY: &str = "previous_token_ids";

pub struct SnapshotStore {
    store: Arc<dyn KeyValueStore>,
}

impl SnapshotStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Previously seen identifiers; no persisted state reads as the empty set
    pub async fn load(&self) -> Result<HashSet<String>, StoreError> {
        match self.store.get(SNAPSHOT_KEY).await? {
            Some(bytes) => {
                let ids: Vec<String> =
                    serde_json::from_slice(&bytes).map_err(|e| StoreError::Corrupt {
                        key: SNAPSHOT_KEY.to_string(),
                        reason: e.to_string(),
                    })?;
                Ok(ids.into_iter().collect())
            }
            None => Ok(HashSet::new()),
        }
    }

    /// Replace the whole set in one atomic write
    pub async fn replace(&self, ids: &HashSet<String>) -> Result<(), StoreError> {
        let mut sorted: Vec<&String> = ids.iter().collect();
        sorted.sort();
        let bytes = serde_json::to_vec(&sorted).map_err(|e| StoreError::Corrupt {
            key: SNAPSHOT_KEY.to_string(),
            reason: e.to_string(),
        })?;
        self.store.put(SNAPSHOT_KEY, &bytes).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::storage::MemoryStore;

    fn ids(values: &[&str]) -> HashSet<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_absent_snapshot_is_empty() {
        let snapshot = SnapshotStore::new(Arc::new(MemoryStore::new()));
        assert!(snapshot.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_replace_shrinks_the_set() {
        let snapshot = SnapshotStore::new(Arc::new(MemoryStore::new()));
        snapshot.replace(&ids(&["A", "B", "C"])).await.unwrap();
        snapshot.replace(&ids(&["A"])).await.unwrap();
        assert_eq!(snapshot.load().await.unwrap(), ids(&["A"]));
    }

    #[tokio::test]
    async fn test_reads_legacy_json_list() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        store.put("previous_token_ids", br#"["B", "A", "B"]"#).await.unwrap();
        let snapshot = SnapshotStore::new(store);
        assert_eq!(snapshot.load().await.unwrap(), ids(&["A", "B"]));
    }

    #[tokio::test]
    async fn test_corrupt_snapshot_is_an_error() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        store.put("previous_token_ids", b"{oops").await.unwrap();
        let snapshot = SnapshotStore::new(store);
        assert!(matches!(snapshot.load().await, Err(StoreError::Corrupt { .. })));
    }
}
