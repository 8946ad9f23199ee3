//! New listing detection against the persisted snapshot

use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};

use super::SnapshotStore;
use crate::domain::notification::{messages, NotificationFanout};
use crate::domain::price::RecentAssetBuffer;
use crate::infrastructure::jupiter::ListingSource;
use crate::shared::errors::DiscoveryError;
use crate::shared::types::Asset;

/// Outcome of one successful discovery cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryReport {
    pub universe_size: usize,
    pub new_assets: Vec<Asset>,
    pub snapshot_updated: bool,
}

pub struct AssetDiscoveryJob {
    listing: Arc<dyn ListingSource>,
    snapshot: SnapshotStore,
    buffer: Arc<RecentAssetBuffer>,
    fanout: Arc<NotificationFanout>,
}

/// Assets of `current` absent from `previous`, in listing order, each id once
pub fn new_assets(current: &[Asset], previous: &HashSet<String>) -> Vec<Asset> {
    let mut seen = HashSet::new();
    current
        .iter()
        .filter(|asset| !previous.contains(&asset.id) && seen.insert(asset.id.as_str()))
        .cloned()
        .collect()
}

impl AssetDiscoveryJob {
    pub fn new(
        listing: Arc<dyn ListingSource>,
        snapshot: SnapshotStore,
        buffer: Arc<RecentAssetBuffer>,
        fanout: Arc<NotificationFanout>,
    ) -> Self {
        Self {
            listing,
            snapshot,
            buffer,
            fanout,
        }
    }

    /// Fetch, diff, notify, then replace the snapshot.
    ///
    /// A failed fetch or snapshot load returns before anything is notified or
    /// written. The snapshot is replaced only after every new asset has been
    /// announced.
    pub async fn run_cycle(&self) -> Result<DiscoveryReport, DiscoveryError> {
        let current = self.listing.fetch_universe().await?;
        let previous = self.snapshot.load().await?;

        let fresh = new_assets(&current, &previous);
        if !fresh.is_empty() {
            info!("🌟 {} new assets detected", fresh.len());
        }

        for asset in &fresh {
            // Still buffered when the previous cycle failed to persist the snapshot
            self.buffer.push_if_absent(asset.clone()).await;
            let report = self.fanout.broadcast(&messages::new_asset_message(asset)).await;
            debug!(
                id = %asset.id,
                symbol = %asset.symbol,
                delivered = report.delivered,
                failed = report.failed,
                "announced new asset"
            );
        }

        let current_ids: HashSet<String> = current.iter().map(|a| a.id.clone()).collect();
        let snapshot_updated = current_ids != previous;
        if snapshot_updated {
            self.snapshot.replace(&current_ids).await?;
            debug!(size = current_ids.len(), "snapshot replaced");
        }

        Ok(DiscoveryReport {
            universe_size: current_ids.len(),
            new_assets: fresh,
            snapshot_updated,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::notification::SubscriberRegistry;
    use crate::infrastructure::storage::{KeyValueStore, MemoryStore};
    use crate::shared::errors::{FetchError, StoreError};
    use crate::shared::test_support::{asset, RecordingSender, ScriptedListing};
    use crate::shared::types::ChatId;
    use async_trait::async_trait;

    struct Harness {
        job: AssetDiscoveryJob,
        snapshot: SnapshotStore,
        buffer: Arc<RecentAssetBuffer>,
        sender: Arc<RecordingSender>,
    }

    async fn harness(
        responses: Vec<Result<Vec<Asset>, FetchError>>,
        store: Arc<dyn KeyValueStore>,
    ) -> Harness {
        let registry = SubscriberRegistry::load(Arc::new(MemoryStore::new())).await.unwrap();
        registry.add(ChatId(7)).await.unwrap();
        let sender = Arc::new(RecordingSender::default());
        let fanout = Arc::new(NotificationFanout::new(sender.clone(), Arc::new(registry)));
        let buffer = Arc::new(RecentAssetBuffer::new());
        let job = AssetDiscoveryJob::new(
            Arc::new(ScriptedListing::new(responses)),
            SnapshotStore::new(store.clone()),
            buffer.clone(),
            fanout,
        );
        Harness {
            job,
            snapshot: SnapshotStore::new(store),
            buffer,
            sender,
        }
    }

    fn ids(values: &[&str]) -> HashSet<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_announces_only_new_assets() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let h = harness(vec![Ok(vec![asset("A", "sym1"), asset("B", "sym2")])], store).await;
        h.snapshot.replace(&ids(&["A"])).await.unwrap();

        let report = h.job.run_cycle().await.unwrap();

        assert_eq!(report.new_assets, vec![asset("B", "sym2")]);
        let messages = h.sender.messages();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].1.contains("`B`"));
        assert_eq!(h.snapshot.load().await.unwrap(), ids(&["A", "B"]));
        assert_eq!(h.buffer.recent(30).await, vec![asset("B", "sym2")]);
    }

    #[tokio::test]
    async fn test_failed_fetch_leaves_snapshot_untouched() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let h = harness(vec![Err(FetchError::Protocol("503".to_string()))], store).await;
        h.snapshot.replace(&ids(&["A", "B"])).await.unwrap();

        let err = h.job.run_cycle().await.unwrap_err();

        assert!(matches!(err, DiscoveryError::Fetch(_)));
        assert_eq!(h.snapshot.load().await.unwrap(), ids(&["A", "B"]));
        assert!(h.sender.messages().is_empty());
        assert!(h.buffer.is_empty().await);
    }

    #[tokio::test]
    async fn test_shrinking_universe_is_reflected() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let h = harness(vec![Ok(vec![asset("A", "sym1")])], store).await;
        h.snapshot.replace(&ids(&["A", "B", "C"])).await.unwrap();

        let report = h.job.run_cycle().await.unwrap();

        assert!(report.new_assets.is_empty());
        assert!(report.snapshot_updated);
        assert!(h.sender.messages().is_empty());
        assert_eq!(h.snapshot.load().await.unwrap(), ids(&["A"]));
    }

    #[tokio::test]
    async fn test_first_run_announces_whole_universe() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let h = harness(
            vec![
                Ok(vec![asset("A", "a"), asset("B", "b"), asset("A", "a")]),
                Ok(vec![asset("A", "a"), asset("B", "b")]),
            ],
            store,
        )
        .await;

        let first = h.job.run_cycle().await.unwrap();
        assert_eq!(first.new_assets.len(), 2);
        assert_eq!(h.sender.messages().len(), 2);

        let second = h.job.run_cycle().await.unwrap();
        assert!(second.new_assets.is_empty());
        assert!(!second.snapshot_updated);
        assert_eq!(h.sender.messages().len(), 2);
    }

    /// Store whose writes fail and which reports when a write was attempted
    struct FailingWrites {
        inner: MemoryStore,
        sender: Arc<RecordingSender>,
        messages_at_write: std::sync::Mutex<Option<usize>>,
    }

    #[async_trait]
    impl KeyValueStore for FailingWrites {
        async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
            self.inner.get(key).await
        }

        async fn put(&self, key: &str, _value: &[u8]) -> Result<(), StoreError> {
            *self.messages_at_write.lock().unwrap() = Some(self.sender.messages().len());
            Err(StoreError::Io {
                key: key.to_string(),
                source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
            })
        }
    }

    /// Store whose first write fails
    struct FirstWriteFails {
        inner: MemoryStore,
        failed_once: std::sync::atomic::AtomicBool,
    }

    #[async_trait]
    impl KeyValueStore for FirstWriteFails {
        async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
            self.inner.get(key).await
        }

        async fn put(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
            if !self.failed_once.swap(true, std::sync::atomic::Ordering::SeqCst) {
                return Err(StoreError::Io {
                    key: key.to_string(),
                    source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
                });
            }
            self.inner.put(key, value).await
        }
    }

    #[tokio::test]
    async fn test_retry_after_failed_write_does_not_rebuffer() {
        let store: Arc<dyn KeyValueStore> = Arc::new(FirstWriteFails {
            inner: MemoryStore::new(),
            failed_once: std::sync::atomic::AtomicBool::new(false),
        });
        let h = harness(
            vec![Ok(vec![asset("A", "a")]), Ok(vec![asset("A", "a")])],
            store,
        )
        .await;

        assert!(matches!(h.job.run_cycle().await, Err(DiscoveryError::Snapshot(_))));
        let retry = h.job.run_cycle().await.unwrap();

        assert_eq!(retry.new_assets, vec![asset("A", "a")]);
        assert_eq!(h.sender.messages().len(), 2);
        assert_eq!(h.buffer.len().await, 1);
        assert_eq!(h.snapshot.load().await.unwrap(), ids(&["A"]));
    }

    #[tokio::test]
    async fn test_snapshot_written_after_all_notifications() {
        let registry = SubscriberRegistry::load(Arc::new(MemoryStore::new())).await.unwrap();
        registry.add(ChatId(7)).await.unwrap();
        let sender = Arc::new(RecordingSender::default());
        let store = Arc::new(FailingWrites {
            inner: MemoryStore::new(),
            sender: sender.clone(),
            messages_at_write: std::sync::Mutex::new(None),
        });
        let job = AssetDiscoveryJob::new(
            Arc::new(ScriptedListing::new(vec![Ok(vec![
                asset("A", "a"),
                asset("B", "b"),
                asset("C", "c"),
            ])])),
            SnapshotStore::new(store.clone()),
            Arc::new(RecentAssetBuffer::new()),
            Arc::new(NotificationFanout::new(sender.clone(), Arc::new(registry))),
        );

        let err = job.run_cycle().await.unwrap_err();

        assert!(matches!(err, DiscoveryError::Snapshot(_)));
        assert_eq!(*store.messages_at_write.lock().unwrap(), Some(3));
    }
}
