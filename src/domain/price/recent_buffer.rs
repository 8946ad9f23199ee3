//! Discovered-but-not-yet-priced assets shared by discovery and sampling

use std::collections::VecDeque;
use tokio::sync::RwLock;

use crate::shared::types::Asset;

/// Append-only at the tail; readers take copies of the most recent slice
#[derive(Default)]
pub struct RecentAssetBuffer {
    assets: RwLock<VecDeque<Asset>>,
}

impl RecentAssetBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn push(&self, asset: Asset) {
        self.assets.write().await.push_back(asset);
    }

    /// Append unless an asset with the same id is already buffered
    pub async fn push_if_absent(&self, asset: Asset) -> bool {
        let mut assets = self.assets.write().await;
        if assets.contains(&asset) {
            return false;
        }
        assets.push_back(asset);
        true
    }

    pub async fn extend<I>(&self, assets: I)
    where
        I: IntoIterator<Item = Asset>,
    {
        self.assets.write().await.extend(assets);
    }

    pub async fn len(&self) -> usize {
        self.assets.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.assets.read().await.is_empty()
    }

    /// Up to `n` most recent entries, oldest first
    pub async fn recent(&self, n: usize) -> Vec<Asset> {
        let assets = self.assets.read().await;
        let start = assets.len().saturating_sub(n);
        assets.range(start..).cloned().collect()
    }
}
