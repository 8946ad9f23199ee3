//! Periodic price digest for recently discovered assets

use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};

use super::RecentAssetBuffer;
use crate::domain::notification::{messages, NotificationFanout};
use crate::infrastructure::jupiter::PriceSource;
use crate::shared::config::SamplingCfg;

/// Why a cycle did not sample
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Empty,
    /// Buffer reached the high-water mark
    Saturated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamplingReport {
    Skipped(SkipReason),
    Sent { priced: usize, failed: usize },
}

pub struct PriceSamplingJob {
    prices: Arc<dyn PriceSource>,
    buffer: Arc<RecentAssetBuffer>,
    fanout: Arc<NotificationFanout>,
    window: usize,
    high_water_mark: usize,
}

impl PriceSamplingJob {
    pub fn new(
        prices: Arc<dyn PriceSource>,
        buffer: Arc<RecentAssetBuffer>,
        fanout: Arc<NotificationFanout>,
        policy: &SamplingCfg,
    ) -> Self {
        Self {
            prices,
            buffer,
            fanout,
            window: policy.window,
            high_water_mark: policy.high_water_mark,
        }
    }

    pub async fn run_cycle(&self) -> SamplingReport {
        let buffered = self.buffer.len().await;
        if buffered == 0 {
            return SamplingReport::Skipped(SkipReason::Empty);
        }
        if buffered >= self.high_water_mark {
            warn!(
                buffered,
                high_water_mark = self.high_water_mark,
                "Recent asset buffer saturated, skipping price sampling"
            );
            return SamplingReport::Skipped(SkipReason::Saturated);
        }

        let sample = self.buffer.recent(self.window).await;
        let mut quotes = Vec::with_capacity(sample.len());
        let mut failed = 0;

        for asset in &sample {
            match self.prices.price_for(&asset.symbol).await {
                Ok(quote) => quotes.push(quote),
                Err(e) => {
                    failed += 1;
                    warn!("⚠️ Failed to fetch price for {} ({}): {}", asset.symbol, asset.id, e);
                }
            }
        }

        let digest = messages::price_digest_message(&quotes, Utc::now());
        let delivery = self.fanout.broadcast(&digest).await;

        info!(
            "💰 Price digest sent: {} priced, {} failed, {} recipients",
            quotes.len(),
            failed,
            delivery.delivered
        );
        SamplingReport::Sent {
            priced: quotes.len(),
            failed,
        }
    }
}
