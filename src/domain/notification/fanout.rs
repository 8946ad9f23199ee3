//! Best-effort delivery of one message to every subscriber

use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, warn};

use super::SubscriberRegistry;
use crate::infrastructure::messaging::MessageSender;

/// Delivery counts of one broadcast
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FanoutReport {
    pub delivered: usize,
    pub failed: usize,
}

/// Sends to each subscriber independently. One attempt per recipient, no retry.
pub struct NotificationFanout {
    sender: Arc<dyn MessageSender>,
    registry: Arc<SubscriberRegistry>,
}

impl NotificationFanout {
    pub fn new(sender: Arc<dyn MessageSender>, registry: Arc<SubscriberRegistry>) -> Self {
        Self { sender, registry }
    }

    pub async fn broadcast(&self, text: &str) -> FanoutReport {
        let recipients = self.registry.snapshot().await;
        let deliveries = recipients.iter().map(|chat_id| async move {
            let result = self.sender.send_message(*chat_id, text).await;
            if let Err(e) = &result {
                warn!("⚠️ {}", e);
            }
            result.is_ok()
        });

        let results = join_all(deliveries).await;
        let delivered = results.iter().filter(|ok| **ok).count();
        let report = FanoutReport {
            delivered,
            failed: results.len() - delivered,
        };
        debug!(delivered = report.delivered, failed = report.failed, "broadcast finished");
        report
    }
}
