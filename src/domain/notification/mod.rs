//! Notification domain - subscribers, fan-out and message formats

mod subscriber_registry;
mod fanout;
pub mod messages;

pub use subscriber_registry::SubscriberRegistry;
pub use fanout::{FanoutReport, NotificationFanout};
