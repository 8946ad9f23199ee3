//! Chat front-end access

pub mod telegram;

pub use telegram::{TelegramBot, Update};

use async_trait::async_trait;
use crate::shared::errors::NotifyError;
use crate::shared::types::ChatId;

/// Delivers one text message to one recipient
#[async_trait]
pub trait MessageSender: Send + Sync {
    async fn send_message(&self, chat_id: ChatId, text: &str) -> Result<(), NotifyError>;
}
