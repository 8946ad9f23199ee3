//! Chat command intake: `/start` subscribes, `/swap <mint>` trades

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::domain::execution::SwapExecutor;
use crate::domain::notification::{messages, SubscriberRegistry};
use crate::domain::settings::SettingsStore;
use crate::infrastructure::messaging::{MessageSender, TelegramBot, Update};
use crate::shared::errors::SettingsError;
use crate::shared::types::ChatId;

const POLL_RETRY_DELAY: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    Start,
    Swap { output_mint: String },
    /// `/swap` without an argument
    SwapUsage,
}

/// Recognise a bot command, tolerating the `@botname` suffix group chats add
pub fn parse_command(text: &str) -> Option<ChatCommand> {
    let mut parts = text.split_whitespace();
    let head = parts.next()?;
    let command = head.split('@').next().unwrap_or(head);
    match command {
        "/start" => Some(ChatCommand::Start),
        "/swap" => Some(match parts.next() {
            Some(mint) => ChatCommand::Swap {
                output_mint: mint.to_string(),
            },
            None => ChatCommand::SwapUsage,
        }),
        _ => None,
    }
}

pub struct ChatIntake {
    replies: Arc<dyn MessageSender>,
    registry: Arc<SubscriberRegistry>,
    settings: Arc<SettingsStore>,
    executor: Arc<SwapExecutor>,
}

impl ChatIntake {
    pub fn new(
        replies: Arc<dyn MessageSender>,
        registry: Arc<SubscriberRegistry>,
        settings: Arc<SettingsStore>,
        executor: Arc<SwapExecutor>,
    ) -> Self {
        Self {
            replies,
            registry,
            settings,
            executor,
        }
    }

    /// Long-poll the bot forever; poll failures are retried after a short pause
    pub async fn run(self: Arc<Self>, bot: Arc<TelegramBot>, poll_timeout: Duration) {
        info!("💬 Listening for chat commands");
        let mut offset = 0;
        loop {
            match bot.get_updates(offset, poll_timeout).await {
                Ok(updates) => {
                    for update in updates {
                        offset = offset.max(update.update_id + 1);
                        self.handle_update(update).await;
                    }
                }
                Err(e) => {
                    warn!("⚠️ Failed to poll chat updates: {}", e);
                    tokio::time::sleep(POLL_RETRY_DELAY).await;
                }
            }
        }
    }

    /// Handle one update. Swaps run in their own task, whose handle is returned.
    pub async fn handle_update(self: &Arc<Self>, update: Update) -> Option<JoinHandle<()>> {
        let message = update.message?;
        let command = parse_command(message.text.as_deref()?)?;
        let chat = ChatId(message.chat.id);
        let user_id = message.from.map(|u| u.id).unwrap_or(message.chat.id);
        debug!(chat = chat.0, user = user_id, ?command, "chat command");

        match command {
            ChatCommand::Start => {
                if let Err(e) = self.registry.add(chat).await {
                    warn!("⚠️ Failed to persist subscriber {}: {}", chat, e);
                }
                self.reply(chat, &messages::welcome_message()).await;
                None
            }
            ChatCommand::SwapUsage => {
                self.reply(chat, &messages::swap_usage_message()).await;
                None
            }
            ChatCommand::Swap { output_mint } => {
                let intake = Arc::clone(self);
                Some(tokio::spawn(async move {
                    intake.swap_for(chat, user_id, &output_mint).await;
                }))
            }
        }
    }

    async fn swap_for(&self, chat: ChatId, user_id: i64, output_mint: &str) {
        let request = match self.settings.require_swap_settings(user_id).await {
            Ok(settings) => settings.into_request(output_mint, None),
            Err(e) => Err(e),
        };
        let request = match request {
            Ok(request) => request,
            Err(SettingsError::Missing(_)) => {
                self.reply(chat, &messages::swap_settings_missing_message()).await;
                return;
            }
            Err(e) => {
                warn!("⚠️ Cannot prepare swap for user {}: {}", user_id, e);
                self.reply(chat, &messages::swap_failed_message("settings", &e.to_string()))
                    .await;
                return;
            }
        };

        let reply = match self.executor.execute_swap(request).await {
            Ok(id) => messages::swap_submitted_message(&id.0),
            Err(e) => {
                warn!("❌ Swap for user {} failed at {}: {}", user_id, e.kind(), e);
                messages::swap_failed_message(e.kind(), &e.to_string())
            }
        };
        self.reply(chat, &reply).await;
    }

    async fn reply(&self, chat: ChatId, text: &str) {
        if let Err(e) = self.replies.send_message(chat, text).await {
            warn!("⚠️ Reply not delivered: {}", e);
        }
    }
}
