//! Telegram Bot API client (sendMessage / getUpdates)

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::MessageSender;
use crate::shared::errors::{FetchError, NotifyError};
use crate::shared::types::ChatId;

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: i64,
    text: &'a str,
    parse_mode: &'static str,
    disable_web_page_preview: bool,
}

/// Incoming update; only text messages are kept
#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<IncomingMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IncomingMessage {
    pub chat: Chat,
    pub from: Option<User>,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
}

/// Telegram bot bound to one token
pub struct TelegramBot {
    http_client: Client,
    api_base: String,
}

impl TelegramBot {
    pub fn new(http_client: Client, api_url: &str, token: &str) -> Self {
        Self {
            http_client,
            api_base: format!("{}/bot{}", api_url.trim_end_matches('/'), token),
        }
    }

    /// Long-poll for updates after `offset`; the request outlives the poll window by a margin
    pub async fn get_updates(&self, offset: i64, poll_timeout: Duration) -> Result<Vec<Update>, FetchError> {
        let timeout_secs = poll_timeout.as_secs();
        let response = self
            .http_client
            .get(format!("{}/getUpdates", self.api_base))
            .query(&[
                ("offset", offset.to_string()),
                ("timeout", timeout_secs.to_string()),
                ("allowed_updates", "[\"message\"]".to_string()),
            ])
            .timeout(poll_timeout + Duration::from_secs(10))
            .send()
            .await?;

        let body: ApiResponse<Vec<Update>> = response.json().await?;
        if !body.ok {
            return Err(FetchError::Protocol(
                body.description.unwrap_or_else(|| "getUpdates failed".to_string()),
            ));
        }
        Ok(body.result.unwrap_or_default())
    }
}

#[async_trait]
impl MessageSender for TelegramBot {
    async fn send_message(&self, chat_id: ChatId, text: &str) -> Result<(), NotifyError> {
        let failed = |reason: String| NotifyError::DeliveryFailed {
            chat_id: chat_id.0,
            reason,
        };

        let request = SendMessageRequest {
            chat_id: chat_id.0,
            text,
            parse_mode: "MarkdownV2",
            disable_web_page_preview: true,
        };
        let response = self
            .http_client
            .post(format!("{}/sendMessage", self.api_base))
            .json(&request)
            .send()
            .await
            .map_err(|e| failed(e.without_url().to_string()))?;

        let body: ApiResponse<serde_json::Value> = response
            .json()
            .await
            .map_err(|e| failed(e.without_url().to_string()))?;
        if !body.ok {
            return Err(failed(body.description.unwrap_or_else(|| "unknown error".to_string())));
        }

        debug!(chat_id = chat_id.0, "message delivered");
        Ok(())
    }
}
