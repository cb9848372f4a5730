//! Telegram API client - Client HTTP per il Bot API
//!
//! Il resto del bot parla con la piattaforma solo attraverso il trait
//! [`BotApi`], così i test possono iniettare un doppione scriptato.

use crate::telegram::types::{
    ChatInviteLink, ChatMember, InlineKeyboardMarkup, Update, User,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Error reported by the platform itself. The description is what
    /// gets surfaced verbatim to the user.
    #[error("{0}")]
    Telegram(String),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}

/// The narrow platform interface: exactly the calls this bot needs.
#[async_trait]
pub trait BotApi: Send + Sync {
    async fn get_me(&self) -> Result<User, ApiError>;

    /// Long-polls for updates. `offset` is the id of the first update to
    /// return; updates below it are confirmed and dropped by the platform.
    async fn get_updates(&self, offset: i64, timeout_secs: u64) -> Result<Vec<Update>, ApiError>;

    async fn get_chat_member(&self, chat_id: i64, user_id: i64) -> Result<ChatMember, ApiError>;

    /// Mints a new invite link for the chat. The returned link carries the
    /// platform-confirmed expiry, which may differ from the requested one.
    async fn create_chat_invite_link(
        &self,
        chat_id: i64,
        expire_date: DateTime<Utc>,
        member_limit: u32,
    ) -> Result<ChatInviteLink, ApiError>;

    /// Sends a Markdown-formatted message, optionally with an inline keyboard.
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        reply_markup: Option<InlineKeyboardMarkup>,
    ) -> Result<(), ApiError>;
}

/// Response envelope comune a tutti i metodi del Bot API.
#[derive(serde::Deserialize)]
#[serde(bound(deserialize = "T: serde::Deserialize<'de>"))]
struct ApiResponse<T> {
    ok: bool,
    #[serde(default)]
    result: Option<T>,
    #[serde(default)]
    description: Option<String>,
}

pub struct TelegramApi {
    client: reqwest::Client,
    base_url: String,
}

impl TelegramApi {
    pub fn new(token: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: format!("https://api.telegram.org/bot{token}"),
        }
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        payload: serde_json::Value,
    ) -> Result<T, ApiError> {
        let response = self
            .client
            .post(format!("{}/{}", self.base_url, method))
            .json(&payload)
            .send()
            .await?;

        let envelope: ApiResponse<T> = response.json().await?;
        if envelope.ok {
            envelope
                .result
                .ok_or_else(|| ApiError::Telegram("empty result".to_string()))
        } else {
            Err(ApiError::Telegram(
                envelope
                    .description
                    .unwrap_or_else(|| "unknown platform error".to_string()),
            ))
        }
    }
}

#[async_trait]
impl BotApi for TelegramApi {
    async fn get_me(&self) -> Result<User, ApiError> {
        self.call("getMe", json!({})).await
    }

    async fn get_updates(&self, offset: i64, timeout_secs: u64) -> Result<Vec<Update>, ApiError> {
        // chat_member updates arrive only when explicitly requested
        self.call(
            "getUpdates",
            json!({
                "offset": offset,
                "timeout": timeout_secs,
                "allowed_updates": ["message", "edited_message", "chat_member"],
            }),
        )
        .await
    }

    async fn get_chat_member(&self, chat_id: i64, user_id: i64) -> Result<ChatMember, ApiError> {
        self.call(
            "getChatMember",
            json!({ "chat_id": chat_id, "user_id": user_id }),
        )
        .await
    }

    async fn create_chat_invite_link(
        &self,
        chat_id: i64,
        expire_date: DateTime<Utc>,
        member_limit: u32,
    ) -> Result<ChatInviteLink, ApiError> {
        self.call(
            "createChatInviteLink",
            json!({
                "chat_id": chat_id,
                "expire_date": expire_date.timestamp(),
                "member_limit": member_limit,
            }),
        )
        .await
    }

    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        reply_markup: Option<InlineKeyboardMarkup>,
    ) -> Result<(), ApiError> {
        let mut payload = json!({
            "chat_id": chat_id,
            "text": text,
            "parse_mode": "Markdown",
        });
        if let Some(markup) = reply_markup {
            payload["reply_markup"] = serde_json::to_value(&markup)
                .map_err(|e| ApiError::Telegram(e.to_string()))?;
        }

        // sendMessage returns the sent Message; we only care that it succeeded
        let _: serde_json::Value = self.call("sendMessage", payload).await?;
        Ok(())
    }
}

/// Deep link that opens a private chat with the bot and passes `payload`
/// to the /start command.
pub fn deep_link(bot_username: &str, payload: &str) -> String {
    format!("https://t.me/{bot_username}?start={payload}")
}

/// Telegram's native share screen pre-filled with the invite link.
pub fn share_url(link: &str) -> String {
    format!("https://t.me/share/url?url={}", urlencoding::encode(link))
}
