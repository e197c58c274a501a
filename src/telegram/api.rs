//! Minimal Telegram Bot API client — long polling and message sending.
//!
//! Only the handful of methods the bot needs: `getMe` for the bot's own
//! username (so `/cmd@botname` addressing can be matched), `getUpdates`
//! long polling, and `sendMessage` for replies.

use crate::config::Config;
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::time::Duration;

// ── Wire types ──────────────────────────────────────────────────

/// One entry from `getUpdates`. Non-message updates decode with
/// `message: None` and are skipped.
#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    #[serde(default)]
    pub from: Option<User>,
    pub chat: Chat,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub reply_to_message: Option<Box<Message>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
    pub first_name: String,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

impl User {
    /// First and last name joined, matching Telegram's `full_name`.
    pub fn full_name(&self) -> String {
        match &self.last_name {
            Some(last) => format!("{} {last}", self.first_name),
            None => self.first_name.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

/// Envelope every Bot API response arrives in.
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    #[serde(default)]
    description: Option<String>,
}

/// Clickable mention: `@username` when the user has one, otherwise a
/// Markdown `tg://user` link on the display name.
pub fn mention(id: i64, display_name: &str, username: Option<&str>) -> String {
    match username {
        Some(name) => format!("@{name}"),
        None => format!("[{display_name}](tg://user?id={id})"),
    }
}

// ── Client ──────────────────────────────────────────────────────

#[derive(Clone)]
pub struct TelegramApi {
    client: reqwest::Client,
    base_url: String,
}

impl TelegramApi {
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            base_url: format!("https://api.telegram.org/bot{}", config.bot_token),
        })
    }

    /// Fetch the bot's own identity.
    pub async fn get_me(&self) -> Result<User> {
        self.call("getMe", &serde_json::json!({})).await
    }

    /// Long-poll for message updates starting at `offset`.
    pub async fn get_updates(&self, offset: i64, timeout_secs: u64) -> Result<Vec<Update>> {
        self.call(
            "getUpdates",
            &serde_json::json!({
                "offset": offset,
                "timeout": timeout_secs,
                "allowed_updates": ["message"],
            }),
        )
        .await
    }

    /// Send `text` into `chat_id`, optionally as a reply. `markdown`
    /// enables Markdown parse mode, needed for `tg://user` mentions.
    pub async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        reply_to: Option<i64>,
        markdown: bool,
    ) -> Result<Message> {
        let mut body = serde_json::json!({ "chat_id": chat_id, "text": text });
        if let Some(message_id) = reply_to {
            body["reply_to_message_id"] = message_id.into();
        }
        if markdown {
            body["parse_mode"] = "Markdown".into();
        }
        self.call("sendMessage", &body).await
    }

    async fn call<T: serde::de::DeserializeOwned>(
        &self,
        method: &str,
        body: &serde_json::Value,
    ) -> Result<T> {
        let url = format!("{}/{method}", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .with_context(|| format!("Telegram request failed: {method}"))?;

        let api: ApiResponse<T> = response
            .json()
            .await
            .with_context(|| format!("Failed to decode Telegram response: {method}"))?;

        if !api.ok {
            bail!(
                "Telegram API error in {method}: {}",
                api.description.as_deref().unwrap_or("unknown")
            );
        }
        api.result
            .with_context(|| format!("Telegram response missing result: {method}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mention_prefers_username() {
        assert_eq!(mention(7, "Alice", Some("alice")), "@alice");
    }

    #[test]
    fn mention_falls_back_to_user_link() {
        assert_eq!(
            mention(7, "Alice Doe", None),
            "[Alice Doe](tg://user?id=7)"
        );
    }

    #[test]
    fn full_name_joins_first_and_last() {
        let user = User {
            id: 1,
            first_name: "Alice".into(),
            last_name: Some("Doe".into()),
            username: None,
        };
        assert_eq!(user.full_name(), "Alice Doe");

        let user = User {
            id: 1,
            first_name: "Bob".into(),
            last_name: None,
            username: None,
        };
        assert_eq!(user.full_name(), "Bob");
    }

    #[test]
    fn decodes_message_update() {
        let json = r#"{
            "update_id": 42,
            "message": {
                "message_id": 7,
                "from": {"id": 1, "first_name": "Alice", "username": "alice"},
                "chat": {"id": -100, "type": "group", "title": "Dice"},
                "text": "/roll",
                "reply_to_message": {
                    "message_id": 6,
                    "from": {"id": 2, "first_name": "Bob"},
                    "chat": {"id": -100, "type": "group"}
                }
            }
        }"#;

        let update: Update = serde_json::from_str(json).unwrap();
        assert_eq!(update.update_id, 42);
        let message = update.message.unwrap();
        assert_eq!(message.chat.id, -100);
        assert_eq!(message.text.as_deref(), Some("/roll"));
        assert_eq!(message.from.unwrap().username.as_deref(), Some("alice"));
        assert_eq!(message.reply_to_message.unwrap().from.unwrap().id, 2);
    }

    #[test]
    fn decodes_non_message_update() {
        let update: Update = serde_json::from_str(r#"{"update_id": 43}"#).unwrap();
        assert!(update.message.is_none());
    }

    #[test]
    fn decodes_api_error_envelope() {
        let json = r#"{"ok": false, "error_code": 401, "description": "Unauthorized"}"#;
        let api: ApiResponse<Vec<Update>> = serde_json::from_str(json).unwrap();
        assert!(!api.ok);
        assert_eq!(api.description.as_deref(), Some("Unauthorized"));
        assert!(api.result.is_none());
    }
}
