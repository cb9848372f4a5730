//! Telegram types - Tipi del Bot API usati dal bot
//!
//! Solo il sottoinsieme di oggetti che il bot consuma davvero; i campi
//! sconosciuti vengono ignorati da serde.

use serde::{Deserialize, Serialize};

/// An incoming update from `getUpdates`. Exactly one of the optional
/// payload fields is set per update.
#[derive(Deserialize, Debug, Clone)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
    #[serde(default)]
    pub edited_message: Option<Message>,
    #[serde(default)]
    pub chat_member: Option<ChatMemberUpdated>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
    #[serde(default)]
    pub from: Option<User>,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Chat {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: ChatKind,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChatKind {
    Private,
    Group,
    Supergroup,
    Channel,
}

#[derive(Deserialize, Debug, Clone)]
pub struct User {
    pub id: i64,
    pub first_name: String,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

impl User {
    /// Display name the way Telegram composes it: first name, plus the
    /// last name when present.
    pub fn full_name(&self) -> String {
        match &self.last_name {
            Some(last) => format!("{} {}", self.first_name, last),
            None => self.first_name.clone(),
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct ChatMember {
    pub user: User,
    pub status: ChatMemberStatus,
    /// Only meaningful for `Restricted`: a restricted user can still be
    /// a member of the chat.
    #[serde(default)]
    pub is_member: Option<bool>,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChatMemberStatus {
    Creator,
    Administrator,
    Member,
    Restricted,
    Left,
    Kicked,
}

/// Payload of a `chat_member` update: before/after snapshot of one
/// user's membership in one chat.
#[derive(Deserialize, Debug, Clone)]
pub struct ChatMemberUpdated {
    pub chat: Chat,
    pub from: User,
    /// Unix timestamp of the event.
    pub date: i64,
    pub old_chat_member: ChatMember,
    pub new_chat_member: ChatMember,
    /// Set when the change was caused by an invite link.
    #[serde(default)]
    pub invite_link: Option<ChatInviteLink>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ChatInviteLink {
    pub invite_link: String,
    /// Unix timestamp; the platform may adjust the requested expiry.
    #[serde(default)]
    pub expire_date: Option<i64>,
    #[serde(default)]
    pub member_limit: Option<u32>,
}

#[derive(Serialize, Debug, Clone)]
pub struct InlineKeyboardMarkup {
    pub inline_keyboard: Vec<Vec<InlineKeyboardButton>>,
}

#[derive(Serialize, Debug, Clone)]
pub struct InlineKeyboardButton {
    pub text: String,
    pub url: String,
}

impl InlineKeyboardMarkup {
    /// Single-button keyboard, the only shape this bot ever sends.
    pub fn from_button(text: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            inline_keyboard: vec![vec![InlineKeyboardButton {
                text: text.into(),
                url: url.into(),
            }]],
        }
    }
}

/// Escape the characters that Markdown (legacy style) treats specially.
pub fn escape_markdown(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '_' | '*' | '`' | '[') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_chat_member_update() {
        let raw = serde_json::json!({
            "update_id": 42,
            "chat_member": {
                "chat": {"id": -100123, "type": "supergroup", "title": "ignored"},
                "from": {"id": 1, "is_bot": false, "first_name": "Alice"},
                "date": 1724745600,
                "old_chat_member": {
                    "user": {"id": 2, "is_bot": false, "first_name": "Bob"},
                    "status": "left"
                },
                "new_chat_member": {
                    "user": {"id": 2, "is_bot": false, "first_name": "Bob"},
                    "status": "member"
                },
                "invite_link": {
                    "invite_link": "https://t.me/+abc",
                    "creator": {"id": 99, "is_bot": true, "first_name": "bot"},
                    "expire_date": 1724832000,
                    "member_limit": 1
                }
            }
        });

        let update: Update = serde_json::from_value(raw).expect("valid update");
        let ev = update.chat_member.expect("chat_member payload");
        assert_eq!(ev.chat.id, -100123);
        assert_eq!(ev.old_chat_member.status, ChatMemberStatus::Left);
        assert_eq!(ev.new_chat_member.status, ChatMemberStatus::Member);
        assert_eq!(
            ev.invite_link.unwrap().invite_link,
            "https://t.me/+abc"
        );
    }

    #[test]
    fn test_full_name_with_and_without_last_name() {
        let user = User {
            id: 1,
            first_name: "Alice".into(),
            last_name: Some("Smith".into()),
            username: None,
        };
        assert_eq!(user.full_name(), "Alice Smith");

        let user = User {
            id: 2,
            first_name: "Bob".into(),
            last_name: None,
            username: Some("bob".into()),
        };
        assert_eq!(user.full_name(), "Bob");
    }

    #[test]
    fn test_escape_markdown() {
        assert_eq!(
            escape_markdown("a_b*c`d[e"),
            "a\\_b\\*c\\`d\\[e"
        );
        assert_eq!(escape_markdown("plain"), "plain");
    }
}
