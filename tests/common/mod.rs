//! Shared test helpers: scripted platform double and state builders.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use invitebot::core::{AppState, Config};
use invitebot::entities::NewInvite;
use invitebot::telegram::{
    ApiError, BotApi, Chat, ChatInviteLink, ChatKind, ChatMember, ChatMemberStatus,
    ChatMemberUpdated, InlineKeyboardMarkup, Message, Update, User,
};
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

pub const OWNER_ID: i64 = 777;
pub const MAX_INVITES: i64 = 3;

/// One outgoing sendMessage call as the bot issued it
#[derive(Debug, Clone)]
pub struct SentMessage {
    pub chat_id: i64,
    pub text: String,
    pub button_url: Option<String>,
}

/// Scripted BotApi double: records outgoing calls, returns canned answers.
#[derive(Default)]
pub struct MockApi {
    pub sent: Mutex<Vec<SentMessage>>,
    /// membership answers for getChatMember; missing keys default to Member
    pub members: Mutex<HashMap<(i64, i64), ChatMemberStatus>>,
    /// canned links returned in order; synthesized when empty
    pub links: Mutex<Vec<ChatInviteLink>>,
    /// platform failure for createChatInviteLink
    pub link_error: Mutex<Option<String>>,
    /// makes every sendMessage fail
    pub send_fails: AtomicBool,
    /// (chat_id, requested expiry) per createChatInviteLink call
    pub created: Mutex<Vec<(i64, i64)>>,
    link_counter: AtomicI64,
}

impl MockApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_member(&self, chat_id: i64, user_id: i64, status: ChatMemberStatus) {
        self.members
            .lock()
            .unwrap()
            .insert((chat_id, user_id), status);
    }

    pub fn push_link(&self, link: &str, expire_date: DateTime<Utc>) {
        self.links.lock().unwrap().push(ChatInviteLink {
            invite_link: link.to_string(),
            expire_date: Some(expire_date.timestamp()),
            member_limit: Some(1),
        });
    }

    pub fn fail_links_with(&self, description: &str) {
        *self.link_error.lock().unwrap() = Some(description.to_string());
    }

    pub fn last_message(&self) -> SentMessage {
        self.sent
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("the bot should have sent a message")
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl BotApi for MockApi {
    async fn get_me(&self) -> Result<User, ApiError> {
        Ok(bot_identity())
    }

    async fn get_updates(&self, _offset: i64, _timeout_secs: u64) -> Result<Vec<Update>, ApiError> {
        Ok(vec![])
    }

    async fn get_chat_member(&self, chat_id: i64, user_id: i64) -> Result<ChatMember, ApiError> {
        let status = self
            .members
            .lock()
            .unwrap()
            .get(&(chat_id, user_id))
            .copied()
            .unwrap_or(ChatMemberStatus::Member);
        Ok(ChatMember {
            user: user(user_id, "someone"),
            status,
            is_member: None,
        })
    }

    async fn create_chat_invite_link(
        &self,
        chat_id: i64,
        expire_date: DateTime<Utc>,
        member_limit: u32,
    ) -> Result<ChatInviteLink, ApiError> {
        if let Some(description) = self.link_error.lock().unwrap().clone() {
            return Err(ApiError::Telegram(description));
        }

        self.created
            .lock()
            .unwrap()
            .push((chat_id, expire_date.timestamp()));

        let mut links = self.links.lock().unwrap();
        if !links.is_empty() {
            return Ok(links.remove(0));
        }
        let n = self.link_counter.fetch_add(1, Ordering::SeqCst);
        Ok(ChatInviteLink {
            invite_link: format!("https://t.me/+mock{n}"),
            expire_date: Some(expire_date.timestamp()),
            member_limit: Some(member_limit),
        })
    }

    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        reply_markup: Option<InlineKeyboardMarkup>,
    ) -> Result<(), ApiError> {
        if self.send_fails.load(Ordering::SeqCst) {
            return Err(ApiError::Telegram(
                "Forbidden: bot was blocked by the user".to_string(),
            ));
        }
        self.sent.lock().unwrap().push(SentMessage {
            chat_id,
            text: text.to_string(),
            button_url: reply_markup
                .and_then(|m| m.inline_keyboard.into_iter().flatten().next())
                .map(|b| b.url),
        });
        Ok(())
    }
}

pub fn bot_identity() -> User {
    User {
        id: 10,
        first_name: "Invite Bot".to_string(),
        last_name: None,
        username: Some("invitebot".to_string()),
    }
}

pub fn user(id: i64, first_name: &str) -> User {
    User {
        id,
        first_name: first_name.to_string(),
        last_name: None,
        username: None,
    }
}

/// AppState wired to the mock platform, schema already created.
pub async fn create_test_state(pool: SqlitePool, api: Arc<MockApi>) -> Arc<AppState> {
    let config = Config {
        bot_token: "12345:test".to_string(),
        owner_id: OWNER_ID,
        max_invites_per_user: MAX_INVITES,
        expiry_hours: 24,
        database_url: String::new(),
    };
    let state = Arc::new(AppState::new(pool, api, bot_identity(), &config));
    state.invites.init_schema().await.expect("schema init");
    state
}

pub fn private_message(from: &User, text: &str) -> Message {
    Message {
        message_id: 1,
        chat: Chat {
            id: from.id,
            kind: ChatKind::Private,
        },
        from: Some(from.clone()),
        text: Some(text.to_string()),
    }
}

pub fn group_message(chat_id: i64, from: &User, text: &str) -> Message {
    Message {
        message_id: 1,
        chat: Chat {
            id: chat_id,
            kind: ChatKind::Supergroup,
        },
        from: Some(from.clone()),
        text: Some(text.to_string()),
    }
}

/// Inserts a pending invite valid for 24 hours.
pub async fn seed_active_invite(state: &AppState, chat_id: i64, from: &User, link: &str) {
    let now = Utc::now();
    state
        .invites
        .insert(&NewInvite {
            chat_id,
            link: link.to_string(),
            created_by_id: from.id,
            created_by_name: from.full_name(),
            created_at: now,
            valid_until: now + Duration::hours(24),
        })
        .await
        .expect("seed invite");
}

/// chat_member update for `joining` entering `chat_id`.
pub fn join_event(
    chat_id: i64,
    joining: &User,
    invite_link: Option<&str>,
    date: i64,
) -> ChatMemberUpdated {
    ChatMemberUpdated {
        chat: Chat {
            id: chat_id,
            kind: ChatKind::Supergroup,
        },
        from: joining.clone(),
        date,
        old_chat_member: ChatMember {
            user: joining.clone(),
            status: ChatMemberStatus::Left,
            is_member: None,
        },
        new_chat_member: ChatMember {
            user: joining.clone(),
            status: ChatMemberStatus::Member,
            is_member: None,
        },
        invite_link: invite_link.map(|link| ChatInviteLink {
            invite_link: link.to_string(),
            expire_date: None,
            member_limit: Some(1),
        }),
    }
}
