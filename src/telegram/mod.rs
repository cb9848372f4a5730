//! Telegram module - Interfaccia verso la piattaforma di messaggistica
//!
//! Questo modulo contiene il client HTTP per il Bot API e i tipi serde
//! del sottoinsieme di oggetti che il bot utilizza.

pub mod api;
pub mod types;

// Re-exports per facilitare l'import
pub use api::{ApiError, BotApi, TelegramApi, deep_link, share_url};
pub use types::{
    Chat, ChatInviteLink, ChatKind, ChatMember, ChatMemberStatus, ChatMemberUpdated,
    InlineKeyboardButton, InlineKeyboardMarkup, Message, Update, User, escape_markdown,
};
