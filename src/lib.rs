//! invitebot - single-use, time-limited invite links for group chats
//!
//! Espone i moduli principali per i test di integrazione.

pub mod core;
pub mod dispatcher;
pub mod entities;
pub mod repositories;
pub mod services;
pub mod telegram;

// Re-export dei tipi principali per facilitare l'import
pub use crate::core::{AppState, BotError, Config};
pub use crate::dispatcher::Dispatcher;
