//! Application State - Stato globale dell'applicazione
//!
//! Contiene lo store, il client verso la piattaforma e le impostazioni
//! condivise da tutti i handler.

use crate::core::Config;
use crate::repositories::{InviteRepository, InviteStore};
use crate::telegram::{BotApi, User};
use sqlx::SqlitePool;
use std::sync::Arc;

/// Stato globale condiviso tra dispatcher e handler
pub struct AppState {
    /// Store degli inviti (iniettabile nei test)
    pub invites: Arc<dyn InviteStore>,

    /// Client verso il Bot API (iniettabile nei test)
    pub api: Arc<dyn BotApi>,

    /// Identità del bot, risolta con getMe all'avvio
    pub me: User,

    /// Utente esente dal controllo quota
    pub owner_id: i64,

    /// Limite di inviti pendenti per utente per chat
    pub max_invites_per_user: i64,

    /// Validità richiesta per i nuovi link
    pub expiry_hours: i64,
}

impl AppState {
    /// Crea una nuova istanza di AppState inizializzando il repository
    /// con il pool di connessioni fornito.
    pub fn new(pool: SqlitePool, api: Arc<dyn BotApi>, me: User, config: &Config) -> Self {
        Self {
            invites: Arc::new(InviteRepository::new(pool)),
            api,
            me,
            owner_id: config.owner_id,
            max_invites_per_user: config.max_invites_per_user,
            expiry_hours: config.expiry_hours,
        }
    }
}
