//! Error handling - Errore unico dei handler
//!
//! Gli errori utente e quelli della piattaforma vengono gestiti nei
//! handler con una risposta terminale; qui arriva solo ciò che resta,
//! catturato e loggato dal dispatcher senza fermare il processo.

use crate::repositories::StoreError;
use crate::telegram::ApiError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BotError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Api(#[from] ApiError),
}
