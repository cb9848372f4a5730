//! Dispatcher - Loop degli update e tabella dei comandi
//!
//! Long polling su getUpdates: gli update vengono processati uno alla
//! volta e ogni handler corre fino al completamento. Un errore in un
//! handler viene loggato con l'update che l'ha provocato e non ferma
//! mai il processo.

use crate::core::{AppState, BotError};
use crate::services;
use crate::telegram::{Message, Update};
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Quanto resta appesa una chiamata getUpdates prima di tornare vuota
const POLL_TIMEOUT_SECONDS: u64 = 30;

/// Pausa prima di ritentare il polling dopo un errore di trasporto
const POLL_BACKOFF: Duration = Duration::from_secs(5);

type HandlerFuture<'a> = Pin<Box<dyn Future<Output = Result<(), BotError>> + Send + 'a>>;

/// Firma comune dei command handler: stato, messaggio, primo argomento
type CommandHandler = for<'a> fn(&'a AppState, &'a Message, Option<&'a str>) -> HandlerFuture<'a>;

// Adattatori monomorfi: incorniciano gli handler async in una firma
// uniforme per la tabella dei comandi
fn help<'a>(s: &'a AppState, m: &'a Message, a: Option<&'a str>) -> HandlerFuture<'a> {
    Box::pin(services::help_command(s, m, a))
}
fn start<'a>(s: &'a AppState, m: &'a Message, a: Option<&'a str>) -> HandlerFuture<'a> {
    Box::pin(services::start_command(s, m, a))
}
fn invite<'a>(s: &'a AppState, m: &'a Message, a: Option<&'a str>) -> HandlerFuture<'a> {
    Box::pin(services::invite_command(s, m, a))
}
fn my_invites<'a>(s: &'a AppState, m: &'a Message, a: Option<&'a str>) -> HandlerFuture<'a> {
    Box::pin(services::my_invites_command(s, m, a))
}
fn check_invite<'a>(s: &'a AppState, m: &'a Message, a: Option<&'a str>) -> HandlerFuture<'a> {
    Box::pin(services::check_invite_command(s, m, a))
}

pub struct Dispatcher {
    state: Arc<AppState>,
    commands: HashMap<&'static str, CommandHandler>,
}

impl Dispatcher {
    /// Costruisce il dispatcher con la tabella statica dei comandi
    pub fn new(state: Arc<AppState>) -> Self {
        let commands: HashMap<&'static str, CommandHandler> = HashMap::from([
            ("help", help as CommandHandler),
            ("start", start as CommandHandler),
            ("invite", invite as CommandHandler),
            ("my_invites", my_invites as CommandHandler),
            ("check_invite", check_invite as CommandHandler),
        ]);

        Self { state, commands }
    }

    /// Gira fino a ctrl-c
    pub async fn run(&self) {
        info!("Bot started!");

        let mut offset = 0i64;
        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    info!("Shutting down");
                    break;
                }
                polled = self.state.api.get_updates(offset, POLL_TIMEOUT_SECONDS) => {
                    let updates = match polled {
                        Ok(updates) => updates,
                        Err(e) => {
                            warn!(error = %e, "getUpdates failed");
                            tokio::time::sleep(POLL_BACKOFF).await;
                            continue;
                        }
                    };

                    for update in updates {
                        offset = offset.max(update.update_id + 1);
                        if let Err(e) = self.handle_update(&update).await {
                            error!(update_id = update.update_id, error = %e, "update handler failed");
                        }
                    }
                }
            }
        }
    }

    async fn handle_update(&self, update: &Update) -> Result<(), BotError> {
        if let Some(event) = update.chat_member.as_ref() {
            return services::chat_member_updated(&self.state, event).await;
        }

        // i comandi in messaggi editati vengono ignorati
        if update.edited_message.is_some() {
            debug!(update_id = update.update_id, "edited message, ignoring");
            return Ok(());
        }

        let Some(msg) = update.message.as_ref() else {
            return Ok(());
        };
        let Some(text) = msg.text.as_deref() else {
            return Ok(());
        };
        let bot_username = self.state.me.username.as_deref().unwrap_or_default();
        let Some((name, arg)) = parse_command(text, bot_username) else {
            return Ok(());
        };

        match self.commands.get(name) {
            Some(handler) => handler(&self.state, msg, arg).await,
            None => Ok(()),
        }
    }
}

/// Estrae nome comando e primo argomento. Comandi indirizzati ad altri
/// bot (`/start@altro_bot`) non sono nostri.
fn parse_command<'a>(text: &'a str, bot_username: &str) -> Option<(&'a str, Option<&'a str>)> {
    let rest = text.strip_prefix('/')?;
    let mut parts = rest.split_whitespace();
    let token = parts.next()?;

    let name = match token.split_once('@') {
        Some((name, target)) => {
            if !target.eq_ignore_ascii_case(bot_username) {
                return None;
            }
            name
        }
        None => token,
    };

    Some((name, parts.next()))
}
