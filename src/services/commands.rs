//! Command services - Ciclo di vita degli inviti
//!
//! Handler per i comandi utente. I controlli del flusso /start sono in
//! ordine stretto e ogni fallimento è terminale: risposta all'utente e
//! stop, nessuna scrittura prima dell'ultimo passo.

use crate::core::{AppState, BotError};
use crate::entities::NewInvite;
use crate::repositories::StoreError;
use crate::telegram::{
    ApiError, ChatKind, ChatMemberStatus, InlineKeyboardMarkup, Message, deep_link,
    escape_markdown, share_url,
};
use chrono::{DateTime, Duration, SubsecRound, Utc};
use tracing::{info, instrument, warn};

/// /help - elenco dei comandi disponibili
#[instrument(skip(state, msg), fields(chat_id = msg.chat.id))]
pub async fn help_command(
    state: &AppState,
    msg: &Message,
    _arg: Option<&str>,
) -> Result<(), BotError> {
    let text = "Here's what I can do:\n\n\
         /invite - post a button in a group chat to request a new invite link\n\
         /my\\_invites - list your unused invite links\n\
         /check\\_invite <link> - show the status of an invite link\n\
         /help - this message";
    state.api.send_message(msg.chat.id, text, None).await?;
    Ok(())
}

/// /start - con un payload di deep link crea un nuovo invito,
/// altrimenti mostra il messaggio di benvenuto
#[instrument(skip(state, msg, arg), fields(chat_id = msg.chat.id))]
pub async fn start_command(
    state: &AppState,
    msg: &Message,
    arg: Option<&str>,
) -> Result<(), BotError> {
    let Some(user) = msg.from.as_ref() else {
        return Ok(());
    };

    // 1. send welcome message if no args provided from deep linking
    let payload = match arg {
        Some(payload) if msg.chat.kind == ChatKind::Private => payload,
        _ => {
            let text = format!(
                "Hey, I'm *{}*, yet another Telegram bot for managing group invite links.\n\n\
                 To get started, use /invite in a group chat.",
                escape_markdown(&state.me.full_name())
            );
            state.api.send_message(msg.chat.id, &text, None).await?;
            return Ok(());
        }
    };

    // 2. the deep link payload must be a chat id
    let chat_id: i64 = match payload.parse() {
        Ok(id) => id,
        Err(_) => {
            state
                .api
                .send_message(msg.chat.id, "What am I supposed to do with this?!", None)
                .await?;
            return Ok(());
        }
    };

    // 3. the requester must already be a member of the target chat
    let member = match state.api.get_chat_member(chat_id, user.id).await {
        Ok(member) => member,
        Err(ApiError::Telegram(description)) => {
            state
                .api
                .send_message(msg.chat.id, &format!("*{description}!*"), None)
                .await?;
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };
    if !matches!(
        member.status,
        ChatMemberStatus::Member | ChatMemberStatus::Administrator | ChatMemberStatus::Creator
    ) {
        state
            .api
            .send_message(
                msg.chat.id,
                "You must be a member of that chat to request an invite link!",
                None,
            )
            .await?;
        return Ok(());
    }

    // 4. check if the limit has been exceeded for this chat
    let active = state.invites.active_count_for_user(chat_id, user.id).await?;
    if active >= state.max_invites_per_user && user.id != state.owner_id {
        let text = format!(
            "You've used your limit of *{} invite links*, \
             use up the previous ones before you create another one!",
            state.max_invites_per_user
        );
        state.api.send_message(msg.chat.id, &text, None).await?;
        return Ok(());
    }

    // 5. mint the link; platform failures are surfaced verbatim, no retry
    let created_at = Utc::now().trunc_subsecs(0);
    let expire_date = created_at + Duration::hours(state.expiry_hours);
    let chat_invite = match state
        .api
        .create_chat_invite_link(chat_id, expire_date, 1)
        .await
    {
        Ok(link) => link,
        Err(ApiError::Telegram(description)) => {
            state
                .api
                .send_message(msg.chat.id, &format!("*{description}!*"), None)
                .await?;
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    // 6. persist with the platform-confirmed expiry, not the requested one
    let valid_until = chat_invite
        .expire_date
        .and_then(|ts| DateTime::from_timestamp(ts, 0))
        .unwrap_or(expire_date);
    let invite = match state
        .invites
        .insert(&NewInvite {
            chat_id,
            link: chat_invite.invite_link.clone(),
            created_by_id: user.id,
            created_by_name: user.full_name(),
            created_at,
            valid_until,
        })
        .await
    {
        Ok(invite) => invite,
        Err(StoreError::DuplicateLink) => {
            // the platform guarantees fresh links, so this is stale data;
            // abort without touching the existing row
            warn!(link = %chat_invite.invite_link, "platform returned an already-known link");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    info!(
        user_id = user.id,
        chat_id, link = %invite.link,
        "created a new invite link"
    );

    // 7. confirm with the link, its expiry and the limit reminder
    let text = format!(
        "A new invite link has been created!\n\n\
         {}\n\n\
         This link is valid for *{} hours* until *{} UTC* and limited to single use. \
         Remember, you can only have *{} unused* invite links at a time!",
        escape_markdown(&invite.link),
        state.expiry_hours,
        invite.valid_until.format("%Y-%m-%d %H:%M:%S"),
        state.max_invites_per_user
    );
    state
        .api
        .send_message(
            msg.chat.id,
            &text,
            Some(InlineKeyboardMarkup::from_button(
                "Share invite link",
                share_url(&invite.link),
            )),
        )
        .await?;

    Ok(())
}

/// /invite - pubblica in un gruppo il bottone di deep link verso il bot
#[instrument(skip(state, msg), fields(chat_id = msg.chat.id))]
pub async fn invite_command(
    state: &AppState,
    msg: &Message,
    _arg: Option<&str>,
) -> Result<(), BotError> {
    // check if message was sent in PM
    if msg.chat.kind == ChatKind::Private {
        state
            .api
            .send_message(
                msg.chat.id,
                "You cannot use this command here!\n\nTo get started, use /invite in a group chat.",
                None,
            )
            .await?;
        return Ok(());
    }

    let username = state.me.username.as_deref().unwrap_or_default();
    state
        .api
        .send_message(
            msg.chat.id,
            "Click the button below to get started:",
            Some(InlineKeyboardMarkup::from_button(
                "Create a new invite link!",
                deep_link(username, &msg.chat.id.to_string()),
            )),
        )
        .await?;

    Ok(())
}

/// /my_invites - elenca i link pendenti e non scaduti dell'utente
#[instrument(skip(state, msg), fields(chat_id = msg.chat.id))]
pub async fn my_invites_command(
    state: &AppState,
    msg: &Message,
    _arg: Option<&str>,
) -> Result<(), BotError> {
    let Some(user) = msg.from.as_ref() else {
        return Ok(());
    };

    let pending = state.invites.pending_for_user(user.id).await?;
    if pending.is_empty() {
        state
            .api
            .send_message(msg.chat.id, "You have no unused invite links right now.", None)
            .await?;
        return Ok(());
    }

    let mut text = format!(
        "You have *{} unused* invite link(s) out of *{}*:\n",
        pending.len(),
        state.max_invites_per_user
    );
    for invite in &pending {
        text.push_str(&format!(
            "\n{}\nfor chat `{}`, valid until *{} UTC*\n",
            escape_markdown(&invite.link),
            invite.chat_id,
            invite.valid_until.format("%Y-%m-%d %H:%M:%S")
        ));
    }
    state.api.send_message(msg.chat.id, &text, None).await?;

    Ok(())
}

/// /check_invite - stato di un singolo link
#[instrument(skip(state, msg, arg), fields(chat_id = msg.chat.id))]
pub async fn check_invite_command(
    state: &AppState,
    msg: &Message,
    arg: Option<&str>,
) -> Result<(), BotError> {
    let Some(link) = arg else {
        state
            .api
            .send_message(msg.chat.id, "Usage: /check\\_invite <link>", None)
            .await?;
        return Ok(());
    };

    let text = match state.invites.find_by_link(link).await? {
        None => "I don't know this invite link.".to_string(),
        Some(invite) if invite.is_pending() => {
            if invite.valid_until > Utc::now() {
                format!(
                    "This link is still unused and valid until *{} UTC*.",
                    invite.valid_until.format("%Y-%m-%d %H:%M:%S")
                )
            } else {
                format!(
                    "This link was never used and expired on *{} UTC*.",
                    invite.valid_until.format("%Y-%m-%d %H:%M:%S")
                )
            }
        }
        Some(invite) => {
            let invitee = escape_markdown(invite.invitee_name.as_deref().unwrap_or("someone"));
            match invite.joined_at {
                Some(joined_at) => format!(
                    "This link was used by *{}* on *{} UTC*.",
                    invitee,
                    joined_at.format("%Y-%m-%d %H:%M:%S")
                ),
                None => format!("This link was used by *{invitee}*."),
            }
        }
    };
    state.api.send_message(msg.chat.id, &text, None).await?;

    Ok(())
}
