//! Membership services - Risoluzione degli inviti sui join
//!
//! Reagisce agli update `chat_member`: classifica la transizione con una
//! funzione pura, risolve l'invito pendente tramite il link e dà il
//! benvenuto al nuovo membro.

use crate::core::{AppState, BotError};
use crate::telegram::{ChatMember, ChatMemberStatus, ChatMemberUpdated, escape_markdown};
use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument, warn};

/// Esito della classificazione di una transizione di membership
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberTransition {
    Joined,
    Left,
    Unchanged,
}

/// Pure classification over two membership snapshots, independent of the
/// update shape: joined iff the user was not in the chat before and is now.
pub fn classify_transition(old: &ChatMember, new: &ChatMember) -> MemberTransition {
    match (is_present(old), is_present(new)) {
        (false, true) => MemberTransition::Joined,
        (true, false) => MemberTransition::Left,
        _ => MemberTransition::Unchanged,
    }
}

fn is_present(member: &ChatMember) -> bool {
    match member.status {
        ChatMemberStatus::Creator | ChatMemberStatus::Administrator | ChatMemberStatus::Member => {
            true
        }
        // un utente restricted può essere ancora dentro la chat
        ChatMemberStatus::Restricted => member.is_member.unwrap_or(false),
        ChatMemberStatus::Left | ChatMemberStatus::Kicked => false,
    }
}

/// Handler per gli update `chat_member`
#[instrument(
    skip(state, event),
    fields(chat_id = event.chat.id, user_id = event.new_chat_member.user.id)
)]
pub async fn chat_member_updated(
    state: &AppState,
    event: &ChatMemberUpdated,
) -> Result<(), BotError> {
    // 1. only "joined via invite link" transitions are interesting
    if classify_transition(&event.old_chat_member, &event.new_chat_member)
        != MemberTransition::Joined
    {
        debug!("membership change is not a join, ignoring");
        return Ok(());
    }
    let Some(link) = event.invite_link.as_ref() else {
        debug!("join without an invite link reference, ignoring");
        return Ok(());
    };

    // 2. joins through links we never issued are a normal occurrence
    let Some(invite) = state.invites.find_by_link(&link.invite_link).await? else {
        debug!(link = %link.invite_link, "no matching invite, ignoring");
        return Ok(());
    };
    if !invite.is_pending() {
        debug!(invite_id = invite.invite_id, "invite already resolved, ignoring");
        return Ok(());
    }

    // 3. record the invitee; from here on the resolution is final
    let invitee = &event.new_chat_member.user;
    let joined_at = DateTime::from_timestamp(event.date, 0).unwrap_or_else(Utc::now);
    state
        .invites
        .mark_resolved(invite.invite_id, invitee.id, &invitee.full_name(), joined_at)
        .await?;

    info!(
        invite_id = invite.invite_id,
        invitee_id = invitee.id,
        inviter_id = invite.created_by_id,
        "invite resolved"
    );

    // 4. a failed welcome message never undoes the persisted resolution
    let text = format!(
        "Welcome, *{}*!\n\nYou were invited by *{}*.",
        escape_markdown(&invitee.full_name()),
        escape_markdown(&invite.created_by_name)
    );
    if let Err(e) = state.api.send_message(event.chat.id, &text, None).await {
        warn!(error = %e, "failed to send the welcome message");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telegram::User;

    fn snapshot(status: ChatMemberStatus, is_member: Option<bool>) -> ChatMember {
        ChatMember {
            user: User {
                id: 1,
                first_name: "Bob".into(),
                last_name: None,
                username: None,
            },
            status,
            is_member,
        }
    }

    #[test]
    fn test_left_to_member_is_a_join() {
        let old = snapshot(ChatMemberStatus::Left, None);
        let new = snapshot(ChatMemberStatus::Member, None);
        assert_eq!(classify_transition(&old, &new), MemberTransition::Joined);
    }

    #[test]
    fn test_kicked_to_member_is_a_join() {
        let old = snapshot(ChatMemberStatus::Kicked, None);
        let new = snapshot(ChatMemberStatus::Member, None);
        assert_eq!(classify_transition(&old, &new), MemberTransition::Joined);
    }

    #[test]
    fn test_member_to_left_is_a_leave() {
        let old = snapshot(ChatMemberStatus::Member, None);
        let new = snapshot(ChatMemberStatus::Left, None);
        assert_eq!(classify_transition(&old, &new), MemberTransition::Left);
    }

    #[test]
    fn test_role_change_is_unchanged() {
        let old = snapshot(ChatMemberStatus::Member, None);
        let new = snapshot(ChatMemberStatus::Administrator, None);
        assert_eq!(classify_transition(&old, &new), MemberTransition::Unchanged);
    }

    #[test]
    fn test_restricted_uses_the_is_member_flag() {
        // restricted but still inside the chat: not a join
        let old = snapshot(ChatMemberStatus::Restricted, Some(true));
        let new = snapshot(ChatMemberStatus::Member, None);
        assert_eq!(classify_transition(&old, &new), MemberTransition::Unchanged);

        // restricted and outside, then member: a join
        let old = snapshot(ChatMemberStatus::Restricted, Some(false));
        let new = snapshot(ChatMemberStatus::Member, None);
        assert_eq!(classify_transition(&old, &new), MemberTransition::Joined);
    }
}
