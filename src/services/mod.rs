//! Services module - Handler degli update
//!
//! Ogni modulo gestisce una parte della superficie del bot: i comandi
//! utente (ciclo di vita degli inviti) e gli eventi di membership.

pub mod commands;
pub mod membership;

// Re-exports per facilitare l'import
pub use commands::{
    check_invite_command, help_command, invite_command, my_invites_command, start_command,
};
pub use membership::{MemberTransition, chat_member_updated, classify_transition};
